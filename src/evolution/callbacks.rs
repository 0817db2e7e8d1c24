//! Lifecycle callbacks and early stopping.
//!
//! A run invokes `on_start` once before generation 0, `on_step` after every
//! generation's record (generation 0 included) and `on_end` once on every
//! normal or early exit. Returning `true` from `on_step` stops the loop
//! after the current generation.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::schema::{Logbook, Record};

use super::error::{BoxError, EvolutionError};

/// Lifecycle point at which callbacks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Step,
    End,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Start => "on_start",
            Stage::Step => "on_step",
            Stage::End => "on_end",
        })
    }
}

/// Read-only snapshot handed to callbacks.
#[derive(Clone, Copy)]
pub struct CallbackContext<'a> {
    /// Stage being run.
    pub stage: Stage,
    /// Record just appended (only during `on_step`).
    pub record: Option<&'a Record>,
    /// Logbook so far (absent during `on_start`).
    pub logbook: Option<&'a Logbook>,
    /// Opaque handle to whatever drives the search.
    pub estimator: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> CallbackContext<'a> {
    /// Latest value of `metric`, from the record or else the logbook.
    pub fn current(&self, metric: &str) -> Option<f64> {
        self.record
            .or_else(|| self.logbook.and_then(Logbook::last))
            .and_then(|r| r.get(metric))
    }

    /// Downcast the estimator handle.
    pub fn estimator<T: Any>(&self) -> Option<&'a T> {
        self.estimator.and_then(|e| e.downcast_ref::<T>())
    }
}

impl fmt::Debug for CallbackContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackContext")
            .field("stage", &self.stage)
            .field("record", &self.record)
            .field("logbook_len", &self.logbook.map(Logbook::len))
            .field("estimator", &self.estimator.is_some())
            .finish()
    }
}

/// Lifecycle hooks. Every method defaults to a no-op that does not stop.
pub trait Callback {
    fn on_start(&mut self, _ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        Ok(false)
    }

    fn on_step(&mut self, _ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        Ok(false)
    }

    fn on_end(&mut self, _ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        Ok(false)
    }
}

/// Runs every registered callback at each stage.
#[derive(Default)]
pub struct CallbackController {
    callbacks: Vec<Box<dyn Callback>>,
}

impl CallbackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn push(&mut self, callback: Box<dyn Callback>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn on_start(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, EvolutionError> {
        self.run(ctx)
    }

    pub fn on_step(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, EvolutionError> {
        self.run(ctx)
    }

    pub fn on_end(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, EvolutionError> {
        self.run(ctx)
    }

    /// Invoke the stage hook of every callback, even after one returned
    /// `true`, and OR the results. With no callbacks this is `false`.
    /// The first error aborts the stage.
    fn run(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, EvolutionError> {
        let mut stop = false;
        for callback in self.callbacks.iter_mut() {
            let result = match ctx.stage {
                Stage::Start => callback.on_start(ctx),
                Stage::Step => callback.on_step(ctx),
                Stage::End => callback.on_end(ctx),
            };
            stop |= result.map_err(|source| EvolutionError::Callback {
                stage: ctx.stage,
                source,
            })?;
        }
        Ok(stop)
    }
}

/// Adapts a closure into an `on_step` callback.
pub struct StepPredicate<F>(F);

/// Build an `on_step` callback from a closure.
pub fn predicate<F>(f: F) -> StepPredicate<F>
where
    F: FnMut(&CallbackContext<'_>) -> bool,
{
    StepPredicate(f)
}

impl<F> Callback for StepPredicate<F>
where
    F: FnMut(&CallbackContext<'_>) -> bool,
{
    fn on_step(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        Ok((self.0)(ctx))
    }
}

/// Stop once `metric` reaches `threshold`.
#[derive(Debug, Clone)]
pub struct ThresholdStopping {
    pub threshold: f64,
    pub metric: String,
}

impl ThresholdStopping {
    pub fn new(threshold: f64, metric: impl Into<String>) -> Self {
        Self {
            threshold,
            metric: metric.into(),
        }
    }
}

impl Callback for ThresholdStopping {
    fn on_step(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        Ok(ctx
            .current(&self.metric)
            .is_some_and(|value| value >= self.threshold))
    }
}

/// Stop when `metric` has not improved on its value `generations` records
/// ago.
#[derive(Debug, Clone)]
pub struct ConsecutiveStopping {
    pub generations: usize,
    pub metric: String,
}

impl ConsecutiveStopping {
    pub fn new(generations: usize, metric: impl Into<String>) -> Self {
        Self {
            generations,
            metric: metric.into(),
        }
    }
}

impl Callback for ConsecutiveStopping {
    fn on_step(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        let Some(logbook) = ctx.logbook else {
            return Ok(false);
        };
        let values = logbook.select(&self.metric);
        if values.len() <= self.generations {
            return Ok(false);
        }

        let window = &values[values.len() - self.generations - 1..];
        let reference = window[0];
        Ok(window[1..].iter().all(|&v| v <= reference))
    }
}

/// Stop when `metric` varies by at most `threshold` across the last
/// `generations + 1` records.
#[derive(Debug, Clone)]
pub struct DeltaThreshold {
    pub threshold: f64,
    pub generations: usize,
    pub metric: String,
}

impl DeltaThreshold {
    pub fn new(threshold: f64, generations: usize, metric: impl Into<String>) -> Self {
        Self {
            threshold,
            generations,
            metric: metric.into(),
        }
    }
}

impl Callback for DeltaThreshold {
    fn on_step(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        let Some(logbook) = ctx.logbook else {
            return Ok(false);
        };
        let values = logbook.select(&self.metric);
        if values.len() <= self.generations {
            return Ok(false);
        }

        let window = &values[values.len() - self.generations - 1..];
        let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
        Ok(hi - lo <= self.threshold)
    }
}

/// Stop once the wall time since `on_start` exceeds a budget.
#[derive(Debug, Clone)]
pub struct TimerStopping {
    budget: Duration,
    started: Option<Instant>,
}

impl TimerStopping {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            started: None,
        }
    }

    pub fn from_secs_f64(total_seconds: f64) -> Self {
        Self::new(Duration::from_secs_f64(total_seconds.max(0.0)))
    }
}

impl Callback for TimerStopping {
    fn on_start(&mut self, _ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        self.started = Some(Instant::now());
        Ok(false)
    }

    fn on_step(&mut self, _ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        let started = *self.started.get_or_insert_with(Instant::now);
        let elapsed = started.elapsed();
        if elapsed >= self.budget {
            log::info!(
                "Time budget of {:.2}s exhausted after {:.2}s",
                self.budget.as_secs_f64(),
                elapsed.as_secs_f64()
            );
            return Ok(true);
        }
        Ok(false)
    }
}

/// Write the logbook as JSON when the run ends.
#[derive(Debug, Clone)]
pub struct LogbookSaver {
    pub path: PathBuf,
}

impl LogbookSaver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Callback for LogbookSaver {
    fn on_end(&mut self, ctx: &CallbackContext<'_>) -> Result<bool, BoxError> {
        if let Some(logbook) = ctx.logbook {
            logbook.save_json(&self.path)?;
            log::debug!("Logbook saved to {}", self.path.display());
        }
        Ok(false)
    }
}
