//! Per-stage wall-clock timings for a development run.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: &'static str,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
    totals: HashMap<&'static str, Duration>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, (name, duration): (&'static str, Duration)) {
        self.steps.push(StepTiming { name, duration });
        *self.totals.entry(name).or_insert(Duration::ZERO) += duration;
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.totals.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Emits one `info` event per stage plus the total.
    pub fn log_summary(&self) {
        let total = self.total_duration().as_secs_f64();
        for step in &self.steps {
            let share = if total > 0.0 {
                step.duration.as_secs_f64() / total * 100.0
            } else {
                0.0
            };
            info!(
                stage = step.name,
                ms = step.duration.as_secs_f64() * 1000.0,
                share = format!("{share:.1}%"),
                "stage timing"
            );
        }
        info!(ms = total * 1000.0, "develop total");
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
