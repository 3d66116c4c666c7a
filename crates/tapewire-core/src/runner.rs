//! Continuous run mode.
//!
//! Moves a [`TapeMachine`] onto a tokio task that steps it on a fixed
//! interval. The machine keeps its observer, so a [`crate::ChannelObserver`]
//! installed beforehand streams every step out of the task.

use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{error::RunnerError, machine::TapeMachine};

/// Continuous run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Delay between steps. The first step runs immediately.
    pub interval: Duration,

    /// Stop after this many applied rules, `None` to run until halted
    pub max_steps: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(1), max_steps: None }
    }
}

/// Spawns machines onto timer-driven tasks.
pub struct MachineRunner;

impl MachineRunner {
    /// Start stepping `machine` on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn spawn(mut machine: TapeMachine, config: RunnerConfig) -> RunnerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut applied = 0u64;

            tracing::debug!(interval_ms = config.interval.as_millis(), "runner started");

            loop {
                tokio::select! {
                    biased;
                    // Err means every handle is gone, which also stops the run
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {},
                }

                let outcome = machine.step();
                if outcome.applied().is_some() {
                    applied += 1;
                }
                if outcome.is_halted() {
                    break;
                }
                if config.max_steps.is_some_and(|max| applied >= max) {
                    tracing::debug!(applied, "runner reached step limit");
                    break;
                }
            }

            tracing::debug!(applied, halted = machine.is_halted(), "runner finished");
            machine
        });

        RunnerHandle { stop_tx, task }
    }
}

/// Control handle for a running machine.
#[derive(Debug)]
pub struct RunnerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<TapeMachine>,
}

impl RunnerHandle {
    /// Stop stepping and hand the machine back.
    ///
    /// A step already in progress completes first.
    pub async fn stop(self) -> Result<TapeMachine, RunnerError> {
        // Fails only if the task already finished and dropped its receiver
        let _ = self.stop_tx.send(true);
        Ok(self.task.await?)
    }

    /// Wait for the machine to halt or reach its step limit.
    pub async fn wait(self) -> Result<TapeMachine, RunnerError> {
        let Self { stop_tx, task } = self;
        let machine = task.await?;
        drop(stop_tx);
        Ok(machine)
    }

    /// True once the task has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
