//! Continuous run mode tests
//!
//! Run under paused tokio time so the one-second default interval costs
//! nothing.

use std::time::Duration;

use tapewire_core::{
    ChannelObserver, HaltReason, MachineEvent, MachineRunner, RunnerConfig, TapeMachine,
};
use tokio::time::Instant;

fn machine(rules: &str, tape: &str) -> TapeMachine {
    TapeMachine::new(tape.parse().unwrap(), rules.parse().unwrap())
}

#[tokio::test(start_paused = true)]
async fn runs_until_halted_one_step_per_interval() {
    let (observer, mut events) = ChannelObserver::channel();
    // Walks right over 1s, then finds no rule for the blank it appended
    let mut m = machine("11111", "111111");
    m.set_observer(observer);

    let started = Instant::now();
    let handle = MachineRunner::spawn(m, RunnerConfig::default());
    let m = handle.wait().await.unwrap();

    assert_eq!(m.halt_reason(), Some(HaltReason::NoMatchingRule));
    assert_eq!(m.step_count(), 3);
    assert_eq!(m.tape().to_string(), "1111110");
    // First step is immediate, the other three wait one interval each
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));

    let mut updates = 0;
    let mut halted = None;
    while let Ok(event) = events.try_recv() {
        match event {
            MachineEvent::Updated(_) => updates += 1,
            MachineEvent::Halted { reason, .. } => halted = Some(reason),
        }
    }
    assert_eq!(updates, 3);
    assert_eq!(halted, Some(HaltReason::NoMatchingRule));
}

#[tokio::test(start_paused = true)]
async fn stop_returns_machine_mid_run() {
    // Bounces forever between two cells
    let m = machine("10201 20100", "0000");
    let config = RunnerConfig { interval: Duration::from_millis(100), max_steps: None };

    let handle = MachineRunner::spawn(m, config);
    tokio::time::sleep(Duration::from_millis(450)).await;
    let m = handle.stop().await.unwrap();

    assert!(!m.is_halted());
    assert_eq!(m.step_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn max_steps_limits_the_run() {
    let m = machine("10201 20100", "0000");
    let config = RunnerConfig { interval: Duration::from_millis(10), max_steps: Some(7) };

    let handle = MachineRunner::spawn(m, config);
    let m = handle.wait().await.unwrap();

    assert!(!m.is_halted());
    assert_eq!(m.step_count(), 7);
}

#[tokio::test(start_paused = true)]
async fn stop_after_halt_is_fine() {
    let m = machine("21101", "0");
    let handle = MachineRunner::spawn(m, RunnerConfig::default());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handle.is_finished());

    let m = handle.stop().await.unwrap();
    assert_eq!(m.halt_reason(), Some(HaltReason::NoMatchingRule));
}
