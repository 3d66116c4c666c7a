//! Change notifications out of the interpreter.
//!
//! The machine calls its observer synchronously from `step` and `reset`.
//! [`ChannelObserver`] turns those calls into [`MachineEvent`]s so a UI or
//! CLI can consume them from another task.

use tokio::sync::mpsc;

use crate::machine::{HaltReason, MachineSnapshot};

/// Receives machine state after every mutation.
pub trait MachineObserver: Send {
    /// Called after a step that left the machine running, and after `reset`.
    fn on_update(&mut self, snapshot: &MachineSnapshot);

    /// Called once, on the step that halted the machine.
    fn on_halt(&mut self, snapshot: &MachineSnapshot, reason: HaltReason);
}

/// Observer notification as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineEvent {
    /// Machine advanced or was reset
    Updated(MachineSnapshot),

    /// Machine halted
    Halted {
        /// State at the moment of halting
        snapshot: MachineSnapshot,
        /// Why it halted
        reason: HaltReason,
    },
}

impl MachineEvent {
    /// Snapshot carried by the event.
    #[must_use]
    pub fn snapshot(&self) -> &MachineSnapshot {
        match self {
            Self::Updated(snapshot) | Self::Halted { snapshot, .. } => snapshot,
        }
    }
}

/// Forwards observer calls over an unbounded channel.
///
/// A closed receiver is not an error; events are dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<MachineEvent>,
}

impl ChannelObserver {
    /// Observer sending into `tx`.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<MachineEvent>) -> Self {
        Self { tx }
    }

    /// Observer plus the receiving end of a fresh channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MachineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: MachineEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("machine event receiver closed");
        }
    }
}

impl MachineObserver for ChannelObserver {
    fn on_update(&mut self, snapshot: &MachineSnapshot) {
        self.send(MachineEvent::Updated(snapshot.clone()));
    }

    fn on_halt(&mut self, snapshot: &MachineSnapshot, reason: HaltReason) {
        self.send(MachineEvent::Halted { snapshot: snapshot.clone(), reason });
    }
}
