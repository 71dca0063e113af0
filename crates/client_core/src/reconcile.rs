//! Applies one status report to the session.
//!
//! The rules are ordered: controller error short-circuits the cycle, then
//! car position and door text, then the door-closed button reset, then the
//! trace log rebuild. Any transport that delivers [`StatusReport`]s goes
//! through here.

use shared::{
    domain::Direction,
    protocol::{ElevatorSnapshot, StatusReport},
};

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Alert(String),
    Applied {
        snapshot: ElevatorSnapshot,
        buttons_reset: bool,
    },
}

pub fn reconcile(session: &mut Session, report: StatusReport) -> ReconcileOutcome {
    let snapshot = match report {
        StatusReport::ControllerError(message) => return ReconcileOutcome::Alert(message),
        StatusReport::Snapshot(snapshot) => snapshot,
    };

    session.car.update(snapshot.current_floor, snapshot.door_open);

    let buttons_reset = !snapshot.door_open && session.panel.reset_visuals();

    session
        .trace
        .rebuild(snapshot.log.as_deref(), snapshot.dfa_trace.as_deref());

    ReconcileOutcome::Applied {
        snapshot,
        buttons_reset,
    }
}

/// Client-side reading of where an elevator is in its cycle. The controller
/// owns the real state machine; this is display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorPhase {
    Idle,
    Pending,
    Arriving(Option<Direction>),
    DoorsOpen,
}

impl ElevatorPhase {
    pub fn infer(snapshot: &ElevatorSnapshot) -> Self {
        if snapshot.door_open {
            ElevatorPhase::DoorsOpen
        } else if snapshot.moving == Some(true) {
            ElevatorPhase::Arriving(snapshot.direction)
        } else if snapshot.has_queued_floors() {
            ElevatorPhase::Pending
        } else {
            ElevatorPhase::Idle
        }
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
