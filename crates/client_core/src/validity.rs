//! Floor-validity derivation for the selected elevator.

use std::collections::BTreeSet;

use shared::{
    domain::{even_floors, floor_catalog, odd_floors, Floor},
    protocol::ElevatorSnapshot,
};

use crate::config::ElevatorProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValiditySource {
    /// Floors declared for the elevator in configuration.
    Declared,
    /// The controller reported queued floors; every floor is accepted.
    QueuePending,
    /// Parity guessed from the display label.
    LabelHeuristic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorValidity {
    pub floors: BTreeSet<Floor>,
    pub source: ValiditySource,
}

impl FloorValidity {
    pub fn contains(&self, floor: Floor) -> bool {
        self.floors.contains(&floor)
    }
}

pub fn derive_valid_floors(
    profile: &ElevatorProfile,
    snapshot: Option<&ElevatorSnapshot>,
) -> FloorValidity {
    if let Some(declared) = &profile.floors {
        return FloorValidity {
            floors: declared.iter().copied().collect(),
            source: ValiditySource::Declared,
        };
    }

    if snapshot.is_some_and(ElevatorSnapshot::has_queued_floors) {
        return FloorValidity {
            floors: floor_catalog().iter().copied().collect(),
            source: ValiditySource::QueuePending,
        };
    }

    FloorValidity {
        floors: floors_for_label(&profile.label).into_iter().collect(),
        source: ValiditySource::LabelHeuristic,
    }
}

fn floors_for_label(label: &str) -> Vec<Floor> {
    if label.contains("odd") {
        odd_floors()
    } else {
        even_floors()
    }
}
