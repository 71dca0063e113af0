use serde::{Deserialize, Serialize};

use crate::{
    domain::{Direction, ElevatorId, Floor},
    error::DomainError,
};

/// Body of `POST /press_button` and `POST /validate_button`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRequest {
    pub elevator_id: ElevatorId,
    pub floor: Floor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressButtonResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateButtonResponse {
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusQuery {
    pub elevator_id: ElevatorId,
}

/// `GET /get_status` body as the controller sends it. Every field is optional
/// on the wire because an error response carries nothing but `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_floor: Option<Floor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dfa_trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<Vec<Floor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// One observed elevator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevatorSnapshot {
    pub current_floor: Floor,
    pub door_open: bool,
    pub log: Option<Vec<String>>,
    pub dfa_trace: Option<String>,
    pub queue: Option<Vec<Floor>>,
    pub moving: Option<bool>,
    pub direction: Option<Direction>,
}

impl ElevatorSnapshot {
    pub fn new(current_floor: Floor, door_open: bool) -> Self {
        Self {
            current_floor,
            door_open,
            log: None,
            dfa_trace: None,
            queue: None,
            moving: None,
            direction: None,
        }
    }

    pub fn has_queued_floors(&self) -> bool {
        self.queue.as_ref().is_some_and(|queue| !queue.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    ControllerError(String),
    Snapshot(ElevatorSnapshot),
}

impl TryFrom<StatusResponse> for StatusReport {
    type Error = DomainError;

    fn try_from(value: StatusResponse) -> Result<Self, Self::Error> {
        if let Some(error) = value.error.filter(|error| !error.is_empty()) {
            return Ok(StatusReport::ControllerError(error));
        }

        let current_floor = value
            .current_floor
            .ok_or(DomainError::MissingStatusField("current_floor"))?;
        let door_open = value
            .door_open
            .ok_or(DomainError::MissingStatusField("door_open"))?;

        Ok(StatusReport::Snapshot(ElevatorSnapshot {
            current_floor,
            door_open,
            log: value.log,
            dfa_trace: value.dfa_trace,
            queue: value.queue,
            moving: value.moving,
            direction: value.direction,
        }))
    }
}

impl From<ElevatorSnapshot> for StatusResponse {
    fn from(value: ElevatorSnapshot) -> Self {
        Self {
            current_floor: Some(value.current_floor),
            door_open: Some(value.door_open),
            error: None,
            log: value.log,
            dfa_trace: value.dfa_trace,
            queue: value.queue,
            moving: value.moving,
            direction: value.direction,
        }
    }
}
