use shared::domain::{ElevatorId, Floor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unknown elevator {0}")]
    UnknownElevator(ElevatorId),
    #[error("floor {floor} is disabled for elevator {elevator}")]
    FloorDisabled { elevator: ElevatorId, floor: Floor },
    #[error("button for floor {floor} belongs to panel generation {handle_generation}, current is {current_generation}")]
    StaleButton {
        floor: Floor,
        handle_generation: u64,
        current_generation: u64,
    },
    #[error("controller request failed for elevator {elevator}: {reason}")]
    Transport { elevator: ElevatorId, reason: String },
    #[error("malformed status response for elevator {elevator}: {reason}")]
    MalformedStatus { elevator: ElevatorId, reason: String },
    #[error("invalid controller url '{url}': {reason}")]
    InvalidControllerUrl { url: String, reason: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}
