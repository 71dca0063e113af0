use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("floor {0} is outside the floor catalog (0..=13)")]
    FloorOutOfRange(i64),
    #[error("status response is missing required field `{0}`")]
    MissingStatusField(&'static str),
}
