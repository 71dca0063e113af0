use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const FLOOR_COUNT: u8 = 14;
pub const GROUND_FLOOR_LABEL: &str = "Ground Floor";

/// A floor identifier in the closed range `0..=13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Floor(u8);

impl Floor {
    pub const GROUND: Floor = Floor(0);

    pub const ALL: [Floor; FLOOR_COUNT as usize] = [
        Floor(0),
        Floor(1),
        Floor(2),
        Floor(3),
        Floor(4),
        Floor(5),
        Floor(6),
        Floor(7),
        Floor(8),
        Floor(9),
        Floor(10),
        Floor(11),
        Floor(12),
        Floor(13),
    ];

    pub fn new(number: i64) -> Result<Self, DomainError> {
        u8::try_from(number)
            .ok()
            .filter(|n| *n < FLOOR_COUNT)
            .map(Floor)
            .ok_or(DomainError::FloorOutOfRange(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        if self == Self::GROUND {
            GROUND_FLOOR_LABEL.to_string()
        } else {
            self.0.to_string()
        }
    }

    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }
}

impl TryFrom<i64> for Floor {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Floor::new(value)
    }
}

impl From<Floor> for i64 {
    fn from(value: Floor) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every floor in catalog order.
pub fn floor_catalog() -> &'static [Floor] {
    &Floor::ALL
}

pub fn even_floors() -> Vec<Floor> {
    Floor::ALL.into_iter().filter(|f| !f.is_odd()).collect()
}

pub fn odd_floors() -> Vec<Floor> {
    Floor::ALL.into_iter().filter(|f| f.is_odd()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElevatorId(pub String);

impl ElevatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}
