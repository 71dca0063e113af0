//! Floor-request button panel for the active elevator.

use std::collections::BTreeSet;

use shared::domain::{floor_catalog, Floor};

use crate::config::InvalidFloorTreatment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVisual {
    #[default]
    Neutral,
    PendingSuccess,
    PendingFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Unmarked,
    Invalid,
    Disabled,
}

/// Addresses one button of one panel build. A handle from an older build
/// never touches the current panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonHandle {
    pub floor: Floor,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonControl {
    pub floor: Floor,
    pub label: String,
    pub visual: ButtonVisual,
    pub validity: Validity,
    stamp: u64,
}

impl ButtonControl {
    fn new(floor: Floor) -> Self {
        Self {
            floor,
            label: floor.label(),
            visual: ButtonVisual::Neutral,
            validity: Validity::Unmarked,
            stamp: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    generation: u64,
    buttons: Vec<ButtonControl>,
}

impl Panel {
    pub fn new(generation: u64) -> Self {
        let mut panel = Self {
            generation,
            buttons: Vec::new(),
        };
        panel.rebuild(generation);
        panel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops every button and builds one neutral button per catalog floor.
    pub fn rebuild(&mut self, generation: u64) {
        self.generation = generation;
        self.buttons = floor_catalog().iter().copied().map(ButtonControl::new).collect();
    }

    /// Returns whether any button changed.
    pub fn reset_visuals(&mut self) -> bool {
        let mut changed = false;
        for button in &mut self.buttons {
            if button.visual != ButtonVisual::Neutral {
                button.visual = ButtonVisual::Neutral;
                button.stamp += 1;
                changed = true;
            }
        }
        changed
    }

    pub fn handle(&self, floor: Floor) -> ButtonHandle {
        ButtonHandle {
            floor,
            generation: self.generation,
        }
    }

    pub fn buttons(&self) -> &[ButtonControl] {
        &self.buttons
    }

    pub fn button(&self, floor: Floor) -> Option<&ButtonControl> {
        self.buttons.get(usize::from(floor.number()))
    }

    fn button_mut(&mut self, handle: ButtonHandle) -> Option<&mut ButtonControl> {
        if handle.generation != self.generation {
            return None;
        }
        self.buttons.get_mut(usize::from(handle.floor.number()))
    }

    /// Sets the visual state and returns the mark stamp, or `None` if the
    /// handle belongs to an older build.
    pub fn set_visual(&mut self, handle: ButtonHandle, visual: ButtonVisual) -> Option<u64> {
        let button = self.button_mut(handle)?;
        button.visual = visual;
        button.stamp += 1;
        Some(button.stamp)
    }

    /// Clears a pending-failure mark only if it is still the mark identified
    /// by `stamp`.
    pub fn clear_failure(&mut self, handle: ButtonHandle, stamp: u64) -> bool {
        let Some(button) = self.button_mut(handle) else {
            return false;
        };
        if button.stamp != stamp || button.visual != ButtonVisual::PendingFailure {
            return false;
        }
        button.visual = ButtonVisual::Neutral;
        button.stamp += 1;
        true
    }

    pub fn apply_validity(&mut self, valid: &BTreeSet<Floor>, treatment: InvalidFloorTreatment) {
        let invalid_marking = match treatment {
            InvalidFloorTreatment::Ignore => Validity::Unmarked,
            InvalidFloorTreatment::Unstyled => Validity::Invalid,
            InvalidFloorTreatment::Disabled => Validity::Disabled,
        };
        for button in &mut self.buttons {
            button.validity = if valid.contains(&button.floor) {
                Validity::Unmarked
            } else {
                invalid_marking
            };
        }
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
