//! Session state owned by [`crate::ElevatorClient`].

use shared::domain::{ElevatorId, Floor};

use crate::{
    config::ElevatorProfile,
    panel::{ButtonControl, Panel},
    validity::FloorValidity,
};

pub const CAR_STEP_PX: u32 = 30;
pub const DOOR_OPEN_TEXT: &str = "Door Open";
pub const DOOR_CLOSED_TEXT: &str = "Door Closed";

/// Elevator and selection epoch a request was dispatched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub elevator: ElevatorId,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarView {
    pub floor: Option<Floor>,
    pub offset_px: u32,
    pub door_text: String,
}

impl CarView {
    pub fn update(&mut self, floor: Floor, door_open: bool) {
        self.floor = Some(floor);
        self.offset_px = u32::from(floor.number()) * CAR_STEP_PX;
        self.door_text = if door_open {
            DOOR_OPEN_TEXT
        } else {
            DOOR_CLOSED_TEXT
        }
        .to_string();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLogView {
    pub text: String,
    pub scrolled_to_end: bool,
}

impl TraceLogView {
    pub fn rebuild(&mut self, log: Option<&[String]>, trace: Option<&str>) {
        self.text.clear();
        for line in log.unwrap_or_default() {
            self.text.push_str(line);
            self.text.push('\n');
        }
        if let Some(trace) = trace.filter(|t| !t.is_empty()) {
            self.text.push_str(trace);
            self.text.push('\n');
        }
        self.scrolled_to_end = true;
    }
}

/// Everything a front end needs to draw the control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub elevator: ElevatorId,
    pub elevator_label: String,
    pub generation: u64,
    pub buttons: Vec<ButtonControl>,
    pub car: CarView,
    pub trace: TraceLogView,
}

#[derive(Debug)]
pub struct Session {
    active: ElevatorProfile,
    generation: u64,
    pub(crate) panel: Panel,
    pub(crate) car: CarView,
    pub(crate) trace: TraceLogView,
    pub(crate) validity: Option<FloorValidity>,
}

impl Session {
    pub fn new(initial: ElevatorProfile) -> Self {
        Self {
            active: initial,
            generation: 0,
            panel: Panel::new(0),
            car: CarView::default(),
            trace: TraceLogView::default(),
            validity: None,
        }
    }

    pub fn active(&self) -> &ElevatorProfile {
        &self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn validity(&self) -> Option<&FloorValidity> {
        self.validity.as_ref()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            elevator: self.active.id.clone(),
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Starts a new selection epoch and replaces the panel wholesale.
    pub fn activate(&mut self, profile: ElevatorProfile) -> Ticket {
        self.active = profile;
        self.generation += 1;
        self.panel.rebuild(self.generation);
        self.validity = None;
        self.ticket()
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            elevator: self.active.id.clone(),
            elevator_label: self.active.label.clone(),
            generation: self.generation,
            buttons: self.panel.buttons().to_vec(),
            car: self.car.clone(),
            trace: self.trace.clone(),
        }
    }
}
