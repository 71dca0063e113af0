use std::sync::Arc;

use anyhow::{Context, Result};
use shared::{
    domain::{ElevatorId, Floor},
    protocol::{ElevatorSnapshot, FloorRequest, StatusReport},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod panel;
pub mod reconcile;
pub mod session;
pub mod transport;
pub mod validity;

pub use config::{load_settings, ClientSettings, ElevatorProfile, InvalidFloorTreatment};
pub use error::ClientError;
pub use panel::{ButtonControl, ButtonHandle, ButtonVisual, Validity};
pub use reconcile::{ElevatorPhase, ReconcileOutcome};
pub use session::{CarView, PanelView, Ticket, TraceLogView};
pub use transport::{ElevatorController, HttpElevatorController};
pub use validity::{FloorValidity, ValiditySource};

use crate::{reconcile::reconcile, session::Session, validity::derive_valid_floors};

#[derive(Debug, Clone)]
pub enum ClientEvent {
    ElevatorSelected {
        elevator: ElevatorId,
        generation: u64,
    },
    ValidityDerived {
        elevator: ElevatorId,
        validity: FloorValidity,
    },
    ButtonChanged {
        floor: Floor,
        visual: ButtonVisual,
    },
    ButtonsReset,
    ViewUpdated(PanelView),
    /// Controller-reported error the operator has to acknowledge.
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    Accepted,
    Rejected { message: Option<String> },
    /// The selection changed while the request was in flight; nothing was
    /// marked.
    Stale { success: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied(ElevatorSnapshot),
    Alerted(String),
    Stale,
}

/// Owns the session and drives every exchange with the controller.
pub struct ElevatorClient {
    controller: Arc<dyn ElevatorController>,
    settings: ClientSettings,
    session: Mutex<Session>,
    events: broadcast::Sender<ClientEvent>,
}

impl ElevatorClient {
    pub fn new(settings: ClientSettings) -> Result<Arc<Self>> {
        let controller =
            HttpElevatorController::new(&settings.controller_url, settings.request_timeout())
                .context("failed to create controller transport")?;
        Self::new_with_controller(settings, Arc::new(controller))
    }

    pub fn new_with_controller(
        settings: ClientSettings,
        controller: Arc<dyn ElevatorController>,
    ) -> Result<Arc<Self>> {
        settings.validate()?;
        let initial = settings.initial_elevator()?.clone();
        let (events, _) = broadcast::channel(256);
        Ok(Arc::new(Self {
            controller,
            settings,
            session: Mutex::new(Session::new(initial)),
            events,
        }))
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> PanelView {
        self.session.lock().await.view()
    }

    pub async fn active_elevator(&self) -> ElevatorId {
        self.session.lock().await.active().id.clone()
    }

    pub async fn validity(&self) -> Option<FloorValidity> {
        self.session.lock().await.validity().cloned()
    }

    /// Handle for `floor` on the panel as currently built.
    pub async fn button_handle(&self, floor: Floor) -> ButtonHandle {
        self.session.lock().await.panel().handle(floor)
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    /// Switches the active elevator, rebuilds the panel, derives the floor
    /// validity set and refreshes status.
    pub async fn select_elevator(self: &Arc<Self>, elevator: &ElevatorId) -> Result<()> {
        let profile = self
            .settings
            .profile(elevator)
            .cloned()
            .ok_or_else(|| ClientError::UnknownElevator(elevator.clone()))?;

        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.activate(profile.clone());
            self.emit(ClientEvent::ElevatorSelected {
                elevator: ticket.elevator.clone(),
                generation: ticket.generation,
            });
            self.emit(ClientEvent::ViewUpdated(session.view()));
            ticket
        };
        info!(
            elevator = %ticket.elevator,
            generation = ticket.generation,
            "elevator selected"
        );

        let observed = if profile.floors.is_some() {
            None
        } else {
            match self.load_status(&ticket.elevator).await {
                Ok(StatusReport::Snapshot(snapshot)) => Some(snapshot),
                Ok(StatusReport::ControllerError(message)) => {
                    debug!(elevator = %ticket.elevator, %message, "validity lookup returned controller error");
                    None
                }
                Err(err) => {
                    debug!(elevator = %ticket.elevator, "validity lookup failed: {err:#}");
                    None
                }
            }
        };
        let validity = derive_valid_floors(&profile, observed.as_ref());

        {
            let mut session = self.session.lock().await;
            if session.is_current(&ticket) {
                session
                    .panel
                    .apply_validity(&validity.floors, self.settings.invalid_floor_treatment);
                session.validity = Some(validity.clone());
                self.emit(ClientEvent::ValidityDerived {
                    elevator: ticket.elevator.clone(),
                    validity,
                });
            } else {
                debug!(elevator = %ticket.elevator, "discarding validity for superseded selection");
            }
        }

        if let Err(err) = self.fetch_status().await {
            warn!(elevator = %ticket.elevator, "status refresh after selection failed: {err:#}");
        }
        Ok(())
    }

    /// Presses the button for `floor` on the current panel.
    pub async fn press_floor(self: &Arc<Self>, floor: Floor) -> Result<PressOutcome> {
        let handle = self.button_handle(floor).await;
        self.press(handle).await
    }

    /// Sends a floor request for the active elevator, marks the button with
    /// the outcome, then refreshes status once.
    pub async fn press(self: &Arc<Self>, handle: ButtonHandle) -> Result<PressOutcome> {
        let ticket = {
            let session = self.session.lock().await;
            if handle.generation != session.generation() {
                return Err(ClientError::StaleButton {
                    floor: handle.floor,
                    handle_generation: handle.generation,
                    current_generation: session.generation(),
                }
                .into());
            }
            let disabled = session
                .panel()
                .button(handle.floor)
                .is_some_and(|button| button.validity == Validity::Disabled);
            if disabled {
                return Err(ClientError::FloorDisabled {
                    elevator: session.active().id.clone(),
                    floor: handle.floor,
                }
                .into());
            }
            session.ticket()
        };

        let request = FloorRequest {
            elevator_id: ticket.elevator.clone(),
            floor: handle.floor,
        };
        let response = match self.controller.press_button(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    elevator = %ticket.elevator,
                    floor = %handle.floor,
                    "press_button failed: {err:#}"
                );
                return Err(ClientError::Transport {
                    elevator: ticket.elevator,
                    reason: format!("{err:#}"),
                }
                .into());
            }
        };

        let outcome = {
            let mut session = self.session.lock().await;
            if !session.is_current(&ticket) {
                debug!(
                    elevator = %ticket.elevator,
                    floor = %handle.floor,
                    "discarding press response for superseded selection"
                );
                PressOutcome::Stale {
                    success: response.success,
                }
            } else if response.success {
                session
                    .panel
                    .set_visual(handle, ButtonVisual::PendingSuccess);
                self.emit(ClientEvent::ButtonChanged {
                    floor: handle.floor,
                    visual: ButtonVisual::PendingSuccess,
                });
                PressOutcome::Accepted
            } else {
                if let Some(stamp) = session
                    .panel
                    .set_visual(handle, ButtonVisual::PendingFailure)
                {
                    self.schedule_failure_reset(handle, stamp);
                }
                self.emit(ClientEvent::ButtonChanged {
                    floor: handle.floor,
                    visual: ButtonVisual::PendingFailure,
                });
                PressOutcome::Rejected {
                    message: response.message.clone(),
                }
            }
        };
        info!(
            elevator = %ticket.elevator,
            floor = %handle.floor,
            ?outcome,
            "floor request resolved"
        );

        if let Err(err) = self.fetch_status().await {
            warn!(elevator = %ticket.elevator, "status refresh after press failed: {err:#}");
        }
        Ok(outcome)
    }

    fn schedule_failure_reset(self: &Arc<Self>, handle: ButtonHandle, stamp: u64) {
        let client = Arc::clone(self);
        let delay = self.settings.failure_reset();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = client.session.lock().await;
            if session.panel.clear_failure(handle, stamp) {
                client.emit(ClientEvent::ButtonChanged {
                    floor: handle.floor,
                    visual: ButtonVisual::Neutral,
                });
            }
        });
    }

    async fn load_status(&self, elevator: &ElevatorId) -> Result<StatusReport> {
        let raw = self
            .controller
            .get_status(elevator)
            .await
            .map_err(|err| ClientError::Transport {
                elevator: elevator.clone(),
                reason: format!("{err:#}"),
            })?;
        let report = StatusReport::try_from(raw).map_err(|err| ClientError::MalformedStatus {
            elevator: elevator.clone(),
            reason: err.to_string(),
        })?;
        Ok(report)
    }

    /// Fetches the active elevator's status and reconciles the session.
    pub async fn fetch_status(&self) -> Result<FetchOutcome> {
        let ticket = self.session.lock().await.ticket();

        let report = match self.load_status(&ticket.elevator).await {
            Ok(report) => report,
            Err(err) => {
                warn!(elevator = %ticket.elevator, "get_status failed: {err:#}");
                return Err(err);
            }
        };

        let mut session = self.session.lock().await;
        if !session.is_current(&ticket) {
            debug!(
                elevator = %ticket.elevator,
                generation = ticket.generation,
                "discarding status for superseded selection"
            );
            return Ok(FetchOutcome::Stale);
        }

        match reconcile(&mut session, report) {
            ReconcileOutcome::Alert(message) => {
                warn!(elevator = %ticket.elevator, %message, "controller reported an error");
                self.emit(ClientEvent::Alert(message.clone()));
                Ok(FetchOutcome::Alerted(message))
            }
            ReconcileOutcome::Applied {
                snapshot,
                buttons_reset,
            } => {
                if buttons_reset {
                    self.emit(ClientEvent::ButtonsReset);
                }
                self.emit(ClientEvent::ViewUpdated(session.view()));
                Ok(FetchOutcome::Applied(snapshot))
            }
        }
    }

    /// Asks the controller whether `floor` is serviceable by the active
    /// elevator. Presses never consult this.
    pub async fn validate_floor(&self, floor: Floor) -> Result<bool> {
        let elevator = self.active_elevator().await;
        let response = self
            .controller
            .validate_button(&FloorRequest {
                elevator_id: elevator,
                floor,
            })
            .await?;
        Ok(response.valid)
    }

    /// Polls immediately, then every `poll_interval` until the handle is
    /// aborted. Each fetch runs on its own task so a stalled request never
    /// holds up the next tick.
    pub fn spawn_polling(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        let period = self.settings.poll_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    let _ = client.fetch_status().await;
                });
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
