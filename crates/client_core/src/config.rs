use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::domain::{ElevatorId, Floor};

use crate::error::ClientError;

pub const DEFAULT_SETTINGS_FILE: &str = "elevator.toml";

/// How buttons outside an elevator's serviceable floor set are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidFloorTreatment {
    /// The validity set is derived but nothing is marked.
    #[default]
    Ignore,
    Unstyled,
    Disabled,
}

impl FromStr for InvalidFloorTreatment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "unstyled" => Ok(Self::Unstyled),
            "disabled" => Ok(Self::Disabled),
            other => Err(ClientError::Config(format!(
                "unknown invalid_floor_treatment '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElevatorProfile {
    pub id: ElevatorId,
    pub label: String,
    /// Serviceable floors declared by the installation. When absent the
    /// label heuristic is used.
    #[serde(default)]
    pub floors: Option<Vec<Floor>>,
}

impl ElevatorProfile {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: ElevatorId::new(id),
            label: label.to_string(),
            floors: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub controller_url: String,
    pub poll_interval_ms: u64,
    pub failure_reset_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub invalid_floor_treatment: InvalidFloorTreatment,
    pub default_elevator: Option<ElevatorId>,
    pub elevators: Vec<ElevatorProfile>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            controller_url: "http://127.0.0.1:5000".into(),
            poll_interval_ms: 2000,
            failure_reset_ms: 2000,
            request_timeout_ms: Some(5000),
            invalid_floor_treatment: InvalidFloorTreatment::Ignore,
            default_elevator: None,
            elevators: vec![
                ElevatorProfile::new("E1", "E1 (even)"),
                ElevatorProfile::new("E2", "E2 (even)"),
                ElevatorProfile::new("E3", "E3 (odd)"),
                ElevatorProfile::new("E4", "E4 (odd)"),
            ],
        }
    }
}

impl ClientSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn failure_reset(&self) -> Duration {
        Duration::from_millis(self.failure_reset_ms)
    }

    /// Per-request bound on controller calls. Zero turns it off.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn profile(&self, id: &ElevatorId) -> Option<&ElevatorProfile> {
        self.elevators.iter().find(|profile| &profile.id == id)
    }

    /// The elevator that is active when a session starts.
    pub fn initial_elevator(&self) -> Result<&ElevatorProfile, ClientError> {
        match &self.default_elevator {
            Some(id) => self
                .profile(id)
                .ok_or_else(|| ClientError::UnknownElevator(id.clone())),
            None => self
                .elevators
                .first()
                .ok_or_else(|| ClientError::Config("no elevators configured".to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.poll_interval_ms == 0 {
            return Err(ClientError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        for (idx, profile) in self.elevators.iter().enumerate() {
            if self.elevators[..idx].iter().any(|p| p.id == profile.id) {
                return Err(ClientError::Config(format!(
                    "elevator {} is configured twice",
                    profile.id
                )));
            }
        }
        self.initial_elevator()?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    controller_url: Option<String>,
    poll_interval_ms: Option<u64>,
    failure_reset_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    invalid_floor_treatment: Option<InvalidFloorTreatment>,
    default_elevator: Option<ElevatorId>,
    elevators: Option<Vec<ElevatorProfile>>,
}

/// Builds settings from defaults, then `path` (or `elevator.toml` in the
/// working directory if present), then environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    match fs::read_to_string(&file) {
        Ok(raw) => {
            apply_file_settings(&mut settings, &raw)
                .with_context(|| format!("failed to parse settings file '{}'", file.display()))?;
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", file.display()));
        }
        Err(_) => {}
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

pub fn apply_file_settings(settings: &mut ClientSettings, raw: &str) -> Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.controller_url {
        settings.controller_url = v;
    }
    if let Some(v) = file.poll_interval_ms {
        settings.poll_interval_ms = v;
    }
    if let Some(v) = file.failure_reset_ms {
        settings.failure_reset_ms = v;
    }
    if let Some(v) = file.request_timeout_ms {
        settings.request_timeout_ms = Some(v);
    }
    if let Some(v) = file.invalid_floor_treatment {
        settings.invalid_floor_treatment = v;
    }
    if let Some(v) = file.default_elevator {
        settings.default_elevator = Some(v);
    }
    if let Some(v) = file.elevators {
        settings.elevators = v;
    }
    Ok(())
}

pub fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ClientError> {
    if let Some(v) = lookup("ELEVATOR_CONTROLLER_URL") {
        settings.controller_url = v;
    }
    if let Some(v) = lookup("APP__CONTROLLER_URL") {
        settings.controller_url = v;
    }

    if let Some(v) = lookup("APP__POLL_INTERVAL_MS") {
        settings.poll_interval_ms = parse_millis("APP__POLL_INTERVAL_MS", &v)?;
    }
    if let Some(v) = lookup("APP__FAILURE_RESET_MS") {
        settings.failure_reset_ms = parse_millis("APP__FAILURE_RESET_MS", &v)?;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = Some(parse_millis("APP__REQUEST_TIMEOUT_MS", &v)?);
    }

    if let Some(v) = lookup("APP__INVALID_FLOOR_TREATMENT") {
        settings.invalid_floor_treatment = v.parse()?;
    }
    if let Some(v) = lookup("APP__DEFAULT_ELEVATOR") {
        settings.default_elevator = Some(ElevatorId::new(v));
    }

    Ok(())
}

fn parse_millis(key: &str, raw: &str) -> Result<u64, ClientError> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{key} must be a whole number of milliseconds")))
}
