//! HTTP boundary to the elevator controller.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::ElevatorId,
    protocol::{FloorRequest, PressButtonResponse, StatusQuery, StatusResponse, ValidateButtonResponse},
};
use url::Url;

use crate::error::ClientError;

#[async_trait]
pub trait ElevatorController: Send + Sync {
    async fn press_button(&self, request: &FloorRequest) -> Result<PressButtonResponse>;
    async fn get_status(&self, elevator_id: &ElevatorId) -> Result<StatusResponse>;
    async fn validate_button(&self, request: &FloorRequest) -> Result<ValidateButtonResponse>;
}

pub struct HttpElevatorController {
    http: Client,
    base_url: Url,
}

impl HttpElevatorController {
    pub fn new(controller_url: &str, request_timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(controller_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build controller http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build controller endpoint '{path}'"))
    }
}

/// Parses the controller URL and forces a trailing slash so endpoint joins
/// keep any mount path (`http://host/lift` -> `http://host/lift/get_status`).
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|err| ClientError::InvalidControllerUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidControllerUrl {
            url: raw.to_string(),
            reason: "controller url must start with http:// or https://".to_string(),
        }
        .into());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl ElevatorController for HttpElevatorController {
    async fn press_button(&self, request: &FloorRequest) -> Result<PressButtonResponse> {
        let res = self
            .http
            .post(self.endpoint("press_button")?)
            .json(request)
            .send()
            .await
            .context("press_button request failed")?
            .error_for_status()?;
        res.json()
            .await
            .context("press_button returned malformed json")
    }

    async fn get_status(&self, elevator_id: &ElevatorId) -> Result<StatusResponse> {
        let res = self
            .http
            .get(self.endpoint("get_status")?)
            .query(&StatusQuery {
                elevator_id: elevator_id.clone(),
            })
            .send()
            .await
            .context("get_status request failed")?
            .error_for_status()?;
        res.json()
            .await
            .context("get_status returned malformed json")
    }

    async fn validate_button(&self, request: &FloorRequest) -> Result<ValidateButtonResponse> {
        let res = self
            .http
            .post(self.endpoint("validate_button")?)
            .json(request)
            .send()
            .await
            .context("validate_button request failed")?
            .error_for_status()?;
        res.json()
            .await
            .context("validate_button returned malformed json")
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
