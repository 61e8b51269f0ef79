//! Long-running operation polling.
//!
//! ARM signals an LRO in one of three ways, checked in this order:
//!
//! 1. an `Azure-AsyncOperation` header pointing at a status document,
//! 2. a `Location` header that answers 202 until the operation is done,
//! 3. a `properties.provisioningState` on the returned resource that is not
//!    yet terminal, in which case the resource itself is re-read.

use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::client::{retry_after, ArmClient, ArmResponse, RequestOptions};
use crate::error::{ArmError, ArmResult};

const AZURE_ASYNC_OPERATION: &str = "Azure-AsyncOperation";
const LOCATION: &str = "Location";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollingStrategy {
    /// Nothing to wait for.
    Done,
    AsyncOperation { status_url: Url },
    Location { url: Url },
    ProvisioningState,
}

#[derive(Debug, Default, Deserialize)]
struct StatusDocument {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<StatusError>,
    #[serde(default)]
    properties: Option<StatusProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusProperties {
    #[serde(default)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Succeeded,
    Failed,
    Canceled,
}

fn terminal(status: &str) -> Option<Terminal> {
    if status.eq_ignore_ascii_case("Succeeded") {
        Some(Terminal::Succeeded)
    } else if status.eq_ignore_ascii_case("Failed") {
        Some(Terminal::Failed)
    } else if status.eq_ignore_ascii_case("Canceled") || status.eq_ignore_ascii_case("Cancelled") {
        Some(Terminal::Canceled)
    } else {
        None
    }
}

fn provisioning_state(body: &[u8]) -> Option<String> {
    let document: StatusDocument = serde_json::from_slice(body).ok()?;
    document.properties?.provisioning_state
}

/// Drives one long-running operation to completion.
#[derive(Debug)]
pub struct Poller<'a> {
    client: &'a ArmClient,
    operation: String,
    method: Method,
    resource_url: Url,
    strategy: PollingStrategy,
    last: ArmResponse,
}

impl<'a> Poller<'a> {
    /// Pick a strategy from the initial response. `resource_url` is the URL
    /// the operation was sent to, used for the final GET and for
    /// provisioning-state polling.
    pub fn new(
        client: &'a ArmClient,
        operation: impl Into<String>,
        method: Method,
        resource_url: Url,
        initial: ArmResponse,
    ) -> ArmResult<Self> {
        let operation = operation.into();
        let strategy = if let Some(status_url) = initial.header(AZURE_ASYNC_OPERATION) {
            PollingStrategy::AsyncOperation {
                status_url: client.url_for(&operation, status_url)?,
            }
        } else if let Some(location) = initial
            .header(LOCATION)
            .filter(|_| matches!(initial.status, 201 | 202))
        {
            PollingStrategy::Location {
                url: client.url_for(&operation, location)?,
            }
        } else if method != Method::DELETE
            && provisioning_state(&initial.body).is_some_and(|state| terminal(&state).is_none())
        {
            PollingStrategy::ProvisioningState
        } else {
            PollingStrategy::Done
        };
        debug!(?strategy, "selected polling strategy");

        Ok(Self {
            client,
            operation,
            method,
            resource_url,
            strategy,
            last: initial,
        })
    }

    pub fn strategy(&self) -> &PollingStrategy {
        &self.strategy
    }

    fn interval(&self) -> Duration {
        retry_after(&self.last.headers).unwrap_or(self.client.options().poll_interval)
    }

    fn failed(&self, status: &str, code: Option<String>, message: Option<String>) -> ArmError {
        ArmError::LongRunningOperation {
            operation: self.operation.clone(),
            status: status.to_string(),
            code: code.unwrap_or_else(|| "Unknown".to_string()),
            message: message.unwrap_or_default(),
        }
    }

    /// Wait for the operation to finish. Returns the final resource for
    /// PUT/PATCH, otherwise the last response seen.
    #[instrument(skip(self), fields(operation = %self.operation))]
    pub async fn poll_until_done(mut self) -> ArmResult<ArmResponse> {
        match self.strategy.clone() {
            PollingStrategy::Done => Ok(self.last),
            PollingStrategy::AsyncOperation { status_url } => {
                loop {
                    tokio::time::sleep(self.interval()).await;
                    self.last = self
                        .client
                        .send_url(&self.operation, Method::GET, status_url.clone(), None, &[200, 201, 202])
                        .await?;
                    let document: StatusDocument = self.last.json(&self.operation)?;
                    let status = document.status.unwrap_or_default();
                    debug!(%status, "polled operation status");
                    match terminal(&status) {
                        Some(Terminal::Succeeded) => break,
                        Some(_) => {
                            let error = document.error.unwrap_or_default();
                            return Err(self.failed(&status, error.code, error.message));
                        }
                        None => {}
                    }
                }
                self.final_resource().await
            }
            PollingStrategy::Location { url } => {
                let expected: &[u16] = if self.method == Method::DELETE {
                    &[200, 201, 202, 204, 404]
                } else {
                    &[200, 201, 202, 204]
                };
                loop {
                    tokio::time::sleep(self.interval()).await;
                    self.last = self
                        .client
                        .send_url(&self.operation, Method::GET, url.clone(), None, expected)
                        .await?;
                    debug!(status = self.last.status, "polled location");
                    if self.last.status != 202 {
                        break;
                    }
                }
                self.final_resource().await
            }
            PollingStrategy::ProvisioningState => loop {
                tokio::time::sleep(self.interval()).await;
                self.last = self
                    .client
                    .send_url(&self.operation, Method::GET, self.resource_url.clone(), None, &[200])
                    .await?;
                let document: StatusDocument = self.last.json(&self.operation)?;
                let state = document
                    .properties
                    .and_then(|p| p.provisioning_state)
                    .unwrap_or_else(|| "Succeeded".to_string());
                debug!(%state, "polled provisioning state");
                match terminal(&state) {
                    Some(Terminal::Succeeded) => return Ok(self.last),
                    Some(_) => return Err(self.failed(&state, None, Some(format!("provisioning state is {state}")))),
                    None => {}
                }
            },
        }
    }

    async fn final_resource(self) -> ArmResult<ArmResponse> {
        if self.method == Method::PUT || self.method == Method::PATCH {
            return self
                .client
                .send_url(&self.operation, Method::GET, self.resource_url, None, &[200])
                .await;
        }
        Ok(self.last)
    }
}

/// Send a request and wait for the LRO it starts.
pub async fn execute_then_poll(client: &ArmClient, request: RequestOptions<'_>) -> ArmResult<ArmResponse> {
    let url = client.request_url(&request)?;
    let operation = request.operation;
    let method = request.method.clone();
    let initial = client.execute(request).await?;
    Poller::new(client, operation, method, url, initial)?.poll_until_done().await
}

pub async fn execute_with_body_then_poll<B: Serialize + ?Sized>(
    client: &ArmClient,
    request: RequestOptions<'_>,
    body: &B,
) -> ArmResult<ArmResponse> {
    let url = client.request_url(&request)?;
    let operation = request.operation;
    let method = request.method.clone();
    let initial = client.execute_with_body(request, body).await?;
    Poller::new(client, operation, method, url, initial)?.poll_until_done().await
}
