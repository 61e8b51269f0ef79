//! Resource provider registration.
//!
//! A subscription must register a provider namespace before it can create
//! resources in it. ARM answers 409 `MissingSubscriptionRegistration` until
//! that happens, so the client registers on demand and waits.

use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::client::{check_status, ArmClient};
use crate::error::{ArmError, ArmResult};

const API_VERSION: &str = "2016-02-01";
const MAX_POLLS: u32 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Provider {
    #[serde(default)]
    registration_state: Option<String>,
}

/// Subscription and provider namespace targeted by an ARM path such as
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/...`.
pub fn target_from_path(path: &str) -> Option<(String, String)> {
    let components: Vec<&str> = path.trim_matches('/').split('/').collect();
    let subscription = components
        .iter()
        .position(|c| c.eq_ignore_ascii_case("subscriptions"))
        .and_then(|i| components.get(i + 1))?;
    let namespace = components
        .iter()
        .rposition(|c| c.eq_ignore_ascii_case("providers"))
        .and_then(|i| components.get(i + 1))?;
    Some((subscription.to_string(), namespace.to_string()))
}

/// Register `namespace` and wait for ARM to report it as `Registered`.
#[instrument(skip(client))]
pub async fn register(client: &ArmClient, subscription_id: &str, namespace: &str) -> ArmResult<()> {
    let operation = "registering resource provider";
    let base = format!("/subscriptions/{subscription_id}/providers/{namespace}");
    let registration_error = |message: String| ArmError::Registration {
        namespace: namespace.to_string(),
        message,
    };

    let mut url = client.url_for(operation, &format!("{base}/register"))?;
    url.query_pairs_mut().append_pair("api-version", API_VERSION);
    let response = client.send_once(operation, Method::POST, url, None).await?;
    check_status(operation, &[200], response).map_err(|e| registration_error(e.to_string()))?;
    info!("registration requested");

    let mut url = client.url_for(operation, &base)?;
    url.query_pairs_mut().append_pair("api-version", API_VERSION);
    let interval = client.options().poll_interval.min(Duration::from_secs(10));

    for _ in 0..MAX_POLLS {
        let response = client.send_once(operation, Method::GET, url.clone(), None).await?;
        let response = check_status(operation, &[200], response).map_err(|e| registration_error(e.to_string()))?;
        let provider: Provider = response.json(operation)?;
        match provider.registration_state.as_deref() {
            Some(state) if state.eq_ignore_ascii_case("Registered") => {
                info!("resource provider registered");
                return Ok(());
            }
            _ => tokio::time::sleep(interval).await,
        }
    }

    Err(registration_error(format!(
        "still not registered after {MAX_POLLS} checks"
    )))
}
