use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::TokenCredential;
use crate::environment::Environment;
use crate::error::{ArmError, ArmResult, ErrorResponse};
use crate::registration;

const DEFAULT_USER_AGENT: &str = concat!("azurerm-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// How many times a throttled (429) request is retried.
    pub max_retries: u32,
    /// Wait between retries when the response has no `Retry-After`.
    pub retry_delay: Duration,
    /// Default interval between long-running-operation polls.
    pub poll_interval: Duration,
    /// Register missing resource providers on `MissingSubscriptionRegistration`.
    pub register_providers: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(10),
            register_providers: true,
            timeout: Duration::from_secs(120),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Describes one ARM call: method, path relative to the endpoint, query
/// parameters (the `api-version` among them) and the statuses that count as
/// success.
#[derive(Debug, Clone)]
pub struct RequestOptions<'a> {
    pub operation: &'a str,
    pub method: Method,
    pub path: &'a str,
    pub api_version: &'a str,
    pub query: Vec<(&'a str, String)>,
    pub expected_status_codes: &'static [u16],
}

impl<'a> RequestOptions<'a> {
    pub fn new(
        operation: &'a str,
        method: Method,
        path: &'a str,
        api_version: &'a str,
        expected_status_codes: &'static [u16],
    ) -> Self {
        Self {
            operation,
            method,
            path,
            api_version,
            query: Vec::new(),
            expected_status_codes,
        }
    }

    pub fn with_query(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

/// A response whose status has already been checked.
#[derive(Debug, Clone)]
pub struct ArmResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ArmResponse {
    pub fn json<T: DeserializeOwned>(&self, operation: &str) -> ArmResult<T> {
        serde_json::from_slice(&self.body).map_err(|source| ArmError::Unmarshal {
            operation: operation.to_string(),
            source,
        })
    }

    /// Decode the body, treating an empty body as `None`.
    pub fn model<T: DeserializeOwned>(&self, operation: &str) -> ArmResult<Option<T>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        self.json(operation).map(Some)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn was_not_found(&self) -> bool {
        self.status == 404
    }
}

/// The result of a single ARM operation: status and headers, plus the
/// decoded model when the response carried one.
#[derive(Debug, Clone)]
pub struct OperationResponse<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub model: Option<T>,
}

impl<T: DeserializeOwned> OperationResponse<T> {
    pub fn from_response(response: &ArmResponse, operation: &str) -> ArmResult<Self> {
        Ok(Self {
            status: response.status,
            headers: response.headers.clone(),
            model: response.model(operation)?,
        })
    }
}

/// HTTP client for one ARM endpoint.
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: Url,
    credential: Arc<dyn TokenCredential>,
    options: ClientOptions,
}

impl ArmClient {
    pub fn new(
        endpoint: &str,
        credential: Arc<dyn TokenCredential>,
        options: ClientOptions,
    ) -> ArmResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|source| ArmError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ArmError::Prepare {
                operation: "building HTTP client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            endpoint,
            credential,
            options,
        })
    }

    pub fn for_environment(
        environment: Environment,
        credential: Arc<dyn TokenCredential>,
        options: ClientOptions,
    ) -> ArmResult<Self> {
        Self::new(environment.resource_manager_endpoint(), credential, options)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Send a request without a body.
    pub async fn execute(&self, request: RequestOptions<'_>) -> ArmResult<ArmResponse> {
        self.send(&request, None).await
    }

    pub async fn execute_with_body<B: Serialize + ?Sized>(
        &self,
        request: RequestOptions<'_>,
        body: &B,
    ) -> ArmResult<ArmResponse> {
        let body = serde_json::to_vec(body).map_err(|e| ArmError::Prepare {
            operation: request.operation.to_string(),
            message: format!("serializing body: {e}"),
        })?;
        self.send(&request, Some(body)).await
    }

    /// Resolve a path (or an absolute URL returned by the service, such as a
    /// `nextLink` or polling URL) against the endpoint.
    pub fn url_for(&self, operation: &str, path_or_url: &str) -> ArmResult<Url> {
        let url = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            Url::parse(path_or_url)
        } else {
            self.endpoint.join(path_or_url)
        };
        url.map_err(|e| ArmError::Prepare {
            operation: operation.to_string(),
            message: format!("building URL for {path_or_url:?}: {e}"),
        })
    }

    /// Full URL for a request, including `api-version` and extra query parameters.
    pub fn request_url(&self, request: &RequestOptions<'_>) -> ArmResult<Url> {
        let mut url = self.url_for(request.operation, request.path)?;
        {
            let mut query = url.query_pairs_mut();
            if !request.api_version.is_empty() {
                query.append_pair("api-version", request.api_version);
            }
            for (key, value) in &request.query {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    #[instrument(skip_all, fields(operation = request.operation, method = %request.method, path = request.path))]
    async fn send(&self, request: &RequestOptions<'_>, body: Option<Vec<u8>>) -> ArmResult<ArmResponse> {
        let url = self.request_url(request)?;
        self.send_url(
            request.operation,
            request.method.clone(),
            url,
            body,
            request.expected_status_codes,
        )
        .await
    }

    /// Send to a fully built URL, retrying throttled requests and
    /// registering a missing resource provider once.
    pub(crate) async fn send_url(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        expected_status_codes: &[u16],
    ) -> ArmResult<ArmResponse> {
        let mut attempt = 0;
        let mut registered = false;
        loop {
            let response = self
                .send_once(operation, method.clone(), url.clone(), body.clone())
                .await?;

            if response.status == StatusCode::TOO_MANY_REQUESTS.as_u16() && attempt < self.options.max_retries {
                attempt += 1;
                let delay = retry_after(&response.headers).unwrap_or(self.options.retry_delay);
                warn!(attempt, ?delay, "throttled by ARM, retrying");
                tokio::time::sleep(delay).await;
                continue;
            }

            if response.status == StatusCode::CONFLICT.as_u16() && self.options.register_providers && !registered {
                let (code, _) = ErrorResponse::code_and_message(&response.body);
                if code == "MissingSubscriptionRegistration" {
                    if let Some((subscription, namespace)) = registration::target_from_path(url.path()) {
                        registration::register(self, &subscription, &namespace).await?;
                        registered = true;
                        continue;
                    }
                }
            }

            return check_status(operation, expected_status_codes, response);
        }
    }

    /// One round trip: token, headers, send, buffer the body. No status
    /// checks, no retries.
    pub(crate) async fn send_once(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> ArmResult<ArmResponse> {
        let token = self.credential.token().await?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.token)).map_err(|e| ArmError::Prepare {
            operation: operation.to_string(),
            message: format!("invalid bearer token: {e}"),
        })?;

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, bearer)
            .header(USER_AGENT, self.options.user_agent.as_str());
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|source| ArmError::Send {
            operation: operation.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|source| ArmError::Send {
            operation: operation.to_string(),
            source,
        })?;
        debug!(%method, %url, status, "ARM response");

        Ok(ArmResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

pub(crate) fn check_status(operation: &str, expected: &[u16], response: ArmResponse) -> ArmResult<ArmResponse> {
    if expected.contains(&response.status) {
        return Ok(response);
    }
    let (code, message) = ErrorResponse::code_and_message(&response.body);
    Err(ArmError::Response {
        operation: operation.to_string(),
        status: response.status,
        code,
        message,
    })
}

/// `Retry-After` in seconds. The HTTP-date form is not used by ARM.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
