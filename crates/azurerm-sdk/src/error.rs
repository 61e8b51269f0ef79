use serde::Deserialize;
use thiserror::Error;

pub type ArmResult<T> = Result<T, ArmError>;

/// Errors from talking to Azure Resource Manager.
///
/// Request failures are split by the stage they happened in: building the
/// request, putting it on the wire, or interpreting what came back. Variants
/// wrapping another error keep it as `source()` rather than in `Display`.
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("{operation}: preparing request: {message}")]
    Prepare { operation: String, message: String },

    #[error("{operation}: sending request")]
    Send {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: responding to request: unexpected status {status} with error: {code}: {message}")]
    Response {
        operation: String,
        status: u16,
        code: String,
        message: String,
    },

    #[error("{operation}: responding to request: unmarshaling response")]
    Unmarshal {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("polling after {operation}: operation finished with status {status:?}: {code}: {message}")]
    LongRunningOperation {
        operation: String,
        status: String,
        code: String,
        message: String,
    },

    #[error("registering resource provider {namespace:?}: {message}")]
    Registration { namespace: String, message: String },

    #[error("authenticating: {0}")]
    Auth(String),

    #[error("invalid endpoint {endpoint:?}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    ResourceId(#[from] azurerm_resourceids::ParseError),
}

impl ArmError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn was_status(&self, status: u16) -> bool {
        self.status() == Some(status)
    }

    pub fn was_not_found(&self) -> bool {
        self.was_status(404)
    }

    /// ARM error code, e.g. `ResourceGroupNotFound`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Response { code, .. } | Self::LongRunningOperation { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Value not in an enum's set of possible values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a valid {type_name}, expected one of {possible_values:?}")]
pub struct UnknownValueError {
    pub type_name: &'static str,
    pub value: String,
    pub possible_values: &'static [&'static str],
}

/// ARM error envelope. Most services nest under `error`, some don't.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Extract `(code, message)` from a response body, falling back to the
    /// raw body when it isn't an ARM error document.
    pub(crate) fn code_and_message(body: &[u8]) -> (String, String) {
        let parsed: ErrorResponse = serde_json::from_slice(body).unwrap_or_default();
        let (code, message) = match parsed.error {
            Some(detail) => (detail.code, detail.message),
            None => (parsed.code, parsed.message),
        };
        let message = message.unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        (code.unwrap_or_else(|| "Unknown".to_string()), message)
    }
}
