//! Conversions from external infrastructure errors into domain errors.

use flowlab_common::storage::StorageError;
use flowlab_domain::FlowError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FlowError);

impl From<InfraError> for FlowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FlowError> for InfraError {
    fn from(value: FlowError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoFlowError {
    fn into_flow_error(self) -> FlowError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FlowError */
/* -------------------------------------------------------------------------- */

impl IntoFlowError for HttpError {
    fn into_flow_error(self) -> FlowError {
        if self.is_timeout() {
            return FlowError::Network("HTTP request timed out".into());
        }

        if self.is_builder() {
            return FlowError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return FlowError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return FlowError::Network(format!("failed to read HTTP response: {self}"));
        }

        FlowError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_flow_error())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → FlowError (sockets) */
/* -------------------------------------------------------------------------- */

impl IntoFlowError for std::io::Error {
    fn into_flow_error(self) -> FlowError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::AddrInUse => FlowError::Network(format!("address already in use: {self}")),
            ErrorKind::PermissionDenied => {
                FlowError::Network(format!("permission denied binding socket: {self}"))
            }
            _ => FlowError::Network(format!("I/O error: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_flow_error())
    }
}

/* -------------------------------------------------------------------------- */
/* Config parse errors → FlowError */
/* -------------------------------------------------------------------------- */

impl IntoFlowError for toml::de::Error {
    fn into_flow_error(self) -> FlowError {
        FlowError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_flow_error())
    }
}

impl IntoFlowError for serde_json::Error {
    fn into_flow_error(self) -> FlowError {
        FlowError::Config(format!("Invalid JSON format: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_flow_error())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → FlowError */
/* -------------------------------------------------------------------------- */

impl IntoFlowError for StorageError {
    fn into_flow_error(self) -> FlowError {
        FlowError::Storage(self.to_string())
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_flow_error())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
