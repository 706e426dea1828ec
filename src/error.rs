//! Error types and handling for the Seatify service

use thiserror::Error;

/// Main error type for the Seatify service
#[derive(Error, Debug)]
pub enum SeatifyError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed request input (date, time, ...)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A place name the geocoder could not resolve
    #[error("Could not find location: '{name}'")]
    LocationNotFound { name: String },

    /// An external collaborator (routing, geocoding) failed or timed out
    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },
}

impl SeatifyError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(name: S) -> Self {
        Self::LocationNotFound { name: name.into() }
    }

    /// Create a new collaborator failure
    pub fn upstream<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Whether the caller can fix this by changing the request
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SeatifyError::Validation { .. } | SeatifyError::LocationNotFound { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SeatifyError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            SeatifyError::Validation { message } => {
                format!("Invalid date or time format: {message}")
            }
            SeatifyError::LocationNotFound { name } => {
                format!("Could not find location: '{name}'")
            }
            SeatifyError::Upstream { .. } => "Could not fetch route. Please try again.".to_string(),
        }
    }
}
