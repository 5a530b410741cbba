//! Error types for the `microspec-gui` application
//!
//! This module defines all error types used throughout the application,
//! providing clear error messages and proper error propagation.
//!
//! Error variants use `#[source]` to preserve error chains so the log shows the
//! full cause of a device failure.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for `microspec-gui`
#[derive(Debug, Error)]
pub enum MicrospecError {
    /// No dev-kit was found on any serial port
    #[error("No Chromation dev-kit found on any serial port")]
    DevKitNotFound,

    /// Serial link to the dev-kit failed
    /// Preserves the underlying error source for full error chain transparency
    #[error("Dev-kit serial link error: {0}")]
    SerialLink(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The dev-kit answered a command with a non-OK status byte
    #[error("Dev-kit rejected {command}: status {status:#04x}")]
    DeviceStatus {
        /// Command name as sent
        command: &'static str,
        /// Raw status byte from the reply
        status: u8,
    },

    /// A reply could not be decoded
    #[error("Malformed reply to {command}: {reason}")]
    Protocol {
        /// Command name as sent
        command: &'static str,
        /// What was wrong with the reply
        reason: String,
    },

    /// The dev-kit did not reply in time
    #[error("Timed out waiting for reply to {0}")]
    ReplyTimeout(&'static str),

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<serialport::Error> for MicrospecError {
    fn from(e: serialport::Error) -> Self {
        Self::SerialLink(Box::new(e))
    }
}

/// Result type alias for `microspec-gui` operations
pub type Result<T> = std::result::Result<T, MicrospecError>;

/// Convert an error to a user-friendly message
///
/// The messages include troubleshooting hints for the common dev-kit problems.
pub fn get_user_friendly_error(error: &MicrospecError) -> String {
    match error {
        MicrospecError::DevKitNotFound => "No spectrometer dev-kit was found.\n\n\
             Please ensure:\n\
             - The dev-kit is plugged in over USB\n\
             - The FTDI driver is installed\n\
             - No other program has the serial port open"
            .to_string(),
        MicrospecError::SerialLink(_) | MicrospecError::ReplyTimeout(_) => {
            "Lost communication with the dev-kit.\n\n\
             Please check the USB cable and restart the application."
                .to_string()
        }
        MicrospecError::DeviceStatus { command, .. } => {
            format!(
                "The dev-kit rejected the {command} command.\n\n\
                 Try unplugging the dev-kit and plugging it back in."
            )
        }
        MicrospecError::Protocol { command, .. } => {
            format!(
                "The dev-kit sent an unexpected reply to {command}.\n\n\
                 The firmware may be incompatible with this version of the GUI."
            )
        }
        MicrospecError::ConfigError(e) => {
            format!(
                "Invalid configuration:\n\n{e}\n\n\
                 Fix or delete the config.json file to restore defaults."
            )
        }
        MicrospecError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        MicrospecError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}
