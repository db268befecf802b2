//! Dialog engine configuration.
//!
//! [`DialogConfig`] collects the timing policy and user-facing messages of a
//! dialog host. Every field has a default, so a configuration file only needs
//! to name what it overrides.
//!
//! # Loading
//!
//! ```
//! use trellis::config::DialogConfig;
//!
//! let config = DialogConfig::from_toml_str(r#"
//!     emergency_timeout_ms = 10000
//!     identifier_field = "uuid"
//!
//!     [messages]
//!     interrupted = "Connection lost. Try again."
//! "#).unwrap();
//!
//! assert_eq!(config.identifier_field, "uuid");
//! assert_eq!(config.close_grace_ms, 300);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error loading or validating a [`DialogConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A field holds a value the engine cannot run with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// A specialized Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// User-facing messages for each error class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    /// Shown when field validation fails.
    pub validation_failed: String,
    /// Shown when the form has not registered in time.
    pub form_not_ready: String,
    /// Shown when the submit handler fails without a message.
    pub submission_failed: String,
    /// Shown when the emergency timeout fires.
    pub interrupted: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            validation_failed: "Please correct the highlighted fields.".into(),
            form_not_ready: "The form is not ready yet. Please try again.".into(),
            submission_failed: "The operation failed. Please try again.".into(),
            interrupted: "Operation interrupted, please retry.".into(),
        }
    }
}

/// Configuration for a dialog host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// How long a submission may stay in flight before the dialog recovers
    /// to an error state.
    pub emergency_timeout_ms: u64,
    /// How long the closing content stays available for an exit animation.
    pub close_grace_ms: u64,
    /// Delay before the single retry of a form adapter lookup.
    pub registration_retry_ms: u64,
    /// Payload field carried into edit submissions when the form omits it.
    pub identifier_field: String,
    /// Whether `close()` is honored while a submission is in flight.
    pub allow_close_while_submitting: bool,
    /// User-facing error messages.
    pub messages: ErrorMessages,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            emergency_timeout_ms: 30_000,
            close_grace_ms: 300,
            registration_retry_ms: 100,
            identifier_field: "id".into(),
            allow_close_while_submitting: true,
            messages: ErrorMessages::default(),
        }
    }
}

impl DialogConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load_toml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_toml_str(&read_config(path.as_ref())?)
    }

    /// Load a JSON configuration file.
    pub fn load_json(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_json_str(&read_config(path.as_ref())?)
    }

    /// Load a configuration file, choosing the format by extension.
    ///
    /// `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::load_json(path),
            _ => Self::load_toml(path),
        }
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.emergency_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "emergency_timeout_ms",
                reason: "must be greater than zero",
            });
        }
        if self.identifier_field.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "identifier_field",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    /// Set the emergency timeout.
    pub fn with_emergency_timeout(mut self, timeout: Duration) -> Self {
        self.emergency_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the close grace delay.
    pub fn with_close_grace(mut self, grace: Duration) -> Self {
        self.close_grace_ms = duration_ms(grace);
        self
    }

    /// Set the registration retry delay.
    pub fn with_registration_retry(mut self, delay: Duration) -> Self {
        self.registration_retry_ms = duration_ms(delay);
        self
    }

    /// Set the identifier field name.
    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self
    }

    /// Set whether close is honored during submission.
    pub fn with_close_while_submitting(mut self, allow: bool) -> Self {
        self.allow_close_while_submitting = allow;
        self
    }

    /// Replace the user-facing messages.
    pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
        self.messages = messages;
        self
    }

    /// The emergency timeout as a `Duration`.
    pub fn emergency_timeout(&self) -> Duration {
        Duration::from_millis(self.emergency_timeout_ms)
    }

    /// The close grace delay as a `Duration`.
    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }

    /// The registration retry delay as a `Duration`.
    pub fn registration_retry(&self) -> Duration {
        Duration::from_millis(self.registration_retry_ms)
    }
}

fn read_config(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
