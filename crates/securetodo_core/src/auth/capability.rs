//! Platform authentication capability contract.
//!
//! The core depends only on this three-call surface; the concrete biometric
//! or passcode SDK lives on the UI side of the FFI boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;

/// Default text shown in the system prompt.
pub const DEFAULT_PROMPT_MESSAGE: &str = "Authenticate to manage your tasks";
/// Default label of the prompt cancel button.
pub const DEFAULT_CANCEL_LABEL: &str = "Cancel";
/// Default label of the device passcode fallback button.
pub const DEFAULT_FALLBACK_LABEL: &str = "Use passcode";

/// Presentation options forwarded to the platform prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    pub prompt_message: String,
    pub cancel_label: String,
    pub fallback_label: String,
    /// When `true`, the platform must not offer the device passcode fallback.
    pub disable_device_fallback: bool,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            prompt_message: DEFAULT_PROMPT_MESSAGE.to_string(),
            cancel_label: DEFAULT_CANCEL_LABEL.to_string(),
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
            disable_device_fallback: false,
        }
    }
}

/// Why a completed prompt did not authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptFailure {
    /// User, system or app dismissed the prompt.
    UserCancel,
    /// Any other platform-reported failure, with its raw code.
    Other(String),
}

/// Result of one completed platform prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Success,
    Failed(PromptFailure),
}

/// Maps a platform error code to a prompt failure.
///
/// Cancellation codes are matched case-insensitively; anything else is kept
/// verbatim (trimmed) as `Other`.
pub fn parse_prompt_error(code: &str) -> PromptFailure {
    let normalized = code.trim();
    match normalized.to_ascii_lowercase().as_str() {
        "user_cancel" | "system_cancel" | "app_cancel" => PromptFailure::UserCancel,
        "" => PromptFailure::Other("unknown".to_string()),
        _ => PromptFailure::Other(normalized.to_string()),
    }
}

/// Unexpected failure raised by the capability itself (not a prompt result).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityError {
    message: String,
}

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CapabilityError {}

/// Device authentication capability (biometric or passcode).
pub trait AuthCapability {
    /// Whether the device has authentication hardware.
    fn has_hardware(&self) -> impl Future<Output = Result<bool, CapabilityError>> + Send;

    /// Whether a biometric or passcode is enrolled on the device.
    fn is_enrolled(&self) -> impl Future<Output = Result<bool, CapabilityError>> + Send;

    /// Shows the system prompt and resolves once the user finishes with it.
    fn prompt(
        &self,
        options: &PromptOptions,
    ) -> impl Future<Output = Result<PromptOutcome, CapabilityError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::{parse_prompt_error, PromptFailure, PromptOptions};

    #[test]
    fn cancellation_codes_map_to_user_cancel() {
        for code in ["user_cancel", "system_cancel", " APP_CANCEL "] {
            assert_eq!(parse_prompt_error(code), PromptFailure::UserCancel);
        }
    }

    #[test]
    fn other_codes_are_kept_verbatim() {
        assert_eq!(
            parse_prompt_error(" lockout "),
            PromptFailure::Other("lockout".to_string())
        );
        assert_eq!(
            parse_prompt_error(""),
            PromptFailure::Other("unknown".to_string())
        );
    }

    #[test]
    fn default_options_allow_device_fallback() {
        let options = PromptOptions::default();
        assert!(!options.disable_device_fallback);
        assert!(options.prompt_message.contains("tasks"));
    }
}
