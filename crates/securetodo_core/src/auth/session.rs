//! Session-scoped local authentication.
//!
//! # Responsibility
//! - Run the hardware -> enrollment -> prompt check sequence.
//! - Cache a successful authentication until `reset`.
//!
//! # Invariants
//! - A trusted session never calls the capability again.
//! - The trust flag flips to `true` only after a successful prompt resolves.
//! - `&mut self` on `authenticate` rules out two in-flight prompts.
//! - An attempt dropped before it settles returns the state to `Idle`.

use crate::auth::capability::{AuthCapability, PromptFailure, PromptOptions, PromptOutcome};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Observable session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Idle,
    Pending,
    Authenticated,
    Error,
}

impl AuthState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Authenticated => "authenticated",
            Self::Error => "error",
        }
    }
}

/// Reason an authentication attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Device has no authentication hardware.
    UnsupportedDevice,
    /// No biometric or passcode is enrolled.
    NotEnrolled,
    /// Prompt was dismissed. Not shown to the user.
    Cancelled,
    /// Prompt completed without authenticating.
    Failed(String),
    /// Capability raised an unexpected error.
    Capability(String),
}

impl AuthFailure {
    /// Whether the UI should surface this failure in an alert.
    pub fn should_alert(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            Self::UnsupportedDevice => "unsupported device".to_string(),
            Self::NotEnrolled => "not enrolled".to_string(),
            Self::Cancelled => "cancelled".to_string(),
            Self::Failed(_) => "failed".to_string(),
            Self::Capability(message) => message.clone(),
        }
    }

    fn code(&self) -> &str {
        match self {
            Self::UnsupportedDevice => "unsupported_device",
            Self::NotEnrolled => "not_enrolled",
            Self::Cancelled => "cancelled",
            Self::Failed(code) => code.as_str(),
            Self::Capability(_) => "capability_error",
        }
    }
}

impl Display for AuthFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(code) => write!(f, "authentication failed: {code}"),
            other => write!(f, "authentication failed: {}", other.message()),
        }
    }
}

impl Error for AuthFailure {}

pub type AuthResult = Result<(), AuthFailure>;

/// Callback invoked after every state transition.
pub type StateListener = Box<dyn Fn(&AuthSession) + Send + Sync>;

/// Process-lifetime authentication session.
#[derive(Default)]
pub struct AuthSession {
    state: AuthState,
    trusted: bool,
    last_failure: Option<AuthFailure>,
    listener: Option<StateListener>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &self.state)
            .field("trusted", &self.trusted)
            .field("last_failure", &self.last_failure)
            .finish_non_exhaustive()
    }
}

/// Puts a pending attempt back to `Idle` if its future is dropped early.
struct PendingAttempt<'a> {
    session: &'a mut AuthSession,
    settled: bool,
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.session.state = AuthState::Idle;
        warn!("event=auth_session module=auth status=abandoned state=idle");
        self.session.notify();
    }
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Failure of the most recent attempt; cleared by success or reset.
    pub fn last_failure(&self) -> Option<&AuthFailure> {
        self.last_failure.as_ref()
    }

    /// Authenticates once per session.
    ///
    /// Returns immediately when the session is already trusted.
    ///
    /// # Errors
    /// Returns the `AuthFailure` of this attempt; the session stays untrusted.
    pub async fn authenticate<C: AuthCapability>(
        &mut self,
        capability: &C,
        options: &PromptOptions,
    ) -> AuthResult {
        if self.trusted {
            return Ok(());
        }

        self.state = AuthState::Pending;
        self.notify();

        let mut attempt = PendingAttempt {
            session: self,
            settled: false,
        };
        let result = Self::run_checks(capability, options).await;
        attempt.settled = true;
        attempt.session.settle(&result);
        result
    }

    /// Replaces the state listener; it sees every later transition.
    pub fn set_state_listener(&mut self, listener: impl Fn(&AuthSession) + Send + Sync + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Drops trust so the next `authenticate` prompts again.
    pub fn reset(&mut self) {
        self.trusted = false;
        self.state = AuthState::Idle;
        self.last_failure = None;
        info!("event=auth_reset module=auth status=ok");
        self.notify();
    }

    fn settle(&mut self, result: &AuthResult) {
        match result {
            Ok(()) => {
                self.trusted = true;
                self.state = AuthState::Authenticated;
                self.last_failure = None;
                info!("event=auth_session module=auth status=ok");
            }
            Err(failure) => {
                self.state = match failure {
                    AuthFailure::Cancelled | AuthFailure::Failed(_) => AuthState::Idle,
                    AuthFailure::UnsupportedDevice
                    | AuthFailure::NotEnrolled
                    | AuthFailure::Capability(_) => AuthState::Error,
                };
                self.last_failure = Some(failure.clone());
                warn!(
                    "event=auth_session module=auth status=error reason={} state={}",
                    failure.code(),
                    self.state.as_str()
                );
            }
        }
        self.notify();
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener(self);
        }
    }

    async fn run_checks<C: AuthCapability>(capability: &C, options: &PromptOptions) -> AuthResult {
        let has_hardware = capability
            .has_hardware()
            .await
            .map_err(|err| AuthFailure::Capability(err.message().to_string()))?;
        if !has_hardware {
            return Err(AuthFailure::UnsupportedDevice);
        }

        let enrolled = capability
            .is_enrolled()
            .await
            .map_err(|err| AuthFailure::Capability(err.message().to_string()))?;
        if !enrolled {
            return Err(AuthFailure::NotEnrolled);
        }

        let outcome = capability
            .prompt(options)
            .await
            .map_err(|err| AuthFailure::Capability(err.message().to_string()))?;
        match outcome {
            PromptOutcome::Success => Ok(()),
            PromptOutcome::Failed(PromptFailure::UserCancel) => Err(AuthFailure::Cancelled),
            PromptOutcome::Failed(PromptFailure::Other(code)) => Err(AuthFailure::Failed(code)),
        }
    }
}
