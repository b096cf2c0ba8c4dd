//! Auth-gated action wrapper.
//!
//! Every user-triggered mutation runs through `AuthGate::with_auth`, which
//! authenticates first (or reuses the trusted session) and only then runs
//! the action.

use crate::auth::capability::{AuthCapability, PromptOptions};
use crate::auth::session::{AuthFailure, AuthResult, AuthSession, AuthState};
use log::debug;
use std::future::Future;

/// Outcome of a gated action.
///
/// `NotPerformed` is the "did not run" sentinel; it can never be confused
/// with a value the action itself returned.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Gated<T> {
    Performed(T),
    NotPerformed(AuthFailure),
}

impl<T> Gated<T> {
    pub fn is_performed(&self) -> bool {
        matches!(self, Self::Performed(_))
    }

    /// Drops the failure reason.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Performed(value) => Some(value),
            Self::NotPerformed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Performed(_) => None,
            Self::NotPerformed(failure) => Some(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Self::Performed(value) => Gated::Performed(f(value)),
            Self::NotPerformed(failure) => Gated::NotPerformed(failure),
        }
    }
}

/// Single choke point combining a session with the device capability.
pub struct AuthGate<C> {
    session: AuthSession,
    capability: C,
    options: PromptOptions,
}

impl<C: AuthCapability> AuthGate<C> {
    pub fn new(capability: C) -> Self {
        Self::with_options(capability, PromptOptions::default())
    }

    pub fn with_options(capability: C, options: PromptOptions) -> Self {
        Self {
            session: AuthSession::new(),
            capability,
            options,
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn options(&self) -> &PromptOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PromptOptions) {
        self.options = options;
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    /// Authenticates without running an action (explicit unlock).
    ///
    /// # Errors
    /// Returns the failure of this attempt.
    pub async fn authenticate(&mut self) -> AuthResult {
        self.session
            .authenticate(&self.capability, &self.options)
            .await
    }

    /// Runs `action` only after authentication succeeds.
    pub async fn with_auth<T>(&mut self, action: impl FnOnce() -> T) -> Gated<T> {
        match self.authenticate().await {
            Ok(()) => Gated::Performed(action()),
            Err(failure) => Gated::NotPerformed(skipped(failure)),
        }
    }

    /// Async variant of `with_auth`; the action future is awaited in place.
    pub async fn with_auth_async<F, Fut, T>(&mut self, action: F) -> Gated<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.authenticate().await {
            Ok(()) => Gated::Performed(action().await),
            Err(failure) => Gated::NotPerformed(skipped(failure)),
        }
    }

    /// Forwards every session transition to `listener`.
    pub fn set_state_listener(&mut self, listener: impl Fn(&AuthSession) + Send + Sync + 'static) {
        self.session.set_state_listener(listener);
    }

    /// Logs out; the next gated action prompts again.
    pub fn reset(&mut self) {
        self.session.reset();
    }
}

fn skipped(failure: AuthFailure) -> AuthFailure {
    debug!(
        "event=gated_action module=auth status=skipped reason_alert={}",
        failure.should_alert()
    );
    failure
}

#[cfg(test)]
mod tests {
    use super::Gated;
    use crate::auth::session::AuthFailure;

    #[test]
    fn performed_none_is_distinct_from_not_performed() {
        let ran: Gated<Option<u8>> = Gated::Performed(None);
        let skipped: Gated<Option<u8>> = Gated::NotPerformed(AuthFailure::Cancelled);

        assert!(ran.is_performed());
        assert!(!skipped.is_performed());
        assert_eq!(ran.into_option(), Some(None));
        assert_eq!(skipped.into_option(), None);
    }

    #[test]
    fn map_keeps_failure_reason() {
        let skipped: Gated<u8> = Gated::NotPerformed(AuthFailure::NotEnrolled);
        let mapped = skipped.map(|value| value + 1);
        assert_eq!(mapped.failure(), Some(&AuthFailure::NotEnrolled));
    }
}
