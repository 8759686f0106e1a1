//! Confirmation callbacks
//!
//! The client asks a [`ConfirmCallback`] right before each remote mutation.
//! Whether to prompt is decided by whoever builds the callback, so there is
//! no process-wide auto-confirm switch.

use crate::error::Result;
use crate::types::EndpointSpec;

/// What the client is about to do.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmRequest<'a> {
    /// Short action label, e.g. "update endpoint".
    pub action: &'a str,
    /// Name of the endpoint affected.
    pub endpoint: &'a str,
    /// Spec before the change (`None` for create).
    pub before: Option<&'a EndpointSpec>,
    /// Spec after the change (`None` for delete).
    pub after: Option<&'a EndpointSpec>,
}

impl ConfirmRequest<'_> {
    /// One-line prompt text.
    pub fn prompt(&self) -> String {
        format!("Proceed to {} '{}'?", self.action, self.endpoint)
    }
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm a mutation
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> Result<bool>;
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _request: &ConfirmRequest<'_>) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _request: &ConfirmRequest<'_>) -> Result<bool> {
        Ok(false)
    }
}
