//! Errors raised while assembling the service from its settings.
//!
//! Request failures never surface here; they use [`handler::Error`].
//!
//! [`handler::Error`]: crate::handler::Error

use std::borrow::Cow;

/// Result alias for building the service.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A setting whose value cannot be used to run the service.
#[derive(Debug, thiserror::Error)]
#[error("invalid `{setting}`: {reason}")]
pub struct Error {
    setting: &'static str,
    reason: Cow<'static, str>,
}

impl Error {
    /// Rejects the value given for `setting`.
    pub fn invalid_setting(setting: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            setting,
            reason: reason.into(),
        }
    }

    /// Name of the rejected setting.
    #[inline]
    pub const fn setting(&self) -> &'static str {
        self.setting
    }

    /// Why the value was rejected.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
