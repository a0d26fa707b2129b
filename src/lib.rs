//! Second-factor access gating and credential validation.
//!
//! Three request-scoped, stateless components for the window between a
//! passed first factor and a completed second factor:
//!
//! - [`TwoFactorAccessDecider`] — per-request gate deciding whether a
//!   partially-authenticated principal may proceed,
//! - [`TotpFactory`] / [`Totp`] — per-user time-based OTP instances with
//!   provisioning-URI derivation,
//! - [`BackupCodeValidator`] — validation and consumption of single-use
//!   backup codes.
//!
//! Session handling, credential storage, rate limiting and UI stay with the
//! host; they enter through the capability traits ([`TotpUser`],
//! [`BackupCodeUser`]) and the collaborator traits on the decider and
//! validator.

pub mod access;
pub mod backup;
mod error;
pub mod models;
pub mod totp;

pub use access::{
    AccessMap, AccessRule, DecisionEvaluator, HttpRequest, LogoutUrlResolver, RequestMatcher,
    TwoFactorAccessDecider, IS_AUTHENTICATED_2FA_IN_PROGRESS, IS_AUTHENTICATED_ANONYMOUSLY,
    PUBLIC_ACCESS,
};
pub use backup::{BackupCodeValidator, Persister};
pub use error::Error;
pub use models::{BackupCodeUser, TotpAlgorithm, TotpConfiguration, TotpUser};
pub use totp::{Totp, TotpFactory};
