//! Builds configured OTP instances for users.

use std::collections::BTreeMap;

use totp_rs::{Secret, TOTP};
use tracing::debug;

use crate::error::Error;
use crate::models::{TotpConfiguration, TotpUser};
use crate::totp::uri::totp_provisioning_uri;

/// Accepted clock drift, in time steps, when checking codes.
const TOTP_SKEW: u8 = 1;

/// Builds a ready-to-use [`Totp`] instance per user, decorated with the
/// label/issuer/parameter metadata that ends up in the provisioning URI.
///
/// A 2FA-enabled user must always carry a valid configuration, so a missing
/// configuration or empty secret is a hard error here, not a fallback.
#[derive(Debug, Clone, Default)]
pub struct TotpFactory {
    server: Option<String>,
    issuer: Option<String>,
    parameters: BTreeMap<String, String>,
}

impl TotpFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hostname appended to the label as `username@server`.
    #[must_use]
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Additional provisioning-URI query parameter, e.g. `image=logo.png`.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Build the OTP instance for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTotpConfiguration`] when the user has no TOTP
    /// configuration and [`Error::EmptySecret`] when the configured secret is
    /// empty. Period, digits and algorithm are trusted as validated at
    /// configuration-creation time.
    pub fn create_totp_for_user<U: TotpUser>(&self, user: &U) -> Result<Totp, Error> {
        let configuration = user
            .totp_configuration()
            .ok_or(Error::MissingTotpConfiguration)?;
        if configuration.secret().is_empty() {
            return Err(Error::EmptySecret);
        }

        let username = user.totp_username();
        let label = match &self.server {
            Some(server) => format!("{username}@{server}"),
            None => username.to_string(),
        };
        debug!(label = %label, "building TOTP instance");

        Ok(Totp {
            configuration: configuration.clone(),
            label,
            issuer: self.issuer.clone(),
            parameters: self.parameters.clone(),
        })
    }
}

/// A user-specific OTP instance: configuration plus provisioning metadata.
///
/// The secret stays Base32 text until a code is generated or checked, so
/// provisioning-URI derivation works for any non-empty secret and decode
/// problems surface only on the code paths.
#[derive(Debug, Clone)]
pub struct Totp {
    configuration: TotpConfiguration,
    label: String,
    issuer: Option<String>,
    parameters: BTreeMap<String, String>,
}

impl Totp {
    #[must_use]
    pub fn configuration(&self) -> &TotpConfiguration {
        &self.configuration
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        self.configuration.secret()
    }

    /// Label without the issuer prefix (`username` or `username@server`).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Generate the code for the time step containing `time` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is not valid Base32 or the OTP
    /// primitive rejects the parameters.
    pub fn generate(&self, time: u64) -> Result<String, Error> {
        Ok(self.primitive()?.generate(time))
    }

    /// Generate the code for the current system time.
    ///
    /// # Errors
    ///
    /// Same as [`Totp::generate`], plus a clock error if the system time is
    /// before the Unix epoch.
    pub fn generate_current(&self) -> Result<String, Error> {
        Ok(self.primitive()?.generate_current()?)
    }

    /// Check `code` against the time step containing `time`, allowing one
    /// step of clock drift in either direction.
    ///
    /// # Errors
    ///
    /// Same as [`Totp::generate`]. A mismatching code is `Ok(false)`, not an
    /// error.
    pub fn check(&self, code: &str, time: u64) -> Result<bool, Error> {
        Ok(self.primitive()?.check(code, time))
    }

    /// Check `code` against the current system time.
    ///
    /// # Errors
    ///
    /// Same as [`Totp::generate_current`].
    pub fn check_current(&self, code: &str) -> Result<bool, Error> {
        Ok(self.primitive()?.check_current(code)?)
    }

    /// Provisioning URI for authenticator apps.
    ///
    /// Query parameters are emitted in lexicographic key order; when an
    /// issuer is set it is both prefixed to the label and emitted as an
    /// `issuer` parameter, since URI consumers disagree on which form they
    /// read.
    #[must_use]
    pub fn provisioning_uri(&self) -> String {
        let mut parameters = self.parameters.clone();
        parameters.insert(
            "algorithm".to_string(),
            self.configuration.algorithm().as_str().to_string(),
        );
        parameters.insert("digits".to_string(), self.configuration.digits().to_string());
        parameters.insert("period".to_string(), self.configuration.period().to_string());
        parameters.insert("secret".to_string(), self.configuration.secret().to_string());

        let label = match &self.issuer {
            Some(issuer) => {
                parameters.insert("issuer".to_string(), issuer.clone());
                format!("{issuer}:{}", self.label)
            }
            None => self.label.clone(),
        };

        totp_provisioning_uri(&label, &parameters)
    }

    /// Decode the secret and seed the trusted OTP primitive.
    fn primitive(&self) -> Result<TOTP, Error> {
        let secret = Secret::Encoded(self.configuration.secret().to_string())
            .to_bytes()
            .map_err(|e| Error::InvalidSecret(e.to_string()))?;
        TOTP::new(
            self.configuration.algorithm().into(),
            self.configuration.digits(),
            TOTP_SKEW,
            self.configuration.period(),
            secret,
            self.issuer.clone(),
            self.label.clone(),
        )
        .map_err(|e| Error::TotpInit(e.to_string()))
    }
}
