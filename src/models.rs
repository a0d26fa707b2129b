//! Value models and user capabilities shared by the second-factor components.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Hash algorithm driving the time-based code computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotpAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl TotpAlgorithm {
    /// Lowercase name as emitted in provisioning URIs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

impl From<TotpAlgorithm> for totp_rs::Algorithm {
    fn from(algorithm: TotpAlgorithm) -> Self {
        match algorithm {
            TotpAlgorithm::Sha1 => Self::SHA1,
            TotpAlgorithm::Sha256 => Self::SHA256,
            TotpAlgorithm::Sha512 => Self::SHA512,
        }
    }
}

/// Per-user OTP parameters.
///
/// The secret is Base32 text and may still be empty here; [`crate::TotpFactory`]
/// rejects empty secrets when an OTP instance is built. Period and digit count
/// are validated at construction and trusted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpConfiguration {
    secret: String,
    algorithm: TotpAlgorithm,
    period: u64,
    digits: usize,
}

impl TotpConfiguration {
    /// # Errors
    ///
    /// Returns an error if `period` or `digits` is zero.
    pub fn new(
        secret: impl Into<String>,
        algorithm: TotpAlgorithm,
        period: u64,
        digits: usize,
    ) -> Result<Self, Error> {
        if period == 0 {
            return Err(Error::InvalidPeriod);
        }
        if digits == 0 {
            return Err(Error::InvalidDigits);
        }
        Ok(Self {
            secret: secret.into(),
            algorithm,
            period,
            digits,
        })
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn algorithm(&self) -> TotpAlgorithm {
        self.algorithm
    }

    /// Time step in seconds.
    #[must_use]
    pub fn period(&self) -> u64 {
        self.period
    }

    #[must_use]
    pub fn digits(&self) -> usize {
        self.digits
    }
}

/// Capability of a user record that can be challenged with a time-based code.
///
/// The crate never owns the user entity; callers hand in a reference per
/// operation and keep lifecycle and persistence to themselves.
pub trait TotpUser {
    /// The user's OTP parameters, or `None` when TOTP was never set up.
    fn totp_configuration(&self) -> Option<&TotpConfiguration>;

    /// Account name shown in authenticator apps.
    fn totp_username(&self) -> &str;
}

/// Capability of a user record that holds single-use backup codes.
pub trait BackupCodeUser {
    /// Whether `code` is currently part of the user's backup-code set.
    fn is_backup_code(&self, code: &str) -> bool;

    /// Remove `code` from the in-memory backup-code set.
    fn invalidate_backup_code(&mut self, code: &str);
}

#[cfg(test)]
mod tests {
    use super::{TotpAlgorithm, TotpConfiguration};
    use crate::error::Error;

    #[test]
    fn algorithm_round_trips_through_names() {
        for algorithm in [
            TotpAlgorithm::Sha1,
            TotpAlgorithm::Sha256,
            TotpAlgorithm::Sha512,
        ] {
            assert_eq!(TotpAlgorithm::from_str(algorithm.as_str()), Some(algorithm));
        }
        assert_eq!(TotpAlgorithm::from_str("md5"), None);
    }

    #[test]
    fn configuration_rejects_zero_period_and_digits() {
        assert!(matches!(
            TotpConfiguration::new("SECRET", TotpAlgorithm::Sha1, 0, 6),
            Err(Error::InvalidPeriod)
        ));
        assert!(matches!(
            TotpConfiguration::new("SECRET", TotpAlgorithm::Sha1, 30, 0),
            Err(Error::InvalidDigits)
        ));
    }

    #[test]
    fn configuration_accepts_empty_secret_until_factory_time() {
        let config = TotpConfiguration::new("", TotpAlgorithm::Sha256, 30, 6).unwrap();
        assert_eq!(config.secret(), "");
    }

    #[test]
    fn configuration_serializes_with_lowercase_algorithm() {
        let config = TotpConfiguration::new("SECRET", TotpAlgorithm::Sha256, 20, 8).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""algorithm":"sha256""#));
        let back: TotpConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
