use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("user has no TOTP configuration")]
    MissingTotpConfiguration,
    #[error("TOTP configuration has an empty secret")]
    EmptySecret,
    #[error("TOTP period must be positive")]
    InvalidPeriod,
    #[error("TOTP digit count must be positive")]
    InvalidDigits,
    #[error("invalid TOTP secret: {0}")]
    InvalidSecret(String),
    #[error("totp initialization: {0}")]
    TotpInit(String),
    #[error("system clock error: {0}")]
    Clock(#[from] std::time::SystemTimeError),
    #[error(transparent)]
    External(#[from] anyhow::Error),
}
