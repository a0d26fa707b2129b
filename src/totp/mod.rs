pub mod factory;
pub(crate) mod uri;

pub use factory::{Totp, TotpFactory};
