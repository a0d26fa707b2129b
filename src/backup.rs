//! Single-use backup code validation.

use tracing::debug;

use crate::error::Error;
use crate::models::BackupCodeUser;

/// Flushes a mutated user record to durable storage.
///
/// Failure semantics live with the persister; errors pass through the
/// validator unchanged.
pub trait Persister<U> {
    /// # Errors
    ///
    /// Whatever the underlying store raises.
    fn persist(&self, user: &U) -> anyhow::Result<()>;
}

/// Validates and consumes single-use backup codes.
#[derive(Debug, Clone)]
pub struct BackupCodeValidator<P> {
    persister: P,
}

impl<P> BackupCodeValidator<P> {
    pub fn new(persister: P) -> Self {
        Self { persister }
    }

    /// Check `code` against the user's backup-code set and consume it on a
    /// match.
    ///
    /// A matching code is invalidated and the mutated user persisted before
    /// this returns; a mismatch performs no mutation and no persistence
    /// call. A mismatch is a normal negative result, not an error.
    ///
    /// # Errors
    ///
    /// Propagates persister failures unchanged. The code has been
    /// invalidated on the in-memory user by then; re-persisting is the
    /// caller's call.
    pub fn check_code<U>(&self, user: &mut U, code: &str) -> Result<bool, Error>
    where
        U: BackupCodeUser,
        P: Persister<U>,
    {
        if !user.is_backup_code(code) {
            return Ok(false);
        }

        user.invalidate_backup_code(code);
        self.persister.persist(user)?;
        debug!("backup code consumed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{BackupCodeValidator, Persister};
    use crate::models::BackupCodeUser;
    use std::cell::Cell;
    use std::collections::HashSet;

    struct TestUser {
        codes: HashSet<String>,
    }

    impl TestUser {
        fn with_codes(codes: &[&str]) -> Self {
            Self {
                codes: codes.iter().map(ToString::to_string).collect(),
            }
        }
    }

    impl BackupCodeUser for TestUser {
        fn is_backup_code(&self, code: &str) -> bool {
            self.codes.contains(code)
        }

        fn invalidate_backup_code(&mut self, code: &str) {
            self.codes.remove(code);
        }
    }

    struct CountingPersister {
        calls: Cell<usize>,
        fails: bool,
    }

    impl CountingPersister {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fails: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Cell::new(0),
                fails: true,
            }
        }
    }

    impl Persister<TestUser> for CountingPersister {
        fn persist(&self, _user: &TestUser) -> anyhow::Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.fails {
                anyhow::bail!("storage unavailable");
            }
            Ok(())
        }
    }

    #[test]
    fn unknown_code_returns_false_without_mutation_or_persistence() {
        let validator = BackupCodeValidator::new(CountingPersister::new());
        let mut user = TestUser::with_codes(&["c0de"]);

        assert!(!validator.check_code(&mut user, "other").unwrap());
        assert!(user.is_backup_code("c0de"));
        assert_eq!(validator.persister.calls.get(), 0);
    }

    #[test]
    fn valid_code_is_consumed_and_persisted_once() {
        let validator = BackupCodeValidator::new(CountingPersister::new());
        let mut user = TestUser::with_codes(&["c0de", "0ther"]);

        assert!(validator.check_code(&mut user, "c0de").unwrap());
        assert!(!user.is_backup_code("c0de"));
        assert!(user.is_backup_code("0ther"));
        assert_eq!(validator.persister.calls.get(), 1);
    }

    #[test]
    fn consumed_code_does_not_validate_twice() {
        let validator = BackupCodeValidator::new(CountingPersister::new());
        let mut user = TestUser::with_codes(&["c0de"]);

        assert!(validator.check_code(&mut user, "c0de").unwrap());
        assert!(!validator.check_code(&mut user, "c0de").unwrap());
        assert_eq!(validator.persister.calls.get(), 1);
    }

    #[test]
    fn persister_failure_propagates() {
        let validator = BackupCodeValidator::new(CountingPersister::failing());
        let mut user = TestUser::with_codes(&["c0de"]);

        assert!(validator.check_code(&mut user, "c0de").is_err());
        assert_eq!(validator.persister.calls.get(), 1);
    }
}
