//! Authentication handling

use gamesbot_core::{AuthOutcome, Error, Result};
use tracing::{debug, warn};

/// What to do with the hub's reply to the authorize request.
///
/// Lenient (the default) never fails: a rejected credential only shows up
/// later, when requests start failing. Strict fails the handshake on an
/// explicit rejection.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthPolicy {
    pub strict: bool,
}

impl AuthPolicy {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn verify(&self, outcome: &AuthOutcome) -> Result<()> {
        match outcome {
            AuthOutcome::Accepted => Ok(()),
            AuthOutcome::Rejected(reason) if self.strict => Err(Error::auth_failed(reason.as_str())),
            AuthOutcome::Rejected(reason) => {
                warn!("Hub rejected credentials ({}); continuing", reason);
                Ok(())
            }
            AuthOutcome::Unrecognized => {
                debug!("Authorize reply not recognized; assuming success");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_auth() {
        let policy = AuthPolicy::default();
        assert!(policy.verify(&AuthOutcome::Accepted).is_ok());
        assert!(policy.verify(&AuthOutcome::Rejected("bad".into())).is_ok());
        assert!(policy.verify(&AuthOutcome::Unrecognized).is_ok());
    }

    #[test]
    fn test_strict_auth() {
        let policy = AuthPolicy::new(true);
        assert!(policy.verify(&AuthOutcome::Accepted).is_ok());
        assert!(matches!(
            policy.verify(&AuthOutcome::Rejected("bad".into())),
            Err(Error::AuthFailed { .. })
        ));
        assert!(policy.verify(&AuthOutcome::Unrecognized).is_ok());
    }
}
