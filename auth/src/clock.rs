use chrono::DateTime;
use chrono::Utc;

/// Source of the current instant for issuance and expiry checks.
///
/// Injected into the issuer and validator so that token lifetimes can be
/// exercised without waiting on the wall clock.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by `Utc::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
