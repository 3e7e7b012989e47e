//! License lifecycle: remote client, call budget, and cache manager.

mod client;
mod rate_limit;

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, instrument};

use ship_restrict_core::LicenseState;

pub use client::{LicenseApi, LicenseClient, RATE_LIMIT_ERROR, UNREACHABLE_ERROR};
pub use rate_limit::{CallBudget, RATE_LIMIT_MAX, RATE_LIMIT_WINDOW_SECS};

use crate::clock::Clock;
use crate::store::{SettingsStore, StoreError};

/// Hours a successful validation stays trusted before revalidating.
pub const CACHE_TTL_HOURS: i64 = 24;

/// The cache window as a duration.
#[must_use]
pub fn cache_ttl() -> Duration {
    Duration::hours(CACHE_TTL_HOURS)
}

/// Orchestrates remote checks against the persisted license state.
///
/// An explicit save always goes to the network; routine reads revalidate
/// at most once per cache window.
pub struct LicenseManager<A: LicenseApi> {
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    api: A,
}

impl<A: LicenseApi> LicenseManager<A> {
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>, clock: Arc<dyn Clock>, api: A) -> Self {
        Self {
            settings,
            clock,
            api,
        }
    }

    /// Save a license key and check it remotely.
    ///
    /// Activates when the key changed or the previous check failed,
    /// otherwise validates. A blank key clears the stored state without a
    /// network call.
    ///
    /// # Errors
    ///
    /// Returns an error only when the settings record cannot be read or
    /// written; a failed remote check is a successful save of an invalid
    /// state.
    #[instrument(skip(self, key))]
    pub async fn save_key(&self, key: &str) -> Result<LicenseState, StoreError> {
        let key = key.trim();
        let mut record = self.settings.load()?;

        if key.is_empty() {
            info!("Clearing license key");
            record.license = LicenseState::default();
            self.settings.save(&record)?;
            return Ok(record.license);
        }

        let activate = key != record.license.key || !record.license.valid;
        debug!(activate, "Checking saved license key");
        let check = self.api.validate_or_activate(key, activate).await;

        record.license.key = key.to_string();
        record.license.record_check(&check, self.clock.now());
        self.settings.save(&record)?;
        info!(valid = check.valid, "License key saved");
        Ok(record.license)
    }

    /// Whether the installation is licensed right now, revalidating at most
    /// once when the cached result has gone stale.
    ///
    /// # Errors
    ///
    /// Returns an error only when the settings record cannot be read or
    /// written.
    pub async fn ensure_fresh(&self) -> Result<bool, StoreError> {
        let mut record = self.settings.load()?;
        if record.license.key.is_empty() {
            return Ok(false);
        }

        let now = self.clock.now();
        if record.license.checked_within(now, cache_ttl()) {
            return Ok(record.license.valid);
        }

        debug!("License cache stale, revalidating");
        let check = self
            .api
            .validate_or_activate(&record.license.key, false)
            .await;
        record.license.record_check(&check, now);
        self.settings.save(&record)?;
        Ok(check.valid)
    }

    /// The persisted license state, without touching the network.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings record cannot be read.
    pub fn current(&self) -> Result<LicenseState, StoreError> {
        Ok(self.settings.load()?.license)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use ship_restrict_core::LicenseCheck;

    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    use super::*;

    struct StubApi {
        calls: AtomicUsize,
        activations: AtomicUsize,
        result: Mutex<LicenseCheck>,
    }

    impl StubApi {
        fn returning(check: LicenseCheck) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                activations: AtomicUsize::new(0),
                result: Mutex::new(check),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn activations(&self) -> usize {
            self.activations.load(Ordering::SeqCst)
        }
    }

    impl LicenseApi for &StubApi {
        fn validate_or_activate(
            &self,
            _key: &str,
            activate: bool,
        ) -> impl Future<Output = LicenseCheck> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if activate {
                self.activations.fetch_add(1, Ordering::SeqCst);
            }
            let result = self.result.lock().expect("stub lock").clone();
            std::future::ready(result)
        }
    }

    fn manager(api: &StubApi) -> (Arc<FixedClock>, LicenseManager<&StubApi>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let store = Arc::new(MemoryStore::new());
        let manager = LicenseManager::new(store, Arc::clone(&clock) as Arc<dyn Clock>, api);
        (clock, manager)
    }

    #[tokio::test]
    async fn first_save_activates() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (_clock, manager) = manager(&api);

        let state = manager.save_key("key-1").await.expect("save");
        assert!(state.valid);
        assert_eq!(state.key, "key-1");
        assert_eq!(api.activations(), 1);
    }

    #[tokio::test]
    async fn resaving_a_valid_key_validates_instead_of_activating() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (_clock, manager) = manager(&api);

        manager.save_key("key-1").await.expect("save");
        manager.save_key("key-1").await.expect("save");
        assert_eq!(api.calls(), 2);
        assert_eq!(api.activations(), 1);
    }

    #[tokio::test]
    async fn changing_the_key_activates_again() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (_clock, manager) = manager(&api);

        manager.save_key("key-1").await.expect("save");
        manager.save_key("key-2").await.expect("save");
        assert_eq!(api.activations(), 2);
    }

    #[tokio::test]
    async fn blank_key_clears_state_without_a_call() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (_clock, manager) = manager(&api);

        manager.save_key("key-1").await.expect("save");
        let state = manager.save_key("   ").await.expect("save");
        assert_eq!(state, LicenseState::default());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_network() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (clock, manager) = manager(&api);

        manager.save_key("key-1").await.expect("save");
        clock.advance(Duration::hours(1));
        assert!(manager.ensure_fresh().await.expect("fresh"));
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn stale_cache_revalidates_exactly_once() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (clock, manager) = manager(&api);

        manager.save_key("key-1").await.expect("save");
        clock.advance(Duration::hours(25));
        assert!(manager.ensure_fresh().await.expect("fresh"));
        assert_eq!(api.calls(), 2);

        // The revalidation refreshed the timestamp.
        assert!(manager.ensure_fresh().await.expect("fresh"));
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn empty_key_never_calls_out() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (_clock, manager) = manager(&api);

        assert!(!manager.ensure_fresh().await.expect("fresh"));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn failed_revalidation_persists_the_invalid_state() {
        let api = StubApi::returning(LicenseCheck::valid("p_test"));
        let (clock, manager) = manager(&api);

        manager.save_key("key-1").await.expect("save");
        *api.result.lock().expect("stub lock") =
            LicenseCheck::invalid("License invalid.", "p_test");
        clock.advance(Duration::hours(25));

        assert!(!manager.ensure_fresh().await.expect("fresh"));
        let state = manager.current().expect("current");
        assert!(!state.valid);
        assert_eq!(state.error, "License invalid.");
        assert_eq!(state.key, "key-1");

        // The failure is cached for the window too.
        assert!(!manager.ensure_fresh().await.expect("fresh"));
        assert_eq!(api.calls(), 2);
    }
}
