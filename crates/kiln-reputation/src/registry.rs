//! The reputation registry.

use std::collections::HashMap;

use kiln_core::{Address, Amount};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{ReputationError, Result};
use crate::policy::{FixedDeltaPolicy, JobOutcomePolicy};
use crate::record::ReputationRecord;

/// Score change per star away from the neutral 3-star rating.
const POINTS_PER_STAR: i32 = 20;

/// Per-identity score and job-outcome accounting.
///
/// The admin address (an explicit capability captured at construction) may
/// designate a single reputation manager; only the manager may record job
/// outcomes. In a deployed marketplace the manager is the escrow vault
/// identity, so reputation follows settled jobs and nothing else.
pub struct ReputationRegistry {
    admin: Address,
    manager: RwLock<Option<Address>>,
    policy: Box<dyn JobOutcomePolicy>,
    records: RwLock<HashMap<Address, ReputationRecord>>,
}

impl ReputationRegistry {
    /// Create a registry administered by `admin` with the default outcome policy.
    #[must_use]
    pub fn new(admin: Address) -> Self {
        Self::with_policy(admin, Box::new(FixedDeltaPolicy::default()))
    }

    /// Create a registry with a custom job-outcome policy.
    #[must_use]
    pub fn with_policy(admin: Address, policy: Box<dyn JobOutcomePolicy>) -> Self {
        Self {
            admin,
            manager: RwLock::new(None),
            policy,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Designate the reputation manager. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the caller is not the registry admin.
    pub fn set_manager(&self, caller: &Address, manager: Address) -> Result<()> {
        if caller != &self.admin {
            return Err(ReputationError::Unauthorized {
                caller: caller.clone(),
            });
        }
        *self.manager.write() = Some(manager.clone());

        info!(manager = %manager, "reputation manager updated");
        Ok(())
    }

    /// Register an identity, creating a neutral record if absent.
    ///
    /// Re-registration is idempotent: it updates the role flags and leaves
    /// score and counters untouched.
    pub fn register_user(&self, identity: &Address, is_provider: bool, is_developer: bool) {
        let mut records = self.records.write();
        records
            .entry(identity.clone())
            .and_modify(|rec| {
                rec.is_provider = is_provider;
                rec.is_developer = is_developer;
            })
            .or_insert_with(|| ReputationRecord::new(identity.clone(), is_provider, is_developer));

        debug!(identity = %identity, is_provider, is_developer, "user registered");
    }

    /// Submit a 1-5 star rating for another identity.
    ///
    /// Moves the target's score by `(stars - 3) * 20`, clamped to the
    /// valid range, and updates the rating tallies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStars` outside 1..=5, `SelfRating` when caller and
    /// target match, `NotRegistered` when the target has no record.
    pub fn submit_rating(&self, caller: &Address, target: &Address, stars: u8) -> Result<()> {
        if !(1..=5).contains(&stars) {
            return Err(ReputationError::InvalidStars(stars));
        }
        if caller == target {
            return Err(ReputationError::SelfRating);
        }

        let mut records = self.records.write();
        let record = records
            .get_mut(target)
            .ok_or_else(|| ReputationError::NotRegistered(target.clone()))?;

        record.apply_delta((i32::from(stars) - 3) * POINTS_PER_STAR);
        record.total_ratings += u64::from(stars);
        record.rating_count += 1;

        debug!(target = %target, stars, score = record.score, "rating recorded");
        Ok(())
    }

    /// Record a settled job's outcome for both parties. Manager only.
    ///
    /// Increments the provider's success/failure counter and applies the
    /// policy deltas to both scores. Records are created at the neutral
    /// score if absent, so this never fails after the manager check —
    /// callers rely on that for transactional settlement.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless the caller is the configured manager.
    pub fn update_job_reputation(
        &self,
        caller: &Address,
        provider: &Address,
        developer: &Address,
        successful: bool,
        amount: Amount,
    ) -> Result<()> {
        {
            let manager = self.manager.read();
            if manager.as_ref() != Some(caller) {
                return Err(ReputationError::Unauthorized {
                    caller: caller.clone(),
                });
            }
        }

        let deltas = self.policy.deltas(successful, amount);
        let mut records = self.records.write();

        let provider_rec = records
            .entry(provider.clone())
            .or_insert_with(|| ReputationRecord::new(provider.clone(), true, false));
        if successful {
            provider_rec.successful_jobs += 1;
        } else {
            provider_rec.failed_jobs += 1;
        }
        provider_rec.apply_delta(deltas.provider);
        let provider_score = provider_rec.score;

        let developer_rec = records
            .entry(developer.clone())
            .or_insert_with(|| ReputationRecord::new(developer.clone(), false, true));
        developer_rec.apply_delta(deltas.developer);

        info!(
            provider = %provider,
            developer = %developer,
            successful,
            provider_score,
            "job outcome recorded"
        );
        Ok(())
    }

    /// Point-in-time snapshot of an identity's record.
    #[must_use]
    pub fn get(&self, identity: &Address) -> Option<ReputationRecord> {
        self.records.read().get(identity).cloned()
    }

    /// Whether an identity has a record.
    #[must_use]
    pub fn is_registered(&self, identity: &Address) -> bool {
        self.records.read().contains_key(identity)
    }
}

impl std::fmt::Debug for ReputationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationRegistry")
            .field("admin", &self.admin)
            .field("manager", &*self.manager.read())
            .field("records", &self.records.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};
    use kiln_core::Wallet;
    use test_case::test_case;

    fn addr() -> Address {
        Wallet::generate().expect("wallet").address().clone()
    }

    fn registry_with_manager() -> (ReputationRegistry, Address) {
        let admin = addr();
        let registry = ReputationRegistry::new(admin.clone());
        let manager = addr();
        registry
            .set_manager(&admin, manager.clone())
            .expect("set manager");
        (registry, manager)
    }

    #[test]
    fn registration_starts_neutral() {
        let (registry, _) = registry_with_manager();
        let user = addr();
        registry.register_user(&user, true, false);

        let rec = registry.get(&user).expect("record");
        assert_eq!(rec.score, DEFAULT_SCORE);
        assert!(rec.is_provider);
        assert!(!rec.is_developer);
    }

    #[test]
    fn reregistration_updates_roles_only() {
        let (registry, manager) = registry_with_manager();
        let user = addr();
        registry.register_user(&user, true, false);
        registry
            .update_job_reputation(&manager, &user, &addr(), true, Amount::from_grains(100))
            .expect("outcome");

        registry.register_user(&user, false, true);

        let rec = registry.get(&user).expect("record");
        assert!(!rec.is_provider);
        assert!(rec.is_developer);
        // Score and counters survive re-registration.
        assert_eq!(rec.score, 525);
        assert_eq!(rec.successful_jobs, 1);
    }

    #[test]
    fn five_stars_on_fresh_record_yields_540() {
        let (registry, _) = registry_with_manager();
        let rater = addr();
        let target = addr();
        registry.register_user(&target, true, false);

        registry.submit_rating(&rater, &target, 5).expect("rate");

        let rec = registry.get(&target).expect("record");
        assert_eq!(rec.score, 540);
        assert_eq!(rec.total_ratings, 5);
        assert_eq!(rec.rating_count, 1);
    }

    #[test_case(1, 460 ; "one star drops forty")]
    #[test_case(2, 480 ; "two stars drop twenty")]
    #[test_case(3, 500 ; "three stars are neutral")]
    #[test_case(4, 520 ; "four stars add twenty")]
    #[test_case(5, 540 ; "five stars add forty")]
    fn rating_formula(stars: u8, expected: u32) {
        let (registry, _) = registry_with_manager();
        let rater = addr();
        let target = addr();
        registry.register_user(&target, true, false);

        registry.submit_rating(&rater, &target, stars).expect("rate");
        assert_eq!(registry.get(&target).expect("record").score, expected);
    }

    #[test_case(0)]
    #[test_case(6)]
    #[test_case(255)]
    fn rating_out_of_range_rejected(stars: u8) {
        let (registry, _) = registry_with_manager();
        let target = addr();
        registry.register_user(&target, true, false);

        let result = registry.submit_rating(&addr(), &target, stars);
        assert!(matches!(result, Err(ReputationError::InvalidStars(_))));
    }

    #[test]
    fn self_rating_rejected() {
        let (registry, _) = registry_with_manager();
        let user = addr();
        registry.register_user(&user, true, false);

        let result = registry.submit_rating(&user, &user, 5);
        assert!(matches!(result, Err(ReputationError::SelfRating)));

        // Record untouched.
        assert_eq!(registry.get(&user).expect("record").score, DEFAULT_SCORE);
    }

    #[test]
    fn rating_unregistered_target_rejected() {
        let (registry, _) = registry_with_manager();
        let result = registry.submit_rating(&addr(), &addr(), 4);
        assert!(matches!(result, Err(ReputationError::NotRegistered(_))));
    }

    #[test]
    fn outcome_requires_manager() {
        let (registry, _) = registry_with_manager();
        let imposter = addr();
        let result = registry.update_job_reputation(
            &imposter,
            &addr(),
            &addr(),
            true,
            Amount::from_grains(100),
        );
        assert!(matches!(result, Err(ReputationError::Unauthorized { .. })));
    }

    #[test]
    fn successful_outcome_moves_both_scores() {
        let (registry, manager) = registry_with_manager();
        let provider = addr();
        let developer = addr();
        registry.register_user(&provider, true, false);
        registry.register_user(&developer, false, true);

        registry
            .update_job_reputation(&manager, &provider, &developer, true, Amount::from_grains(100))
            .expect("outcome");

        let prov = registry.get(&provider).expect("record");
        let dev = registry.get(&developer).expect("record");
        assert_eq!(prov.score, 525);
        assert_eq!(prov.successful_jobs, 1);
        assert_eq!(prov.failed_jobs, 0);
        assert_eq!(dev.score, 505);
    }

    #[test]
    fn failed_outcome_penalizes_provider() {
        let (registry, manager) = registry_with_manager();
        let provider = addr();
        let developer = addr();
        registry.register_user(&provider, true, false);

        registry
            .update_job_reputation(&manager, &provider, &developer, false, Amount::from_grains(100))
            .expect("outcome");

        let prov = registry.get(&provider).expect("record");
        assert_eq!(prov.score, 475);
        assert_eq!(prov.failed_jobs, 1);
    }

    #[test]
    fn outcome_auto_registers_missing_records() {
        let (registry, manager) = registry_with_manager();
        let provider = addr();
        let developer = addr();

        registry
            .update_job_reputation(&manager, &provider, &developer, true, Amount::from_grains(1))
            .expect("outcome");

        assert!(registry.is_registered(&provider));
        assert!(registry.is_registered(&developer));
    }

    #[test]
    fn set_manager_requires_admin() {
        let registry = ReputationRegistry::new(addr());
        let caller = addr();
        let result = registry.set_manager(&caller, addr());
        assert!(matches!(result, Err(ReputationError::Unauthorized { .. })));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn score_stays_in_bounds(stars_seq in proptest::collection::vec(1u8..=5, 0..200)) {
                let (registry, _) = registry_with_manager();
                let rater = addr();
                let target = addr();
                registry.register_user(&target, true, false);

                for stars in stars_seq {
                    registry.submit_rating(&rater, &target, stars).expect("rate");
                    let score = registry.get(&target).expect("record").score;
                    prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
                }
            }

            #[test]
            fn outcomes_keep_score_in_bounds(outcomes in proptest::collection::vec(any::<bool>(), 0..200)) {
                let (registry, manager) = registry_with_manager();
                let provider = addr();
                let developer = addr();

                for successful in outcomes {
                    registry
                        .update_job_reputation(
                            &manager,
                            &provider,
                            &developer,
                            successful,
                            Amount::from_grains(100),
                        )
                        .expect("outcome");
                    let score = registry.get(&provider).expect("record").score;
                    prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
                }
            }
        }
    }
}
