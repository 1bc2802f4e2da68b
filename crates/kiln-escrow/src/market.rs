//! The job escrow command surface.
//!
//! [`JobEscrow`] ties the ledger, the reputation registry, and the job book
//! together. Each command takes one write lock on the book for its whole
//! duration, performs every fallible check before the first mutation, and
//! emits an event only after the transition has committed. The single
//! fallible side effect per command is a ledger movement, which is itself
//! atomic, so a failed command leaves every balance, job, dispute, and
//! reputation record unchanged.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kiln_core::{Address, Amount};
use kiln_ledger::Ledger;
use kiln_reputation::ReputationRegistry;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::EscrowConfig;
use crate::dispute::{Dispute, DisputeId};
use crate::error::{EscrowError, Result};
use crate::event::JobEvent;
use crate::job::{Job, JobId, JobStatus};

/// Capacity of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Flat arenas for jobs and disputes plus the arbitrator capability set.
///
/// Ids are monotonic and never reused; cross-references (job to dispute and
/// back) are id lookups, never ownership.
struct EscrowBook {
    jobs: HashMap<JobId, Job>,
    disputes: HashMap<DisputeId, Dispute>,
    arbitrators: HashSet<Address>,
    next_job_id: u64,
    next_dispute_id: u64,
}

impl EscrowBook {
    fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            disputes: HashMap::new(),
            arbitrators: HashSet::new(),
            next_job_id: 1,
            next_dispute_id: 1,
        }
    }
}

/// The escrow service for pay-per-job compute.
///
/// Construction wires explicit capabilities: the admin address (grants
/// arbitrator status), the vault address (holds escrowed funds in the
/// ledger and acts as the reputation manager), and the fee collector.
/// There is no ambient global state.
pub struct JobEscrow {
    config: EscrowConfig,
    admin: Address,
    vault: Address,
    fee_collector: Address,
    ledger: Arc<Ledger>,
    reputation: Arc<ReputationRegistry>,
    book: RwLock<EscrowBook>,
    events: broadcast::Sender<JobEvent>,
}

impl JobEscrow {
    /// Create an escrow service.
    ///
    /// The reputation registry's manager must be set to `vault` for
    /// settlement to record job outcomes.
    #[must_use]
    pub fn new(
        admin: Address,
        vault: Address,
        fee_collector: Address,
        ledger: Arc<Ledger>,
        reputation: Arc<ReputationRegistry>,
        config: EscrowConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            admin,
            vault,
            fee_collector,
            ledger,
            reputation,
            book: RwLock::new(EscrowBook::new()),
            events,
        }
    }

    /// The escrow configuration.
    #[must_use]
    pub const fn config(&self) -> &EscrowConfig {
        &self.config
    }

    /// The vault address holding escrowed funds.
    #[must_use]
    pub const fn vault(&self) -> &Address {
        &self.vault
    }

    /// The fee collector address.
    #[must_use]
    pub const fn fee_collector(&self) -> &Address {
        &self.fee_collector
    }

    /// Subscribe to job events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Post and fund a new job.
    ///
    /// Locks `amount + fee` from the buyer into the vault; the fee is
    /// `floor(amount * fee_rate_bps / 10_000)`, fixed for the job's life.
    ///
    /// # Errors
    ///
    /// `BelowMinimum` if the price is under the configured minimum;
    /// `InsufficientFunds` if the buyer cannot cover price plus fee.
    pub fn create_job(
        &self,
        caller: &Address,
        amount: Amount,
        dataset_hash: impl Into<String>,
    ) -> Result<Job> {
        if amount < self.config.min_job_amount {
            return Err(EscrowError::BelowMinimum {
                amount,
                minimum: self.config.min_job_amount,
            });
        }
        let fee = self.config.fee(amount);
        let total = amount.checked_add(fee).ok_or(EscrowError::AmountOverflow)?;

        let mut book = self.book.write();
        self.ledger.transfer(caller, &self.vault, total)?;

        let id = JobId(book.next_job_id);
        book.next_job_id += 1;
        let job = Job::new(id, caller.clone(), amount, fee, dataset_hash.into());
        book.jobs.insert(id, job.clone());

        info!(job_id = %id, buyer = %caller, amount = %amount, fee = %fee, "job created");
        self.emit(JobEvent::JobCreated {
            job_id: id,
            buyer: caller.clone(),
            amount,
            fee,
        });
        Ok(job)
    }

    /// Accept a posted job as its provider.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the job is `Created`; `SelfAccept` if the
    /// buyer tries to take their own job.
    pub fn accept_job(&self, caller: &Address, id: JobId) -> Result<Job> {
        let mut book = self.book.write();
        let job = book.jobs.get_mut(&id).ok_or(EscrowError::JobNotFound(id))?;

        if job.status != JobStatus::Created {
            return Err(EscrowError::InvalidState {
                command: "accept job",
                status: job.status,
            });
        }
        if caller == &job.buyer {
            return Err(EscrowError::SelfAccept);
        }

        job.provider = Some(caller.clone());
        job.advance(JobStatus::Active);
        let snapshot = job.clone();

        info!(job_id = %id, provider = %caller, "job accepted");
        self.emit(JobEvent::JobAccepted {
            job_id: id,
            provider: caller.clone(),
        });
        Ok(snapshot)
    }

    /// Submit the completion proof for an active job.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the job is `Active`; `Unauthorized` unless the
    /// caller is the job's provider.
    pub fn submit_completion(
        &self,
        caller: &Address,
        id: JobId,
        proof_hash: impl Into<String>,
    ) -> Result<Job> {
        let mut book = self.book.write();
        let job = book.jobs.get_mut(&id).ok_or(EscrowError::JobNotFound(id))?;

        if job.status != JobStatus::Active {
            return Err(EscrowError::InvalidState {
                command: "submit completion",
                status: job.status,
            });
        }
        if job.provider.as_ref() != Some(caller) {
            return Err(EscrowError::unauthorized(caller, "submit completion"));
        }

        let proof_hash = proof_hash.into();
        job.proof_hash = Some(proof_hash.clone());
        job.advance(JobStatus::Completed);
        let snapshot = job.clone();

        info!(job_id = %id, provider = %caller, "completion submitted");
        self.emit(JobEvent::JobCompleted {
            job_id: id,
            provider: caller.clone(),
            proof_hash,
        });
        Ok(snapshot)
    }

    /// Approve completed work, releasing payment to the provider and the
    /// fee to the collector, and recording a successful job outcome.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the job is `Completed`; `Unauthorized` unless
    /// the caller is the buyer.
    pub fn approve_job(&self, caller: &Address, id: JobId) -> Result<Job> {
        let mut book = self.book.write();
        let job = book.jobs.get(&id).ok_or(EscrowError::JobNotFound(id))?;

        if job.status != JobStatus::Completed {
            return Err(EscrowError::InvalidState {
                command: "approve job",
                status: job.status,
            });
        }
        if caller != &job.buyer {
            return Err(EscrowError::unauthorized(caller, "approve job"));
        }
        let Some(provider) = job.provider.clone() else {
            return Err(EscrowError::InvalidState {
                command: "approve job",
                status: job.status,
            });
        };
        let (amount, fee) = (job.amount, job.fee);
        let buyer = job.buyer.clone();

        // Reputation first: the vault invariant (it always holds
        // amount + fee for a live job) means the disbursement below
        // cannot fail, so ordering keeps the command all-or-nothing.
        self.reputation
            .update_job_reputation(&self.vault, &provider, &buyer, true, amount)?;
        self.ledger.disburse(
            &self.vault,
            &[
                (provider.clone(), amount),
                (self.fee_collector.clone(), fee),
            ],
        )?;

        let job = book.jobs.get_mut(&id).ok_or(EscrowError::JobNotFound(id))?;
        job.advance(JobStatus::Resolved);
        let snapshot = job.clone();

        info!(job_id = %id, provider = %provider, payout = %amount, fee = %fee, "job approved");
        self.emit(JobEvent::JobApproved {
            job_id: id,
            provider,
            payout: amount,
            fee,
        });
        Ok(snapshot)
    }

    /// Cancel an unaccepted job, refunding the buyer in full.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the job is `Created`; `Unauthorized` unless
    /// the caller is the buyer.
    pub fn cancel_job(
        &self,
        caller: &Address,
        id: JobId,
        reason: impl Into<String>,
    ) -> Result<Job> {
        let mut book = self.book.write();
        let job = book.jobs.get(&id).ok_or(EscrowError::JobNotFound(id))?;

        if job.status != JobStatus::Created {
            return Err(EscrowError::InvalidState {
                command: "cancel job",
                status: job.status,
            });
        }
        if caller != &job.buyer {
            return Err(EscrowError::unauthorized(caller, "cancel job"));
        }
        let refund = job.escrowed();
        let buyer = job.buyer.clone();

        self.ledger.transfer(&self.vault, &buyer, refund)?;

        let job = book.jobs.get_mut(&id).ok_or(EscrowError::JobNotFound(id))?;
        job.cancel_reason = Some(reason.into());
        job.advance(JobStatus::Cancelled);
        let snapshot = job.clone();

        info!(job_id = %id, buyer = %buyer, refund = %refund, "job cancelled");
        self.emit(JobEvent::JobCancelled {
            job_id: id,
            buyer,
            refund,
        });
        Ok(snapshot)
    }

    /// Open a dispute over completed work.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the job is `Completed`; `Unauthorized` unless
    /// the caller is the buyer or the provider.
    pub fn create_dispute(
        &self,
        caller: &Address,
        id: JobId,
        reason: impl Into<String>,
    ) -> Result<Dispute> {
        let mut book = self.book.write();
        let job = book.jobs.get(&id).ok_or(EscrowError::JobNotFound(id))?;

        if job.status != JobStatus::Completed {
            return Err(EscrowError::InvalidState {
                command: "open dispute",
                status: job.status,
            });
        }
        let is_party = caller == &job.buyer || job.provider.as_ref() == Some(caller);
        if !is_party {
            return Err(EscrowError::unauthorized(caller, "open dispute"));
        }

        let dispute_id = DisputeId(book.next_dispute_id);
        book.next_dispute_id += 1;
        let dispute = Dispute::new(dispute_id, id, caller.clone(), reason.into());
        book.disputes.insert(dispute_id, dispute.clone());

        let job = book.jobs.get_mut(&id).ok_or(EscrowError::JobNotFound(id))?;
        job.dispute_id = Some(dispute_id);
        job.advance(JobStatus::Disputed);

        info!(job_id = %id, dispute_id = %dispute_id, initiator = %caller, "dispute opened");
        self.emit(JobEvent::JobDisputed {
            job_id: id,
            dispute_id,
            initiator: caller.clone(),
        });
        Ok(dispute)
    }

    /// Resolve a dispute, releasing the escrowed price to the winner and
    /// the fee to the collector. Final and irreversible.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the job is `Disputed` (a second resolution
    /// therefore fails here); `Unauthorized` unless the caller is an
    /// arbitrator; `InvalidWinner` unless the winner is the buyer or the
    /// provider.
    pub fn resolve_dispute(&self, caller: &Address, id: JobId, winner: &Address) -> Result<Job> {
        let mut book = self.book.write();
        let job = book.jobs.get(&id).ok_or(EscrowError::JobNotFound(id))?;

        if job.status != JobStatus::Disputed {
            return Err(EscrowError::InvalidState {
                command: "resolve dispute",
                status: job.status,
            });
        }
        if !book.arbitrators.contains(caller) {
            return Err(EscrowError::unauthorized(caller, "resolve dispute"));
        }

        let Some(provider) = job.provider.clone() else {
            return Err(EscrowError::InvalidState {
                command: "resolve dispute",
                status: job.status,
            });
        };
        let Some(dispute_id) = job.dispute_id else {
            return Err(EscrowError::InvalidState {
                command: "resolve dispute",
                status: job.status,
            });
        };
        let buyer = job.buyer.clone();
        let (amount, fee) = (job.amount, job.fee);

        if winner != &buyer && winner != &provider {
            return Err(EscrowError::InvalidWinner {
                winner: winner.clone(),
            });
        }
        let provider_won = winner == &provider;

        self.reputation
            .update_job_reputation(&self.vault, &provider, &buyer, provider_won, amount)?;
        self.ledger.disburse(
            &self.vault,
            &[
                (winner.clone(), amount),
                (self.fee_collector.clone(), fee),
            ],
        )?;

        let dispute = book
            .disputes
            .get_mut(&dispute_id)
            .ok_or(EscrowError::DisputeNotFound(dispute_id))?;
        dispute.resolve(winner.clone());

        let job = book.jobs.get_mut(&id).ok_or(EscrowError::JobNotFound(id))?;
        job.advance(JobStatus::Resolved);
        let snapshot = job.clone();

        info!(
            job_id = %id,
            dispute_id = %dispute_id,
            winner = %winner,
            provider_won,
            payout = %amount,
            "dispute resolved"
        );
        self.emit(JobEvent::JobResolved {
            job_id: id,
            dispute_id,
            winner: winner.clone(),
            payout: amount,
        });
        Ok(snapshot)
    }

    /// Grant or revoke the arbitrator capability. Admin only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the caller is not the escrow admin.
    pub fn set_arbitrator(&self, caller: &Address, account: &Address, enabled: bool) -> Result<()> {
        if caller != &self.admin {
            return Err(EscrowError::unauthorized(caller, "set arbitrator"));
        }

        let mut book = self.book.write();
        if enabled {
            book.arbitrators.insert(account.clone());
        } else {
            book.arbitrators.remove(account);
        }

        info!(account = %account, enabled, "arbitrator capability updated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Point-in-time snapshot of a job.
    #[must_use]
    pub fn get_job(&self, id: JobId) -> Option<Job> {
        self.book.read().jobs.get(&id).cloned()
    }

    /// Point-in-time snapshot of a dispute.
    #[must_use]
    pub fn get_dispute(&self, id: DisputeId) -> Option<Dispute> {
        self.book.read().disputes.get(&id).cloned()
    }

    /// All jobs where the identity is buyer or provider.
    #[must_use]
    pub fn jobs_for(&self, address: &Address) -> Vec<Job> {
        let book = self.book.read();
        let mut jobs: Vec<Job> = book
            .jobs
            .values()
            .filter(|j| &j.buyer == address || j.provider.as_ref() == Some(address))
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.id);
        jobs
    }

    /// Whether an identity holds the arbitrator capability.
    #[must_use]
    pub fn is_arbitrator(&self, address: &Address) -> bool {
        self.book.read().arbitrators.contains(address)
    }

    fn emit(&self, event: JobEvent) {
        debug!(event = %event, "event emitted");
        // Delivery is best-effort; the core never depends on subscribers.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for JobEscrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let book = self.book.read();
        f.debug_struct("JobEscrow")
            .field("vault", &self.vault)
            .field("fee_collector", &self.fee_collector)
            .field("jobs", &book.jobs.len())
            .field("disputes", &book.disputes.len())
            .finish_non_exhaustive()
    }
}
