//! # Ledger Service
//!
//! Async front end for one [`HybridLedger`]. The ledger sits behind a single
//! write lock, so calls are serialized and each one observes every earlier
//! committed call. Events of a committed call are numbered and handed to
//! the event sink before the lock is released, which keeps the published
//! stream in commit order.
//!
//! ## Permit flow
//!
//! 1. Reject if the deadline has passed
//! 2. Read the owner's current nonce
//! 3. Recover the signer of the EIP-712 digest and compare with the owner
//! 4. Consume the nonce and set the allowance in one ledger call

use crate::adapters::{ControllableTimeSource, Eip712PermitVerifier, InMemoryEventLog};
use crate::config::LedgerConfig;
use crate::domain::buckets::BucketSizes;
use crate::domain::invariants::InvariantCheckResult;
use crate::domain::ledger::{HybridLedger, LedgerReceipt};
use crate::domain::value_objects::{Address, TokenId, U256};
use crate::errors::{Categorized, ConfigError, LedgerError, PermitError};
use crate::events::{EventRecord, LedgerEvent};
use crate::ports::inbound::LedgerApi;
use crate::ports::outbound::{EventSink, Permit, PermitSignature, PermitVerifier, TimeSource};

use async_trait::async_trait;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Ledger service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Publish the construction events when the service starts.
    pub publish_genesis: bool,
    /// Run the invariant checker every N committed calls (0 disables).
    pub audit_interval: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            publish_genesis: true,
            audit_interval: 0,
        }
    }
}

/// Statistics for the ledger service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Calls that committed.
    pub calls_committed: u64,
    /// Calls rejected with an error.
    pub calls_rejected: u64,
    /// Events handed to the sink.
    pub events_published: u64,
    /// Discrete ids minted for the first time.
    pub tokens_minted: u64,
    /// Discrete ids surrendered to the reclaim queue.
    pub tokens_reclaimed: u64,
    /// Discrete ids reissued from the reclaim queue.
    pub tokens_reissued: u64,
    /// Permits accepted.
    pub permits_accepted: u64,
    /// Permits rejected.
    pub permits_rejected: u64,
    /// Invariant audits performed.
    pub audits_run: u64,
    /// Audits that found violations.
    pub audit_failures: u64,
    /// Average call time in microseconds.
    pub avg_call_time_us: u64,
}

/// The ledger service.
pub struct LedgerService<E: EventSink, P: PermitVerifier, T: TimeSource> {
    /// Service configuration.
    config: ServiceConfig,
    /// The ledger, serialized behind one lock.
    ledger: Arc<RwLock<HybridLedger>>,
    /// Event delivery.
    sink: Arc<E>,
    /// Permit signer recovery.
    verifier: Arc<P>,
    /// Clock for permit deadlines.
    clock: Arc<T>,
    /// Next event sequence number.
    next_sequence: AtomicU64,
    /// Committed calls; only advanced while the write lock is held.
    commits: AtomicU64,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<E: EventSink, P: PermitVerifier, T: TimeSource> LedgerService<E, P, T> {
    /// Wraps a ledger and publishes its construction events.
    pub async fn new(
        ledger: HybridLedger,
        sink: Arc<E>,
        verifier: Arc<P>,
        clock: Arc<T>,
        config: ServiceConfig,
    ) -> Self {
        let genesis = ledger.genesis_events().to_vec();
        let service = Self {
            config,
            ledger: Arc::new(RwLock::new(ledger)),
            sink,
            verifier,
            clock,
            next_sequence: AtomicU64::new(0),
            commits: AtomicU64::new(0),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        };

        if service.config.publish_genesis && !genesis.is_empty() {
            let records = service.number(genesis);
            service.sink.publish(&records).await;
            service.stats.write().await.events_published += records.len() as u64;
            info!(events = records.len(), "Genesis events published");
        }
        service
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Event sink handle.
    #[must_use]
    pub fn sink(&self) -> &Arc<E> {
        &self.sink
    }

    /// Clock handle.
    #[must_use]
    pub fn clock(&self) -> &Arc<T> {
        &self.clock
    }

    /// Copy of the ledger as of the last committed call.
    pub async fn snapshot(&self) -> HybridLedger {
        self.ledger.read().await.clone()
    }

    /// Runs every invariant check against the committed state.
    pub async fn check_invariants(&self) -> InvariantCheckResult {
        self.ledger.read().await.check_invariants()
    }

    fn number(&self, events: Vec<LedgerEvent>) -> Vec<EventRecord> {
        let first = self
            .next_sequence
            .fetch_add(events.len() as u64, Ordering::SeqCst);
        events
            .into_iter()
            .zip(first..)
            .map(|(event, sequence)| EventRecord { sequence, event })
            .collect()
    }

    /// Runs one mutating call under the write lock.
    #[instrument(skip(self, op), fields(request_id))]
    async fn execute<X, F>(&self, operation: &'static str, op: F) -> Result<LedgerReceipt, X>
    where
        X: Categorized + Display + Send,
        F: FnOnce(&mut HybridLedger) -> Result<LedgerReceipt, X> + Send,
    {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        let start = Instant::now();

        let mut ledger = self.ledger.write().await;
        let result = op(&mut ledger);

        let mut published = 0usize;
        let mut audited = false;
        let mut audit_failed = false;
        match &result {
            Ok(receipt) => {
                let committed = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
                let records = self.number(receipt.events.clone());
                published = records.len();
                if !records.is_empty() {
                    self.sink.publish(&records).await;
                }

                let interval = self.config.audit_interval;
                if interval > 0 && committed % interval == 0 {
                    audited = true;
                    #[cfg(feature = "metrics")]
                    let _timer = crate::metrics::audit_timer();
                    if let InvariantCheckResult::Invalid(violations) = ledger.check_invariants() {
                        error!(
                            operation,
                            violations = violations.len(),
                            first = ?violations.first(),
                            "Invariant audit failed"
                        );
                        audit_failed = true;
                    }
                }

                debug!(
                    operation,
                    events = published,
                    reclaimed = receipt.discrete.reclaimed.len(),
                    reissued = receipt.discrete.reissued.len(),
                    minted = receipt.discrete.minted.len(),
                    queue = ledger.queue_length(),
                    "Ledger call committed"
                );
            }
            Err(e) => {
                warn!(operation, category = e.category(), error = %e, "Ledger call rejected");
            }
        }

        #[cfg(feature = "metrics")]
        {
            let elapsed = start.elapsed().as_secs_f64();
            match &result {
                Ok(receipt) => {
                    crate::metrics::record_commit(operation, receipt, ledger.queue_length(), elapsed);
                }
                Err(e) => crate::metrics::record_rejection(operation, e.category(), elapsed),
            }
        }
        drop(ledger);

        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        {
            let mut stats = self.stats.write().await;
            match &result {
                Ok(receipt) => {
                    stats.calls_committed += 1;
                    stats.events_published += published as u64;
                    stats.tokens_minted += receipt.discrete.minted.len() as u64;
                    stats.tokens_reclaimed += receipt.discrete.reclaimed.len() as u64;
                    stats.tokens_reissued += receipt.discrete.reissued.len() as u64;
                }
                Err(_) => stats.calls_rejected += 1,
            }
            if audited {
                stats.audits_run += 1;
            }
            if audit_failed {
                stats.audit_failures += 1;
            }
            let total = stats.calls_committed + stats.calls_rejected;
            stats.avg_call_time_us =
                (stats.avg_call_time_us * (total - 1) + elapsed_us) / total;
        }

        result
    }

    async fn read<R, F>(&self, op: F) -> R
    where
        F: FnOnce(&HybridLedger) -> R + Send,
    {
        let ledger = self.ledger.read().await;
        op(&ledger)
    }

    /// Accepts an owner-signed permit and sets the allowance.
    ///
    /// # Errors
    ///
    /// - `Expired` if the deadline has passed
    /// - `InvalidSignature` if the signature cannot be recovered
    /// - `InvalidSigner` if it recovers to anyone but `owner`
    /// - `Ledger` if the approval itself is rejected
    pub async fn submit_permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
        signature: PermitSignature,
    ) -> Result<LedgerReceipt, PermitError> {
        let now = self.clock.now();
        let verifier = Arc::clone(&self.verifier);
        let result = self
            .execute("permit", move |ledger| {
                if now > deadline {
                    return Err(PermitError::Expired { deadline, now });
                }
                let permit = Permit {
                    owner,
                    spender,
                    value,
                    nonce: ledger.nonces(&owner),
                    deadline,
                };
                let recovered = verifier.recover_signer(&permit, &signature)?;
                if recovered.is_zero() || recovered != owner {
                    return Err(PermitError::InvalidSigner {
                        expected: owner,
                        recovered,
                    });
                }
                Ok(ledger.approve_on_behalf(owner, spender, value, permit.nonce)?)
            })
            .await;

        {
            let mut stats = self.stats.write().await;
            if result.is_ok() {
                stats.permits_accepted += 1;
            } else {
                stats.permits_rejected += 1;
            }
        }
        #[cfg(feature = "metrics")]
        crate::metrics::record_permit(result.is_ok());

        result
    }
}

/// Ledger used by [`create_test_service`]: 3 decimals, 100 whole units,
/// invariants checked on every commit.
#[must_use]
pub fn test_ledger_config(admin: Address) -> LedgerConfig {
    let mut config = LedgerConfig::with_admin(admin);
    config.decimals = 3;
    config.max_total_supply_units = 100;
    config.verify_invariants = true;
    config
}

/// Service over in-memory adapters with a controllable clock starting at 1000.
///
/// # Errors
///
/// `ConfigError` if `config` fails validation.
pub async fn create_service_with_config(
    config: LedgerConfig,
) -> Result<LedgerService<InMemoryEventLog, Eip712PermitVerifier, ControllableTimeSource>, ConfigError>
{
    let verifier = Eip712PermitVerifier::from_config(&config);
    let ledger = HybridLedger::new(config)?;
    Ok(LedgerService::new(
        ledger,
        Arc::new(InMemoryEventLog::new()),
        Arc::new(verifier),
        Arc::new(ControllableTimeSource::new(1_000)),
        ServiceConfig {
            publish_genesis: true,
            audit_interval: 1,
        },
    )
    .await)
}

/// Create a default service with in-memory adapters (for testing).
///
/// # Errors
///
/// Never for the built-in configuration.
pub async fn create_test_service(
    admin: Address,
) -> Result<LedgerService<InMemoryEventLog, Eip712PermitVerifier, ControllableTimeSource>, ConfigError>
{
    create_service_with_config(test_ledger_config(admin)).await
}

// =============================================================================
// LedgerApi Implementation
// =============================================================================

#[async_trait]
impl<E, P, T> LedgerApi for LedgerService<E, P, T>
where
    E: EventSink + 'static,
    P: PermitVerifier + 'static,
    T: TimeSource + 'static,
{
    async fn balance_of(&self, account: Address) -> U256 {
        self.read(|l| l.balance_of(&account)).await
    }

    async fn total_supply(&self) -> U256 {
        self.read(HybridLedger::total_supply).await
    }

    async fn transfer(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("transfer", |l| l.transfer(caller, to, amount))
            .await
    }

    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("transfer_from", |l| l.transfer_from(caller, from, to, amount))
            .await
    }

    async fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("approve", |l| l.approve(caller, spender, amount))
            .await
    }

    async fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.read(|l| l.allowance(&owner, &spender)).await
    }

    async fn mint(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("mint", |l| l.mint_fungible(caller, to, amount))
            .await
    }

    async fn burn(&self, caller: Address, amount: U256) -> Result<LedgerReceipt, LedgerError> {
        self.execute("burn", |l| l.burn(caller, amount)).await
    }

    async fn owner_of(&self, id: U256) -> Result<Address, LedgerError> {
        self.read(|l| l.owner_of(id)).await
    }

    async fn owned_tokens(&self, account: Address) -> Vec<TokenId> {
        self.read(|l| l.owned_tokens(&account)).await
    }

    async fn token_balance_of(&self, account: Address) -> usize {
        self.read(|l| l.token_balance_of(&account)).await
    }

    async fn token_total_supply(&self) -> u64 {
        self.read(HybridLedger::token_total_supply).await
    }

    async fn transfer_token(
        &self,
        caller: Address,
        id: U256,
        to: Address,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("transfer_token", |l| l.transfer_token(caller, id, to))
            .await
    }

    async fn transfer_token_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("transfer_token_from", |l| {
            l.transfer_token_from(caller, from, to, id)
        })
        .await
    }

    async fn approve_token(
        &self,
        caller: Address,
        spender: Address,
        id: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("approve_token", |l| l.approve_token(caller, spender, id))
            .await
    }

    async fn get_approved(&self, id: U256) -> Result<Option<Address>, LedgerError> {
        self.read(|l| l.get_approved(id)).await
    }

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.read(|l| l.is_approved_for_all(&owner, &operator)).await
    }

    async fn set_approval_for_all(
        &self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("set_approval_for_all", |l| {
            l.set_approval_for_all(caller, operator, approved)
        })
        .await
    }

    async fn queue_length(&self) -> usize {
        self.read(HybridLedger::queue_length).await
    }

    async fn queue_peek(&self, index: usize) -> Option<TokenId> {
        self.read(|l| l.queue_peek(index)).await
    }

    async fn tokens_in_queue(&self) -> Vec<TokenId> {
        self.read(HybridLedger::tokens_in_queue).await
    }

    async fn bucket_sizes(&self) -> BucketSizes {
        self.read(HybridLedger::bucket_sizes).await
    }

    async fn bucket_balance_of(
        &self,
        account: Address,
        bucket_id: U256,
    ) -> Result<U256, LedgerError> {
        self.read(|l| l.bucket_balance_of(&account, bucket_id)).await
    }

    async fn safe_transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        bucket_id: U256,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("safe_transfer_from", |l| {
            l.safe_transfer_from(caller, from, to, bucket_id, amount)
        })
        .await
    }

    async fn safe_batch_transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        ids: Vec<U256>,
        amounts: Vec<U256>,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("safe_batch_transfer_from", move |l| {
            l.safe_batch_transfer_from(caller, from, to, &ids, &amounts)
        })
        .await
    }

    async fn is_exempt(&self, account: Address) -> bool {
        self.read(|l| l.is_exempt(&account)).await
    }

    async fn set_exempt(
        &self,
        caller: Address,
        account: Address,
        exempt: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("set_exempt", |l| l.set_exempt(caller, account, exempt))
            .await
    }

    async fn set_self_exempt(
        &self,
        caller: Address,
        exempt: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("set_self_exempt", |l| l.set_self_exempt(caller, exempt))
            .await
    }

    async fn transfer_ownership(
        &self,
        caller: Address,
        new_admin: Address,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.execute("transfer_ownership", |l| {
            l.transfer_ownership(caller, new_admin)
        })
        .await
    }

    async fn nonces(&self, owner: Address) -> U256 {
        self.read(|l| l.nonces(&owner)).await
    }

    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
        signature: PermitSignature,
    ) -> Result<LedgerReceipt, PermitError> {
        self.submit_permit(owner, spender, value, deadline, signature)
            .await
    }
}

// =============================================================================
// TESTS
// =============================================================================
