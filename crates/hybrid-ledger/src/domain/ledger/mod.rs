//! # Hybrid Ledger Aggregate
//!
//! One owned ledger instance holding every component. All public mutations
//! go through [`HybridLedger::transact`], which applies the call in place
//! while each component journals what it overwrites. The journals are
//! cleared when the whole call succeeds and replayed backwards otherwise, so
//! a failed call leaves no partial effects and emits no events.
//!
//! Operations are grouped by surface:
//!
//! | Surface | Module |
//! |---------|--------|
//! | Fungible transfers, allowances, mint, burn | `fungible.rs` |
//! | Discrete transfers and approvals | `discrete.rs` |
//! | Carton/pack/loosie transfers | `bucketed.rs` |
//! | Exemptions and administration | `admin.rs` |

mod admin;
mod bucketed;
mod discrete;
mod fungible;
mod txn;

use crate::config::LedgerConfig;
use crate::domain::authorization::Authorization;
use crate::domain::buckets::BucketSizes;
use crate::domain::exemption::{ExemptionMode, ExemptionRegistry};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::reclaim_queue::ReclaimQueue;
use crate::domain::reconciler::ReconcileOutcome;
use crate::domain::registry::DiscreteTokenRegistry;
use crate::domain::unit_ledger::UnitLedger;
use crate::domain::value_objects::{Address, TokenId, U256};
use crate::errors::{ConfigError, LedgerError};
use crate::events::LedgerEvent;
use tracing::{debug, info};

pub(crate) use txn::Txn;

// =============================================================================
// STATE
// =============================================================================

/// Every mutable component of the ledger.
#[derive(Clone, Debug)]
pub struct LedgerState {
    pub(crate) units: UnitLedger,
    pub(crate) registry: DiscreteTokenRegistry,
    pub(crate) bank: ReclaimQueue,
    pub(crate) exemptions: ExemptionRegistry,
    pub(crate) authorization: Authorization,
    pub(crate) admin: Address,
}

impl LedgerState {
    /// Empty state administered by `admin`.
    #[must_use]
    pub fn new(admin: Address) -> Self {
        Self {
            units: UnitLedger::new(),
            registry: DiscreteTokenRegistry::new(),
            bank: ReclaimQueue::new(),
            exemptions: ExemptionRegistry::new(),
            authorization: Authorization::new(),
            admin,
        }
    }

    /// Fungible balances.
    #[must_use]
    pub fn units(&self) -> &UnitLedger {
        &self.units
    }

    /// Discrete token registry.
    #[must_use]
    pub fn registry(&self) -> &DiscreteTokenRegistry {
        &self.registry
    }

    /// Reclaim queue.
    #[must_use]
    pub fn bank(&self) -> &ReclaimQueue {
        &self.bank
    }

    /// Exemption registry.
    #[must_use]
    pub fn exemptions(&self) -> &ExemptionRegistry {
        &self.exemptions
    }

    /// Allowances, operators and nonces.
    #[must_use]
    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    /// Current administrator.
    #[must_use]
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Makes every journaled change permanent.
    pub(crate) fn commit(&mut self) {
        self.units.commit();
        self.registry.commit();
        self.bank.commit();
        self.exemptions.commit();
        self.authorization.commit();
    }

    /// Undoes every journaled change since the last commit.
    pub(crate) fn rollback(&mut self) {
        self.units.rollback();
        self.registry.rollback();
        self.bank.rollback();
        self.exemptions.rollback();
        self.authorization.rollback();
    }
}

// =============================================================================
// RECEIPT
// =============================================================================

/// What a committed call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerReceipt {
    /// Events in emission order.
    pub events: Vec<LedgerEvent>,
    /// Discrete ids reclaimed, reissued and minted by the call.
    pub discrete: ReconcileOutcome,
}

/// Values derived from the configuration once at construction.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Settings {
    pub unit: U256,
    pub max_supply: U256,
    pub sizes: BucketSizes,
    pub mode: ExemptionMode,
    pub verify_invariants: bool,
}

// =============================================================================
// LEDGER
// =============================================================================

/// The hybrid fungible/discrete ledger.
#[derive(Clone, Debug)]
pub struct HybridLedger {
    config: LedgerConfig,
    settings: Settings,
    state: LedgerState,
    genesis: Vec<LedgerEvent>,
}

impl HybridLedger {
    /// Builds a ledger from a validated configuration.
    ///
    /// If an initial mint recipient is configured it is marked exempt and
    /// credited with the whole supply cap, so no discrete ids are issued.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the configuration fails validation.
    pub fn new(config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let settings = Settings {
            unit: config.unit(),
            max_supply: config.max_total_supply(),
            sizes: config.bucket_sizes(),
            mode: config.exemption_mode,
            verify_invariants: config.verify_invariants,
        };
        let mut state = LedgerState::new(config.admin);
        let mut genesis = Vec::new();

        if let Some(recipient) = config.initial_mint_recipient {
            state.exemptions.seed(recipient);
            state
                .units
                .mint(recipient, settings.max_supply)
                .map_err(|e| ConfigError::InvalidField {
                    field: "initial_mint_recipient",
                    reason: e.to_string(),
                })?;
            state.commit();
            genesis.push(LedgerEvent::ExemptionChanged {
                account: recipient,
                exempt: true,
            });
            genesis.push(LedgerEvent::Transfer {
                from: Address::ZERO,
                to: recipient,
                amount: settings.max_supply,
            });
        }

        info!(
            name = %config.name,
            symbol = %config.symbol,
            decimals = config.decimals,
            max_units = config.max_total_supply_units,
            admin = %config.admin,
            "Hybrid ledger initialized"
        );

        Ok(Self {
            config,
            settings,
            state,
            genesis,
        })
    }

    /// Runs `op` against the live state and commits on success.
    ///
    /// A rejected call, or one that breaks an invariant when verification is
    /// on, is rolled back before returning.
    pub(crate) fn transact<F>(&mut self, op: F) -> Result<LedgerReceipt, LedgerError>
    where
        F: FnOnce(&mut Txn<'_>) -> Result<(), LedgerError>,
    {
        let settings = self.settings;
        let mut txn = Txn::begin(&mut self.state, settings);
        if let Err(e) = op(&mut txn) {
            debug!(error = %e, category = e.category(), "Ledger call rejected");
            return Err(e);
        }

        if settings.verify_invariants {
            if let InvariantCheckResult::Invalid(violations) =
                check_all_invariants(&*txn.state, settings.unit, settings.mode)
            {
                let joined = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(LedgerError::InvariantViolation(joined));
            }
        }

        Ok(txn.commit())
    }

    // ===== METADATA =====

    /// Configuration the ledger was built from.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Decimal places.
    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    /// One whole unit in base units.
    #[must_use]
    pub fn unit(&self) -> U256 {
        self.settings.unit
    }

    /// Fungible supply cap.
    #[must_use]
    pub fn max_total_supply(&self) -> U256 {
        self.settings.max_supply
    }

    /// Current administrator.
    #[must_use]
    pub fn admin(&self) -> Address {
        self.state.admin
    }

    /// Events produced while constructing the ledger.
    #[must_use]
    pub fn genesis_events(&self) -> &[LedgerEvent] {
        &self.genesis
    }

    /// Read access to every component.
    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    // ===== QUERIES =====

    /// Fungible balance.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.state.units.balance_of(account)
    }

    /// Number of discrete ids held.
    #[must_use]
    pub fn token_balance_of(&self, account: &Address) -> usize {
        self.state.registry.owned_count(account)
    }

    /// Ids held, bottom of the stack first.
    #[must_use]
    pub fn owned_tokens(&self, account: &Address) -> Vec<TokenId> {
        self.state.registry.owned(account).to_vec()
    }

    /// Holder of a discrete id.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId` outside the id space, `NotFound` when unissued or banked.
    pub fn owner_of(&self, id: U256) -> Result<Address, LedgerError> {
        self.state.registry.owner_of(id)
    }

    /// Fungible total supply.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.state.units.total_supply()
    }

    /// Number of discrete ids ever minted.
    #[must_use]
    pub fn token_total_supply(&self) -> u64 {
        self.state.registry.minted()
    }

    /// Number of banked ids.
    #[must_use]
    pub fn queue_length(&self) -> usize {
        self.state.bank.len()
    }

    /// Banked ids, next-to-reissue first.
    #[must_use]
    pub fn tokens_in_queue(&self) -> Vec<TokenId> {
        self.state.bank.iter().copied().collect()
    }

    /// Banked id at `index`.
    #[must_use]
    pub fn queue_peek(&self, index: usize) -> Option<TokenId> {
        self.state.bank.peek(index)
    }

    /// Exemption flag.
    #[must_use]
    pub fn is_exempt(&self, account: &Address) -> bool {
        self.state.exemptions.is_exempt(account)
    }

    /// Remaining fungible allowance.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.state.authorization.allowance(owner, spender)
    }

    /// Approved address of a discrete id.
    ///
    /// # Errors
    ///
    /// Same as [`Self::owner_of`].
    pub fn get_approved(&self, id: U256) -> Result<Option<Address>, LedgerError> {
        self.state.registry.get_approved(id)
    }

    /// Blanket operator approval.
    #[must_use]
    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.state.authorization.is_operator(owner, operator)
    }

    /// Current permit nonce.
    #[must_use]
    pub fn nonces(&self, owner: &Address) -> U256 {
        self.state.authorization.nonce(owner)
    }

    /// Runs every invariant check against the committed state.
    #[must_use]
    pub fn check_invariants(&self) -> InvariantCheckResult {
        check_all_invariants(&self.state, self.settings.unit, self.settings.mode)
    }
}

// =============================================================================
// TEST SUPPORT
// =============================================================================

/// Ledger used across unit tests: 3 decimals, 10 whole units, admin 0x11..
#[cfg(test)]
pub(crate) fn test_ledger() -> HybridLedger {
    let mut config = LedgerConfig::with_admin(Address::repeat_byte(0x11));
    config.decimals = 3;
    config.max_total_supply_units = 10;
    config.verify_invariants = true;
    HybridLedger::new(config).unwrap()
}
