//! # Domain Invariants
//!
//! Runtime checks of the properties every committed ledger state satisfies:
//!
//! - Unit consistency: a non-exempt account owns exactly `balance / unit` ids.
//! - Exempt accounts own no ids.
//! - Conservation: `|bank| + Σ|owned| == minted`.
//! - Bank integrity: every banked id appears once and is in the Banked state.
//! - Stack integrity: every id on an account's stack is recorded as owned by it.
//! - Supply: balances sum to total supply.
//!
//! Under [`ExemptionMode::NonRetroactive`] an account whose exemption changed
//! after construction may legitimately hold a mismatched count, so the
//! per-account checks skip it.

use crate::domain::exemption::ExemptionMode;
use crate::domain::ledger::LedgerState;
use crate::domain::registry::TokenState;
use crate::domain::value_objects::{whole_units, Address, TokenId, U256};
use std::collections::{BTreeSet, HashSet};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Non-exempt accounts own exactly their whole-unit count.
#[must_use]
pub fn check_unit_invariant(
    state: &LedgerState,
    unit: U256,
    mode: ExemptionMode,
) -> Vec<InvariantViolation> {
    let exemptions = state.exemptions();
    let mut accounts: BTreeSet<Address> = state.units().accounts().map(|(a, _)| *a).collect();
    accounts.extend(state.registry().holders().map(|(a, _)| *a));

    accounts
        .into_iter()
        .filter(|account| !exemptions.is_exempt(account))
        .filter(|account| !skips(state, account, mode))
        .filter_map(|account| {
            let expected = whole_units(state.units().balance_of(&account), unit);
            let owned = state.registry().owned_count(&account);
            (expected != U256::from(owned)).then_some(InvariantViolation::UnitMismatch {
                account,
                expected,
                owned,
            })
        })
        .collect()
}

/// Exempt accounts own nothing.
#[must_use]
pub fn check_exempt_invariant(state: &LedgerState, mode: ExemptionMode) -> Vec<InvariantViolation> {
    state
        .exemptions()
        .iter()
        .filter(|account| !skips(state, account, mode))
        .filter_map(|account| {
            let owned = state.registry().owned_count(account);
            (owned > 0).then_some(InvariantViolation::ExemptHoldsTokens {
                account: *account,
                owned,
            })
        })
        .collect()
}

/// Every minted id is either banked or owned.
#[must_use]
pub fn check_conservation_invariant(state: &LedgerState) -> Option<InvariantViolation> {
    let banked = state.bank().len() as u64;
    let owned: u64 = state
        .registry()
        .holders()
        .map(|(_, stack)| stack.len() as u64)
        .sum();
    let minted = state.registry().minted();
    (banked + owned != minted).then_some(InvariantViolation::ConservationBroken {
        banked,
        owned,
        minted,
    })
}

/// Bank entries are unique and in the Banked state.
#[must_use]
pub fn check_bank_invariant(state: &LedgerState) -> Vec<InvariantViolation> {
    let mut seen: HashSet<TokenId> = HashSet::new();
    let mut violations = Vec::new();
    for id in state.bank().iter() {
        if !seen.insert(*id) {
            violations.push(InvariantViolation::DuplicateBankEntry { id: *id });
        }
        if state.registry().state_of(*id) != Some(TokenState::Banked) {
            violations.push(InvariantViolation::BankEntryNotBanked { id: *id });
        }
    }
    violations
}

/// Stack contents agree with the token records.
#[must_use]
pub fn check_stack_invariant(state: &LedgerState) -> Vec<InvariantViolation> {
    state
        .registry()
        .holders()
        .flat_map(|(account, stack)| {
            stack
                .as_slice()
                .iter()
                .enumerate()
                .filter(|(slot, id)| {
                    state.registry().state_of(**id) != Some(TokenState::Owned(*account))
                        || state.registry().slot_of(**id) != Some(*slot)
                })
                .map(|(_, id)| InvariantViolation::StackRecordMismatch {
                    account: *account,
                    id: *id,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Balances sum to total supply.
#[must_use]
pub fn check_supply_invariant(state: &LedgerState) -> Option<InvariantViolation> {
    let sum = state
        .units()
        .accounts()
        .try_fold(U256::zero(), |acc, (_, balance)| acc.checked_add(*balance));
    let total = state.units().total_supply();
    (sum != Some(total)).then_some(InvariantViolation::SupplyMismatch { sum, total })
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    state: &LedgerState,
    unit: U256,
    mode: ExemptionMode,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    violations.extend(check_unit_invariant(state, unit, mode));
    violations.extend(check_exempt_invariant(state, mode));
    violations.extend(check_conservation_invariant(state));
    violations.extend(check_bank_invariant(state));
    violations.extend(check_stack_invariant(state));
    violations.extend(check_supply_invariant(state));

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

fn skips(state: &LedgerState, account: &Address, mode: ExemptionMode) -> bool {
    mode == ExemptionMode::NonRetroactive && state.exemptions().was_toggled(account)
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations, empty when valid.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Owned count differs from whole units.
    UnitMismatch {
        account: Address,
        expected: U256,
        owned: usize,
    },
    /// Exempt account owns ids.
    ExemptHoldsTokens { account: Address, owned: usize },
    /// Bank plus owned ids do not add up to minted.
    ConservationBroken { banked: u64, owned: u64, minted: u64 },
    /// Id appears twice in the bank.
    DuplicateBankEntry { id: TokenId },
    /// Id in the bank is not marked banked.
    BankEntryNotBanked { id: TokenId },
    /// Id on a stack is not recorded as owned by that account.
    StackRecordMismatch { account: Address, id: TokenId },
    /// Balances do not sum to total supply (`None` if the sum overflows).
    SupplyMismatch { sum: Option<U256>, total: U256 },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnitMismatch {
                account,
                expected,
                owned,
            } => write!(f, "{account:?} owns {owned} ids, expected {expected}"),
            Self::ExemptHoldsTokens { account, owned } => {
                write!(f, "exempt {account:?} owns {owned} ids")
            }
            Self::ConservationBroken {
                banked,
                owned,
                minted,
            } => write!(f, "banked {banked} + owned {owned} != minted {minted}"),
            Self::DuplicateBankEntry { id } => write!(f, "{id:?} banked twice"),
            Self::BankEntryNotBanked { id } => write!(f, "{id:?} in bank but not banked"),
            Self::StackRecordMismatch { account, id } => {
                write!(f, "{id:?} on stack of {account:?} but recorded elsewhere")
            }
            Self::SupplyMismatch { sum, total } => match sum {
                Some(sum) => write!(f, "balances sum to {sum}, supply is {total}"),
                None => write!(f, "balances overflow, supply is {total}"),
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
