//! # Exemption Registry
//!
//! Accounts for which discrete issuance and reclamation are suppressed.
//! Exempt accounts may hold any fungible balance but own no discrete tokens.

use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How toggling an account's exemption treats its existing holdings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionMode {
    /// Only the flag flips; existing holdings are left untouched.
    #[default]
    NonRetroactive,
    /// Becoming exempt banks every owned token; becoming non-exempt issues
    /// one token per whole unit held.
    Reconcile,
}

impl ExemptionMode {
    /// Parses `non_retroactive` / `reconcile` (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "non_retroactive" | "non-retroactive" => Some(Self::NonRetroactive),
            "reconcile" => Some(Self::Reconcile),
            _ => None,
        }
    }
}

/// Set of exempt accounts.
#[derive(Clone, Debug, Default)]
pub struct ExemptionRegistry {
    exempt: HashSet<Address>,
    /// Accounts whose flag changed after construction.
    toggled: HashSet<Address>,
    /// (account, was exempt, was toggled) per `set` since the last commit.
    journal: Vec<(Address, bool, bool)>,
}

impl ExemptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `account` is exempt.
    #[must_use]
    pub fn is_exempt(&self, account: &Address) -> bool {
        self.exempt.contains(account)
    }

    /// True if `account` changed status after construction.
    #[must_use]
    pub fn was_toggled(&self, account: &Address) -> bool {
        self.toggled.contains(account)
    }

    /// Exempt accounts.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.exempt.iter()
    }

    /// Marks `account` exempt at construction time.
    pub(crate) fn seed(&mut self, account: Address) {
        self.exempt.insert(account);
    }

    /// Sets the flag; returns true if it changed.
    pub(crate) fn set(&mut self, account: Address, exempt: bool) -> bool {
        let was_exempt = self.exempt.contains(&account);
        let was_toggled = self.toggled.contains(&account);
        self.journal.push((account, was_exempt, was_toggled));
        let changed = if exempt {
            self.exempt.insert(account)
        } else {
            self.exempt.remove(&account)
        };
        if changed {
            self.toggled.insert(account);
        }
        changed
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    pub(crate) fn rollback(&mut self) {
        while let Some((account, exempt, toggled)) = self.journal.pop() {
            restore(&mut self.exempt, account, exempt);
            restore(&mut self.toggled, account, toggled);
        }
    }
}

fn restore(set: &mut HashSet<Address>, account: Address, present: bool) {
    if present {
        set.insert(account);
    } else {
        set.remove(&account);
    }
}
