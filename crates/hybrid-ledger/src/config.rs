//! # Ledger Configuration
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `LEDGER_*` environment overrides. `validate()` runs before a ledger
//! is constructed.
//!
//! ## Config File Format
//!
//! ```toml
//! [ledger]
//! name = "Hybrid"
//! symbol = "HYB"
//! decimals = 18
//! max_total_supply_units = 10000
//! admin = "0x1111111111111111111111111111111111111111"
//! initial_mint_recipient = "0x1111111111111111111111111111111111111111"
//! verify_invariants = false
//!
//! [exemption]
//! mode = "non_retroactive"
//!
//! [buckets]
//! carton_divisor = 5
//! pack_divisor = 10
//! loosie_divisor = 20
//!
//! [permit]
//! version = "1"
//! chain_id = 1
//! verifying_contract = "0x0000000000000000000000000000000000000000"
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LEDGER_NAME` | `name` |
//! | `LEDGER_SYMBOL` | `symbol` |
//! | `LEDGER_DECIMALS` | `decimals` |
//! | `LEDGER_MAX_SUPPLY_UNITS` | `max_total_supply_units` |
//! | `LEDGER_ADMIN` | `admin` |
//! | `LEDGER_INITIAL_MINT_RECIPIENT` | `initial_mint_recipient` |
//! | `LEDGER_EXEMPTION_MODE` | `exemption_mode` |
//! | `LEDGER_CHAIN_ID` | `permit.chain_id` |
//! | `LEDGER_VERIFY_INVARIANTS` | `verify_invariants` |

use crate::domain::buckets::{BucketConfig, BucketSizes};
use crate::domain::exemption::ExemptionMode;
use crate::domain::value_objects::{Address, U256};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Largest decimals value whose unit still fits in 256 bits.
pub const MAX_DECIMALS: u8 = 77;

// =============================================================================
// LEDGER CONFIG
// =============================================================================

/// EIP-712 domain parameters used by the permit collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermitDomain {
    /// Domain version string.
    pub version: String,
    /// Chain id.
    pub chain_id: u64,
    /// Address the signatures are bound to.
    pub verifying_contract: Address,
}

impl Default for PermitDomain {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            chain_id: 1,
            verifying_contract: Address::ZERO,
        }
    }
}

/// Ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Collection name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places; `unit = 10^decimals`.
    pub decimals: u8,
    /// Supply cap in whole units.
    pub max_total_supply_units: u64,
    /// Administrator allowed to mint and set exemptions.
    pub admin: Address,
    /// Receives the whole cap at construction and is marked exempt.
    pub initial_mint_recipient: Option<Address>,
    /// Effect of exemption toggles on existing holdings.
    pub exemption_mode: ExemptionMode,
    /// Bucket size divisors.
    pub buckets: BucketConfig,
    /// Run the invariant checker before every commit.
    pub verify_invariants: bool,
    /// Permit signing domain.
    pub permit: PermitDomain,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "Hybrid".to_string(),
            symbol: "HYB".to_string(),
            decimals: 18,
            max_total_supply_units: 10_000,
            admin: Address::ZERO,
            initial_mint_recipient: None,
            exemption_mode: ExemptionMode::NonRetroactive,
            buckets: BucketConfig::default(),
            verify_invariants: false,
            permit: PermitDomain::default(),
        }
    }
}

impl LedgerConfig {
    /// Default configuration administered by `admin`.
    #[must_use]
    pub fn with_admin(admin: Address) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    /// One whole unit in base units.
    #[must_use]
    pub fn unit(&self) -> U256 {
        U256::exp10(usize::from(self.decimals.min(MAX_DECIMALS)))
    }

    /// Fungible supply cap in base units.
    #[must_use]
    pub fn max_total_supply(&self) -> U256 {
        self.unit()
            .saturating_mul(U256::from(self.max_total_supply_units))
    }

    /// Bucket sizes derived from the unit.
    #[must_use]
    pub fn bucket_sizes(&self) -> BucketSizes {
        BucketSizes::derive(self.unit(), &self.buckets)
    }

    /// Checks the configuration is usable.
    ///
    /// # Errors
    ///
    /// `InvalidField` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(invalid("name", "must not be empty"));
        }
        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol", "must not be empty"));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(invalid(
                "decimals",
                format!("{} exceeds {MAX_DECIMALS}", self.decimals),
            ));
        }
        if self.max_total_supply_units == 0 {
            return Err(invalid("max_total_supply_units", "must be positive"));
        }
        if self
            .unit()
            .checked_mul(U256::from(self.max_total_supply_units))
            .is_none()
        {
            return Err(invalid("max_total_supply_units", "cap overflows 256 bits"));
        }
        if self.admin.is_zero() {
            return Err(invalid("admin", "must not be the zero address"));
        }
        if self.initial_mint_recipient.is_some_and(|r| r.is_zero()) {
            return Err(invalid(
                "initial_mint_recipient",
                "must not be the zero address",
            ));
        }
        let b = &self.buckets;
        if b.carton_divisor == 0 || b.pack_divisor == 0 || b.loosie_divisor == 0 {
            return Err(invalid("buckets", "divisors must be positive"));
        }
        if !self.bucket_sizes().is_usable() {
            return Err(invalid("buckets", "divisors leave a zero-sized bucket"));
        }
        Ok(())
    }

    // ===== LAYERED LOADING =====

    /// Defaults overridden by `LEDGER_*` environment variables.
    ///
    /// # Errors
    ///
    /// `InvalidField` if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies `LEDGER_*` environment overrides on top of `self`.
    ///
    /// # Errors
    ///
    /// `InvalidField` if a variable is set but unparseable.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// `InvalidField` if a value is present but unparseable.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("LEDGER_NAME") {
            self.name = name;
        }
        if let Some(symbol) = lookup("LEDGER_SYMBOL") {
            self.symbol = symbol;
        }
        if let Some(v) = lookup("LEDGER_DECIMALS") {
            self.decimals = v
                .parse()
                .map_err(|_| invalid("decimals", format!("not a number: {v}")))?;
        }
        if let Some(v) = lookup("LEDGER_MAX_SUPPLY_UNITS") {
            self.max_total_supply_units = v
                .parse()
                .map_err(|_| invalid("max_total_supply_units", format!("not a number: {v}")))?;
        }
        if let Some(v) = lookup("LEDGER_ADMIN") {
            self.admin = parse_address("admin", &v)?;
        }
        if let Some(v) = lookup("LEDGER_INITIAL_MINT_RECIPIENT") {
            self.initial_mint_recipient = if v.is_empty() {
                None
            } else {
                Some(parse_address("initial_mint_recipient", &v)?)
            };
        }
        if let Some(v) = lookup("LEDGER_EXEMPTION_MODE") {
            self.exemption_mode = ExemptionMode::parse(&v)
                .ok_or_else(|| invalid("exemption_mode", format!("unknown mode: {v}")))?;
        }
        if let Some(v) = lookup("LEDGER_CHAIN_ID") {
            self.permit.chain_id = v
                .parse()
                .map_err(|_| invalid("permit.chain_id", format!("not a number: {v}")))?;
        }
        if let Some(v) = lookup("LEDGER_VERIFY_INVARIANTS") {
            self.verify_invariants = v.eq_ignore_ascii_case("true") || v == "1";
        }
        Ok(self)
    }

    /// Loads a TOML file over the defaults.
    ///
    /// # Errors
    ///
    /// `Io` if unreadable, `Parse`/`InvalidField` if malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses a TOML document over the defaults.
    ///
    /// # Errors
    ///
    /// `Parse` on TOML syntax errors, `InvalidField` on bad values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        let ledger = file.ledger;
        if let Some(name) = ledger.name {
            config.name = name;
        }
        if let Some(symbol) = ledger.symbol {
            config.symbol = symbol;
        }
        config.decimals = ledger.decimals.unwrap_or(config.decimals);
        config.max_total_supply_units = ledger
            .max_total_supply_units
            .unwrap_or(config.max_total_supply_units);
        if let Some(admin) = ledger.admin {
            config.admin = parse_address("admin", &admin)?;
        }
        if let Some(recipient) = ledger.initial_mint_recipient {
            config.initial_mint_recipient =
                Some(parse_address("initial_mint_recipient", &recipient)?);
        }
        config.verify_invariants = ledger.verify_invariants.unwrap_or(false);

        if let Some(mode) = file.exemption.mode {
            config.exemption_mode = ExemptionMode::parse(&mode)
                .ok_or_else(|| invalid("exemption_mode", format!("unknown mode: {mode}")))?;
        }

        let defaults = BucketConfig::default();
        config.buckets = BucketConfig {
            carton_divisor: file.buckets.carton_divisor.unwrap_or(defaults.carton_divisor),
            pack_divisor: file.buckets.pack_divisor.unwrap_or(defaults.pack_divisor),
            loosie_divisor: file.buckets.loosie_divisor.unwrap_or(defaults.loosie_divisor),
        };

        if let Some(version) = file.permit.version {
            config.permit.version = version;
        }
        config.permit.chain_id = file.permit.chain_id.unwrap_or(config.permit.chain_id);
        if let Some(contract) = file.permit.verifying_contract {
            config.permit.verifying_contract = parse_address("permit.verifying_contract", &contract)?;
        }

        Ok(config)
    }
}

// =============================================================================
// FILE FORMAT
// =============================================================================

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    ledger: LedgerSection,
    #[serde(default)]
    exemption: ExemptionSection,
    #[serde(default)]
    buckets: BucketSection,
    #[serde(default)]
    permit: PermitSection,
}

#[derive(Debug, Deserialize, Default)]
struct LedgerSection {
    name: Option<String>,
    symbol: Option<String>,
    decimals: Option<u8>,
    max_total_supply_units: Option<u64>,
    admin: Option<String>,
    initial_mint_recipient: Option<String>,
    verify_invariants: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ExemptionSection {
    mode: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct BucketSection {
    carton_divisor: Option<u64>,
    pack_divisor: Option<u64>,
    loosie_divisor: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct PermitSection {
    version: Option<String>,
    chain_id: Option<u64>,
    verifying_contract: Option<String>,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_hex(value).ok_or_else(|| invalid(field, format!("not a 20-byte hex address: {value}")))
}
