//! # EIP-712 Permit Verifier
//!
//! Recovers the signer of a typed-data permit:
//!
//! ```text
//! digest = keccak256(0x19 0x01 || domainSeparator || hashStruct(permit))
//! ```
//!
//! The domain separator binds signatures to the ledger name, domain version,
//! chain id and verifying contract, so a permit cannot be replayed against a
//! differently configured ledger.

use crate::config::LedgerConfig;
use crate::domain::value_objects::{Address, U256};
use crate::errors::PermitError;
use crate::ports::outbound::{Permit, PermitSignature, PermitVerifier};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Type string of the EIP-712 domain.
pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Type string of the permit struct.
pub const PERMIT_TYPE: &str =
    "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// 32-byte hash.
pub type Hash = [u8; 32];

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Ethereum address of a public key.
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed marker.
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address::new(address)
}

fn word_u256(value: U256) -> Hash {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn word_address(address: &Address) -> Hash {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, PermitError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => {
            return Err(PermitError::InvalidSignature(format!(
                "invalid recovery id {v}"
            )))
        }
    };
    RecoveryId::try_from(id)
        .map_err(|_| PermitError::InvalidSignature(format!("invalid recovery id {v}")))
}

/// Permit verifier for a fixed EIP-712 domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip712PermitVerifier {
    domain_separator: Hash,
}

impl Eip712PermitVerifier {
    /// Verifier for an explicit domain.
    #[must_use]
    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: &Address) -> Self {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(&keccak256(DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&keccak256(name.as_bytes()));
        encoded.extend_from_slice(&keccak256(version.as_bytes()));
        encoded.extend_from_slice(&word_u256(U256::from(chain_id)));
        encoded.extend_from_slice(&word_address(verifying_contract));
        Self {
            domain_separator: keccak256(&encoded),
        }
    }

    /// Verifier for the domain described by a ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            &config.name,
            &config.permit.version,
            config.permit.chain_id,
            &config.permit.verifying_contract,
        )
    }

    /// Domain separator.
    #[must_use]
    pub fn domain_separator(&self) -> Hash {
        self.domain_separator
    }

    /// `hashStruct` of a permit.
    #[must_use]
    pub fn struct_hash(permit: &Permit) -> Hash {
        let mut encoded = Vec::with_capacity(6 * 32);
        encoded.extend_from_slice(&keccak256(PERMIT_TYPE.as_bytes()));
        encoded.extend_from_slice(&word_address(&permit.owner));
        encoded.extend_from_slice(&word_address(&permit.spender));
        encoded.extend_from_slice(&word_u256(permit.value));
        encoded.extend_from_slice(&word_u256(permit.nonce));
        encoded.extend_from_slice(&word_u256(U256::from(permit.deadline)));
        keccak256(&encoded)
    }

    /// Digest the owner signs.
    #[must_use]
    pub fn digest(&self, permit: &Permit) -> Hash {
        let mut encoded = Vec::with_capacity(2 + 2 * 32);
        encoded.extend_from_slice(&[0x19, 0x01]);
        encoded.extend_from_slice(&self.domain_separator);
        encoded.extend_from_slice(&Self::struct_hash(permit));
        keccak256(&encoded)
    }
}

impl PermitVerifier for Eip712PermitVerifier {
    fn recover_signer(
        &self,
        permit: &Permit,
        signature: &PermitSignature,
    ) -> Result<Address, PermitError> {
        let recovery_id = parse_recovery_id(signature.v)?;

        let mut sig_bytes = [0u8; 64];
        sig_bytes[..32].copy_from_slice(&signature.r);
        sig_bytes[32..].copy_from_slice(&signature.s);
        let sig = Signature::from_slice(&sig_bytes)
            .map_err(|e| PermitError::InvalidSignature(e.to_string()))?;

        let digest = self.digest(permit);
        let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
            .map_err(|e| PermitError::InvalidSignature(e.to_string()))?;
        Ok(address_from_pubkey(&key))
    }
}
