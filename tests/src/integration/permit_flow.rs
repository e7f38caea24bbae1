//! # Permit Flow
//!
//! Signed approvals submitted through `LedgerApi::permit`:
//!
//! 1. The owner signs `(owner, spender, value, nonce, deadline)` under the
//!    ledger's EIP-712 domain
//! 2. The service checks the deadline against its clock, recovers the signer
//!    and calls `approve_on_behalf` with the current nonce
//! 3. The spender moves funds with `transfer_from`

#[cfg(test)]
mod tests {
    use crate::support::*;
    use hybrid_ledger::prelude::*;

    const DEADLINE: u64 = 2_000;

    fn permit(owner: Address, value: U256, nonce: U256, deadline: u64) -> Permit {
        Permit {
            owner,
            spender: bob(),
            value,
            nonce,
            deadline,
        }
    }

    #[tokio::test]
    async fn test_signed_permit_funds_transfer_from() {
        init_test_logging();
        let config = small_config(10);
        let verifier = Eip712PermitVerifier::from_config(&config);
        let service = create_service_with_config(config).await.unwrap();
        let key = signing_key(7);
        let owner = address_of(&key);
        service.mint(admin(), owner, units(3)).await.unwrap();

        let value = U256::from(1_500u64);
        let signature = sign_permit(&verifier, &key, &permit(owner, value, U256::zero(), DEADLINE));
        let receipt = service
            .permit(owner, bob(), value, DEADLINE, signature)
            .await
            .unwrap();

        assert_eq!(
            receipt.events,
            vec![LedgerEvent::Approval {
                owner,
                spender: bob(),
                amount: value,
            }]
        );
        assert_eq!(service.nonces(owner).await, U256::one());
        assert_eq!(service.allowance(owner, bob()).await, value);

        service
            .transfer_from(bob(), owner, bob(), value)
            .await
            .unwrap();
        assert_eq!(service.owned_tokens(owner).await.len(), 1);
        assert_eq!(service.balance_of(bob()).await, value);
        assert_eq!(service.allowance(owner, bob()).await, U256::zero());
        assert_eq!(service.stats().await.permits_accepted, 1);
    }

    #[tokio::test]
    async fn test_replayed_permit_rejected() {
        let config = small_config(10);
        let verifier = Eip712PermitVerifier::from_config(&config);
        let service = create_service_with_config(config).await.unwrap();
        let key = signing_key(8);
        let owner = address_of(&key);

        let value = U256::from(100u64);
        let signature = sign_permit(&verifier, &key, &permit(owner, value, U256::zero(), DEADLINE));
        service
            .permit(owner, bob(), value, DEADLINE, signature)
            .await
            .unwrap();

        // The nonce moved on, so the same signature now recovers someone else.
        assert!(matches!(
            service.permit(owner, bob(), value, DEADLINE, signature).await,
            Err(PermitError::InvalidSigner { expected, .. }) if expected == owner
        ));
        assert_eq!(service.nonces(owner).await, U256::one());
        assert_eq!(service.stats().await.permits_rejected, 1);
    }

    #[tokio::test]
    async fn test_expired_permit_rejected() {
        let config = small_config(10);
        let verifier = Eip712PermitVerifier::from_config(&config);
        let service = create_service_with_config(config).await.unwrap();
        let key = signing_key(9);
        let owner = address_of(&key);
        let value = U256::from(100u64);
        let signature = sign_permit(&verifier, &key, &permit(owner, value, U256::zero(), DEADLINE));

        service.clock().set(DEADLINE + 1);
        assert_eq!(
            service.permit(owner, bob(), value, DEADLINE, signature).await,
            Err(PermitError::Expired {
                deadline: DEADLINE,
                now: DEADLINE + 1,
            })
        );
        assert_eq!(service.nonces(owner).await, U256::zero());
        assert_eq!(service.allowance(owner, bob()).await, U256::zero());
    }

    #[tokio::test]
    async fn test_permit_valid_until_deadline_second() {
        let config = small_config(10);
        let verifier = Eip712PermitVerifier::from_config(&config);
        let service = create_service_with_config(config).await.unwrap();
        let key = signing_key(10);
        let owner = address_of(&key);
        let value = U256::from(5u64);
        let signature = sign_permit(&verifier, &key, &permit(owner, value, U256::zero(), DEADLINE));

        service.clock().set(DEADLINE);
        service
            .permit(owner, bob(), value, DEADLINE, signature)
            .await
            .unwrap();
        assert_eq!(service.allowance(owner, bob()).await, value);
    }

    #[tokio::test]
    async fn test_permit_signed_by_wrong_key_rejected() {
        let config = small_config(10);
        let verifier = Eip712PermitVerifier::from_config(&config);
        let service = create_service_with_config(config).await.unwrap();
        let owner = address_of(&signing_key(11));
        let intruder = signing_key(12);
        let value = U256::from(100u64);
        let signature =
            sign_permit(&verifier, &intruder, &permit(owner, value, U256::zero(), DEADLINE));

        assert_eq!(
            service.permit(owner, bob(), value, DEADLINE, signature).await,
            Err(PermitError::InvalidSigner {
                expected: owner,
                recovered: address_of(&intruder),
            })
        );
        assert_eq!(service.nonces(owner).await, U256::zero());
    }

    #[tokio::test]
    async fn test_permit_for_other_chain_rejected() {
        let config = small_config(10);
        let mut foreign = config.clone();
        foreign.permit.chain_id = 5;
        let foreign_verifier = Eip712PermitVerifier::from_config(&foreign);
        let service = create_service_with_config(config).await.unwrap();
        let key = signing_key(13);
        let owner = address_of(&key);
        let value = U256::from(100u64);
        let signature = sign_permit(
            &foreign_verifier,
            &key,
            &permit(owner, value, U256::zero(), DEADLINE),
        );

        assert!(matches!(
            service.permit(owner, bob(), value, DEADLINE, signature).await,
            Err(PermitError::InvalidSigner { .. })
        ));
    }
}
