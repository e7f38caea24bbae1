//! # Bucketed Transfers Through the Service
//!
//! Carton/pack/loosie calls go through `LedgerApi`, so discrete
//! reconciliation and event publication are observed together.
//!
//! With 3 decimals the bucket sizes are carton 200, pack 20, loosie 1.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use hybrid_ledger::prelude::*;

    fn ids(raw: &[u64]) -> Vec<U256> {
        raw.iter().map(|v| U256::from(*v)).collect()
    }

    #[tokio::test]
    async fn test_bucket_sizes_follow_unit() {
        let service = create_service_with_config(small_config(10)).await.unwrap();
        let sizes = service.bucket_sizes().await;
        assert_eq!(sizes.carton, U256::from(200u64));
        assert_eq!(sizes.pack, U256::from(20u64));
        assert_eq!(sizes.loosie, U256::one());
    }

    #[tokio::test]
    async fn test_carton_transfer_crosses_unit_boundary() {
        let service = create_service_with_config(small_config(10)).await.unwrap();
        service.mint(admin(), alice(), units(3)).await.unwrap();

        let receipt = service
            .safe_transfer_from(alice(), alice(), bob(), U256::zero(), U256::one())
            .await
            .unwrap();

        assert_eq!(service.balance_of(alice()).await, U256::from(2_800u64));
        assert_eq!(service.balance_of(bob()).await, U256::from(200u64));
        assert_eq!(receipt.discrete.reclaimed, vec![TokenId::from_sequence(3)]);
        assert_eq!(service.owned_tokens(alice()).await.len(), 2);
        assert_eq!(service.queue_length().await, 1);
        assert_eq!(
            service.bucket_balance_of(alice(), U256::zero()).await.unwrap(),
            U256::from(14u64)
        );
    }

    #[tokio::test]
    async fn test_batch_transfer_by_operator() {
        let service = create_service_with_config(small_config(10)).await.unwrap();
        service.mint(admin(), alice(), U256::from(427u64)).await.unwrap();

        assert!(matches!(
            service
                .safe_batch_transfer_from(carol(), alice(), bob(), ids(&[0]), ids(&[1]))
                .await,
            Err(LedgerError::InvalidOperator { .. })
        ));

        service.set_approval_for_all(alice(), carol(), true).await.unwrap();
        let receipt = service
            .safe_batch_transfer_from(carol(), alice(), bob(), ids(&[0, 1, 2]), ids(&[1, 1, 5]))
            .await
            .unwrap();

        assert_eq!(service.balance_of(alice()).await, U256::from(202u64));
        assert_eq!(service.balance_of(bob()).await, U256::from(225u64));
        assert!(matches!(
            receipt.events.last(),
            Some(LedgerEvent::TransferBatch { operator, ids, .. })
                if *operator == carol() && ids.len() == 3
        ));
    }

    #[tokio::test]
    async fn test_rejected_batch_publishes_nothing() {
        let service = create_service_with_config(small_config(10)).await.unwrap();
        service.mint(admin(), alice(), U256::from(427u64)).await.unwrap();
        let published = service.sink().len();

        assert_eq!(
            service
                .safe_batch_transfer_from(alice(), alice(), bob(), ids(&[0, 1]), ids(&[1]))
                .await,
            Err(LedgerError::LengthMismatch { ids: 2, amounts: 1 })
        );
        // The second pair overdraws after the first one applied.
        assert!(matches!(
            service
                .safe_batch_transfer_from(alice(), alice(), bob(), ids(&[0, 0]), ids(&[2, 1]))
                .await,
            Err(LedgerError::InsufficientBalance { .. })
        ));

        assert_eq!(service.sink().len(), published);
        assert_eq!(service.balance_of(alice()).await, U256::from(427u64));
        assert_eq!(service.stats().await.calls_rejected, 2);
    }

    #[tokio::test]
    async fn test_invalid_bucket_id() {
        let service = create_service_with_config(small_config(10)).await.unwrap();
        assert_eq!(
            service.bucket_balance_of(alice(), U256::from(3u64)).await,
            Err(LedgerError::InvalidTokenId(U256::from(3u64)))
        );
    }
}
