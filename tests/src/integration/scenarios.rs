//! # Ledger Scenarios
//!
//! Walkthroughs of the documented ledger behaviour on a single
//! `HybridLedger`:
//!
//! 1. **Fractional round trip**: a 0.1 unit payment banks the sender's top id
//!    and the return payment reissues the same id
//! 2. **Allowance**: an allowance of exactly 1200 is fully consumed
//! 3. **Operators**: discrete transfers need holder, approval or operator rights
//! 4. **Exempt genesis**: the initial recipient holds the cap with no ids

#[cfg(test)]
mod tests {
    use crate::support::*;
    use hybrid_ledger::prelude::*;

    fn unit18() -> U256 {
        U256::exp10(18)
    }

    // =============================================================================
    // FRACTIONAL ROUND TRIP
    // =============================================================================

    #[test]
    fn test_literal_ten_unit_scenario() {
        let mut ledger = HybridLedger::new(literal_config()).unwrap();

        ledger
            .mint_fungible(admin(), alice(), unit18() * 10)
            .unwrap();
        assert_eq!(ledger.token_total_supply(), 10);
        assert_eq!(
            ledger.owned_tokens(&alice()),
            (1..=10).map(TokenId::from_sequence).collect::<Vec<_>>()
        );
        assert_eq!(ledger.queue_length(), 0);

        let tenth = unit18() / 10;
        ledger.transfer(alice(), bob(), tenth).unwrap();
        assert_eq!(ledger.token_balance_of(&alice()), 9);
        assert_eq!(ledger.token_balance_of(&bob()), 0);
        assert_eq!(ledger.queue_length(), 1);
        assert_eq!(ledger.tokens_in_queue(), vec![TokenId::from_sequence(10)]);
        assert_eq!(
            ledger.owner_of(ID_PREFIX + 10),
            Err(LedgerError::NotFound(ID_PREFIX + 10))
        );

        ledger.transfer(bob(), alice(), tenth).unwrap();
        assert_eq!(ledger.queue_length(), 0);
        assert_eq!(ledger.token_balance_of(&alice()), 10);
        assert_eq!(ledger.owner_of(ID_PREFIX + 10).unwrap(), alice());
        assert_eq!(ledger.token_total_supply(), 10);
        assert!(ledger.check_invariants().is_valid());
    }

    #[test]
    fn test_whole_unit_round_trip_returns_same_id() {
        let mut ledger = HybridLedger::new(literal_config()).unwrap();
        ledger.mint_fungible(admin(), alice(), unit18() * 3).unwrap();

        ledger.transfer(alice(), bob(), unit18()).unwrap();
        assert_eq!(ledger.owned_tokens(&bob()), vec![TokenId::from_sequence(3)]);

        ledger.transfer(bob(), alice(), unit18()).unwrap();
        assert_eq!(
            ledger.owned_tokens(&alice()),
            (1..=3).map(TokenId::from_sequence).collect::<Vec<_>>()
        );
        assert_eq!(ledger.queue_length(), 0);
    }

    #[test]
    fn test_surrender_takes_most_recent_ids_first() {
        let mut ledger = HybridLedger::new(literal_config()).unwrap();
        ledger.mint_fungible(admin(), alice(), unit18() * 5).unwrap();
        ledger.set_exempt(admin(), bob(), true).unwrap();

        let receipt = ledger.transfer(alice(), bob(), unit18() * 3).unwrap();
        let expected: Vec<_> = [5, 4, 3].into_iter().map(TokenId::from_sequence).collect();
        assert_eq!(receipt.discrete.reclaimed, expected);
        assert_eq!(ledger.tokens_in_queue(), expected);
        assert_eq!(ledger.token_balance_of(&bob()), 0);
    }

    #[test]
    fn test_surrender_order_survives_specific_transfers() {
        let mut ledger = HybridLedger::new(literal_config()).unwrap();
        ledger.mint_fungible(admin(), alice(), unit18() * 5).unwrap();
        ledger.set_exempt(admin(), bob(), true).unwrap();

        ledger.transfer_token(alice(), ID_PREFIX + 2, carol()).unwrap();
        ledger.transfer_token(alice(), ID_PREFIX + 4, carol()).unwrap();
        // A received id lands on top of the stack.
        ledger.transfer_token(carol(), ID_PREFIX + 2, alice()).unwrap();
        let held: Vec<_> = [1, 3, 5, 2].into_iter().map(TokenId::from_sequence).collect();
        assert_eq!(ledger.owned_tokens(&alice()), held);

        let receipt = ledger.transfer(alice(), bob(), unit18() * 2).unwrap();
        let expected: Vec<_> = [2, 5].into_iter().map(TokenId::from_sequence).collect();
        assert_eq!(receipt.discrete.reclaimed, expected);
        assert_eq!(
            ledger.owned_tokens(&alice()),
            vec![TokenId::from_sequence(1), TokenId::from_sequence(3)]
        );
        assert!(ledger.check_invariants().is_valid());
    }

    #[test]
    fn test_owner_of_boundaries() {
        let mut ledger = HybridLedger::new(literal_config()).unwrap();
        ledger.mint_fungible(admin(), alice(), unit18() * 2).unwrap();

        assert_eq!(
            ledger.owner_of(ID_PREFIX),
            Err(LedgerError::InvalidTokenId(ID_PREFIX))
        );
        assert_eq!(
            ledger.owner_of(ID_PREFIX + 3),
            Err(LedgerError::NotFound(ID_PREFIX + 3))
        );
        assert_eq!(
            ledger.owner_of(U256::MAX),
            Err(LedgerError::InvalidTokenId(U256::MAX))
        );
        assert_eq!(ledger.owner_of(ID_PREFIX + 2).unwrap(), alice());
    }

    // =============================================================================
    // ALLOWANCE
    // =============================================================================

    #[test]
    fn test_allowance_of_1200_is_fully_consumed() {
        let mut ledger = small_ledger(10);
        ledger.mint_fungible(admin(), alice(), units(2)).unwrap();
        ledger.approve(alice(), bob(), U256::from(1200u64)).unwrap();

        ledger
            .transfer_from(bob(), alice(), carol(), U256::from(1200u64))
            .unwrap();
        assert_eq!(ledger.allowance(&alice(), &bob()), U256::zero());
        assert_eq!(ledger.balance_of(&carol()), U256::from(1200u64));
        assert_eq!(ledger.token_balance_of(&carol()), 1);

        let before = observe(&ledger, &[alice(), bob(), carol()]);
        assert_eq!(
            ledger.transfer_from(bob(), alice(), carol(), U256::one()),
            Err(LedgerError::InsufficientAllowance {
                required: U256::one(),
                available: U256::zero(),
            })
        );
        assert_eq!(observe(&ledger, &[alice(), bob(), carol()]), before);
    }

    // =============================================================================
    // OPERATORS
    // =============================================================================

    #[test]
    fn test_operator_approval_unlocks_discrete_transfer() {
        let mut ledger = small_ledger(10);
        ledger.mint_fungible(admin(), alice(), units(2)).unwrap();
        let id = ID_PREFIX + 1;

        assert_eq!(
            ledger.transfer_token_from(carol(), alice(), bob(), id),
            Err(LedgerError::InvalidOperator { caller: carol() })
        );

        ledger.set_approval_for_all(alice(), carol(), true).unwrap();
        assert!(ledger.is_approved_for_all(&alice(), &carol()));
        ledger.transfer_token_from(carol(), alice(), bob(), id).unwrap();

        assert_eq!(ledger.owner_of(id).unwrap(), bob());
        assert_eq!(ledger.balance_of(&bob()), units(1));
        assert_eq!(ledger.balance_of(&alice()), units(1));
        assert_eq!(ledger.owned_tokens(&alice()), vec![TokenId::from_sequence(2)]);
    }

    #[test]
    fn test_single_token_approval_is_cleared_by_transfer() {
        let mut ledger = small_ledger(10);
        ledger.mint_fungible(admin(), alice(), units(1)).unwrap();
        let id = ID_PREFIX + 1;

        ledger.approve_token(alice(), carol(), id).unwrap();
        assert_eq!(ledger.get_approved(id).unwrap(), Some(carol()));

        ledger.transfer_token_from(carol(), alice(), bob(), id).unwrap();
        assert_eq!(ledger.get_approved(id).unwrap(), None);
        assert_eq!(
            ledger.transfer_token_from(carol(), bob(), alice(), id),
            Err(LedgerError::InvalidOperator { caller: carol() })
        );
    }

    // =============================================================================
    // EXEMPTIONS
    // =============================================================================

    #[test]
    fn test_exempt_initial_recipient_holds_cap_without_tokens() {
        let mut config = small_config(50);
        config.initial_mint_recipient = Some(alice());
        let mut ledger = HybridLedger::new(config).unwrap();

        assert!(ledger.is_exempt(&alice()));
        assert_eq!(ledger.balance_of(&alice()), units(50));
        assert_eq!(ledger.total_supply(), units(50));
        assert_eq!(ledger.token_balance_of(&alice()), 0);
        assert_eq!(ledger.token_total_supply(), 0);

        // Distribution out of the exempt holder mints fresh ids for recipients.
        ledger.transfer(alice(), bob(), units(3)).unwrap();
        assert_eq!(ledger.token_balance_of(&bob()), 3);
        assert_eq!(ledger.token_total_supply(), 3);
        assert!(ledger.check_invariants().is_valid());
    }

    #[test]
    fn test_exempt_recipient_never_receives_tokens() {
        let mut ledger = small_ledger(10);
        ledger.mint_fungible(admin(), alice(), units(4)).unwrap();
        ledger.set_self_exempt(bob(), true).unwrap();

        ledger.transfer(alice(), bob(), units(2)).unwrap();
        assert_eq!(ledger.balance_of(&bob()), units(2));
        assert_eq!(ledger.token_balance_of(&bob()), 0);
        assert_eq!(ledger.queue_length(), 2);

        assert_eq!(
            ledger.transfer_token(alice(), ID_PREFIX + 1, bob()),
            Err(LedgerError::RecipientExempt(bob()))
        );
    }
}
