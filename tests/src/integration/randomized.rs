//! # Randomized Call Sequences
//!
//! Seeded `StdRng` workloads over a handful of accounts. After every call,
//! accepted or not, the full invariant checker must pass; after every
//! rejected call the observable state must be exactly what it was before.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use hybrid_ledger::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const STEPS: usize = 400;
    const ACCOUNTS: u8 = 6;

    fn pick(rng: &mut StdRng, accounts: &[Address]) -> Address {
        accounts[rng.gen_range(0..accounts.len())]
    }

    /// Up to the holder's balance plus a little, so some calls overdraw.
    fn amount_for(rng: &mut StdRng, ledger: &HybridLedger, holder: &Address) -> U256 {
        let balance = ledger.balance_of(holder).low_u64();
        U256::from(rng.gen_range(0..=balance + 50))
    }

    fn random_call(
        rng: &mut StdRng,
        ledger: &mut HybridLedger,
        accounts: &[Address],
        allow_exemptions: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        let from = pick(rng, accounts);
        let to = pick(rng, accounts);
        let amount = amount_for(rng, ledger, &from);

        match rng.gen_range(0..9) {
            0 => {
                let remaining = ledger.max_total_supply() - ledger.total_supply();
                let cap = remaining.low_u64().min(5_000);
                ledger.mint_fungible(admin(), to, U256::from(rng.gen_range(0..=cap + 10)))
            }
            1 | 2 => ledger.transfer(from, to, amount),
            3 => ledger.burn(from, amount),
            4 => {
                let held = ledger.owned_tokens(&from);
                let id = if held.is_empty() || rng.gen_bool(0.1) {
                    ID_PREFIX + rng.gen_range(0..=ledger.token_total_supply() + 1)
                } else {
                    held[rng.gen_range(0..held.len())].as_u256()
                };
                ledger.transfer_token(from, id, to)
            }
            5 => {
                let bucket = U256::from(rng.gen_range(0..=3u64));
                let count = U256::from(rng.gen_range(0..4u64));
                ledger.safe_transfer_from(from, from, to, bucket, count)
            }
            6 => {
                ledger.approve(from, to, amount)?;
                ledger.transfer_from(to, from, pick(rng, accounts), amount)
            }
            7 if allow_exemptions => {
                let exempt = !ledger.is_exempt(&from);
                ledger.set_self_exempt(from, exempt)
            }
            _ => {
                let ids = vec![U256::zero(), U256::one(), U256::from(2u64)];
                let amounts: Vec<_> = (0..3).map(|_| U256::from(rng.gen_range(0..3u64))).collect();
                ledger.safe_batch_transfer_from(from, from, to, &ids, &amounts)
            }
        }
    }

    fn run(seed: u64, mode: ExemptionMode, allow_exemptions: bool) {
        let mut config = small_config(1_000);
        config.exemption_mode = mode;
        let mut ledger = HybridLedger::new(config).unwrap();
        let accounts = accounts(ACCOUNTS);
        let mut rng = StdRng::seed_from_u64(seed);

        for account in &accounts {
            ledger.mint_fungible(admin(), *account, units(20)).unwrap();
        }

        let mut committed = 0usize;
        for step in 0..STEPS {
            let before = observe(&ledger, &accounts);
            match random_call(&mut rng, &mut ledger, &accounts, allow_exemptions) {
                Ok(_) => committed += 1,
                Err(LedgerError::InvariantViolation(detail)) => {
                    panic!("seed {seed} step {step}: commit check failed: {detail}")
                }
                Err(_) => assert_eq!(observe(&ledger, &accounts), before, "seed {seed} step {step}"),
            }
            let result = ledger.check_invariants();
            assert!(
                result.is_valid(),
                "seed {seed} step {step}: {:?}",
                result.violations()
            );
        }

        assert!(committed > STEPS / 4, "seed {seed}: only {committed} calls committed");
        let held: usize = accounts.iter().map(|a| ledger.token_balance_of(a)).sum();
        assert_eq!(
            held as u64 + ledger.queue_length() as u64,
            ledger.token_total_supply()
        );
    }

    #[test]
    fn test_random_transfers_preserve_invariants() {
        for seed in [1, 7, 42, 1_337] {
            run(seed, ExemptionMode::NonRetroactive, false);
        }
    }

    #[test]
    fn test_random_transfers_with_reconciled_exemptions() {
        for seed in [3, 11, 2_024] {
            run(seed, ExemptionMode::Reconcile, true);
        }
    }

    #[test]
    fn test_random_transfers_with_sticky_exemptions() {
        for seed in [5, 99] {
            run(seed, ExemptionMode::NonRetroactive, true);
        }
    }

    #[test]
    fn test_rejected_call_is_all_or_nothing() {
        let mut ledger = small_ledger(100);
        let accounts = accounts(3);
        ledger.mint_fungible(admin(), accounts[0], units(5)).unwrap();
        ledger.mint_fungible(admin(), accounts[1], U256::from(1_999u64)).unwrap();
        let before = observe(&ledger, &accounts);

        // The first carton moves, the second overdraws; nothing may stick.
        let result = ledger.safe_batch_transfer_from(
            accounts[0],
            accounts[0],
            accounts[2],
            &[U256::zero(), U256::zero()],
            &[U256::from(20u64), U256::from(10u64)],
        );
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(observe(&ledger, &accounts), before);

        assert!(ledger.mint_fungible(admin(), accounts[2], units(96)).is_err());
        assert_eq!(observe(&ledger, &accounts), before);
    }
}
