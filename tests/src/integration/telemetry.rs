//! # Telemetry Smoke Tests
//!
//! With the `metrics` feature on, service calls land in the Prometheus
//! registry exported by `ledger-telemetry`.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use hybrid_ledger::prelude::*;
    use ledger_telemetry::{
        encode_metrics, register_metrics, TelemetryConfig, LEDGER_CALLS, LEDGER_ERRORS,
        TOKENS_RECLAIMED,
    };

    #[tokio::test]
    async fn test_service_calls_are_exported() {
        // Another test in this process may have registered already.
        let _ = register_metrics();
        let service = create_service_with_config(small_config(10)).await.unwrap();
        let reclaimed_before = TOKENS_RECLAIMED.get();

        service.mint(admin(), alice(), units(2)).await.unwrap();
        service.transfer(alice(), bob(), U256::from(10u64)).await.unwrap();
        assert!(service.burn(bob(), units(1)).await.is_err());

        assert!(
            LEDGER_CALLS
                .with_label_values(&["transfer", "committed"])
                .get()
                >= 1.0
        );
        assert!(
            LEDGER_ERRORS
                .with_label_values(&["insufficient_balance"])
                .get()
                >= 1.0
        );
        assert!(TOKENS_RECLAIMED.get() >= reclaimed_before + 1.0);

        let text = encode_metrics().unwrap();
        assert!(text.contains("ledger_calls_total"));
        assert!(text.contains("ledger_reclaim_queue_depth"));
        assert!(text.contains("ledger_events_emitted_total"));
    }

    #[test]
    fn test_telemetry_config_from_lookup() {
        let config = TelemetryConfig::from_lookup(|key| match key {
            "LEDGER_SERVICE_NAME" => Some("ledger-it".to_string()),
            "LEDGER_JSON_LOGS" => Some("true".to_string()),
            "LEDGER_METRICS" => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(config.service_name, "ledger-it");
        assert!(config.json_logs);
        assert!(!config.metrics_enabled);
    }
}
