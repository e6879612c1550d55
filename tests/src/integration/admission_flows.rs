//! # End-to-End Admission Flows
//!
//! Drives the organizer through the full pipeline against an in-memory
//! chain view: admission, rejection, eviction under pressure, unconfirmed
//! parent chaining, and dry-run equivalence.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chain_types::{OutPoint, Transaction, TxInput, TxOutput};
    use tx_organizer::adapters::{AdmissionEvent, HandlerDecision, InMemoryChain};
    use tx_organizer::{AdmissionConfig, RejectReason, TransactionOrganizer};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// A chain view with one 50k output funded per seed byte.
    fn funded_chain(seeds: &[u8]) -> Arc<InMemoryChain> {
        let chain = Arc::new(InMemoryChain::new(500));
        for seed in seeds {
            chain.fund(OutPoint::new([*seed; 32], 0), 50_000);
        }
        chain
    }

    /// A standard single-input spend of the seed's funded output, leaving
    /// `fee` units unclaimed.
    fn spend(seed: u8, fee: u64) -> Arc<Transaction> {
        spend_outpoint(OutPoint::new([seed; 32], 0), fee)
    }

    fn spend_outpoint(outpoint: OutPoint, fee: u64) -> Arc<Transaction> {
        Arc::new(Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_output: outpoint,
                script_sig: vec![0x01, 0x02],
                sequence: u32::MAX,
            }],
            outputs: vec![TxOutput::new(50_000 - fee, vec![0x51])],
            lock_time: 0,
        })
    }

    fn started_organizer(
        chain: Arc<InMemoryChain>,
        config: AdmissionConfig,
    ) -> TransactionOrganizer {
        crate::init_tracing();
        let service = TransactionOrganizer::new(config, chain);
        assert!(service.start());
        service
    }

    // =========================================================================
    // FULL PIPELINE
    // =========================================================================

    #[tokio::test]
    async fn test_admission_is_visible_everywhere() {
        let chain = funded_chain(&[0x01]);
        let service = started_organizer(Arc::clone(&chain), AdmissionConfig::for_testing());
        let mut events = service.event_stream();

        let tx = spend(0x01, 10_000);
        let hash = tx.hash();
        assert!(service.organize_and_wait(tx).await.is_passed());

        // Pool status, template, snapshot, chain append, and event stream
        // all reflect the single admission.
        let status = service.pool_status().await;
        assert_eq!(status.entry_count, 1);
        assert_eq!(status.total_fees, 10_000);

        let template = service.fetch_template(usize::MAX).await;
        assert_eq!(template.transactions.len(), 1);
        assert_eq!(template.total_fees, 10_000);

        assert_eq!(service.fetch_mempool(10).await, vec![hash]);
        assert_eq!(chain.appended().len(), 1);

        match events.recv().await.unwrap() {
            AdmissionEvent::Admitted { hash: seen, .. } => assert_eq!(seen, hash),
            other => panic!("expected admission, got {other:?}"),
        }
        service.stop().await;
    }

    #[tokio::test]
    async fn test_resubmission_of_admitted_transaction_is_conflict() {
        let service = started_organizer(funded_chain(&[0x01]), AdmissionConfig::for_testing());

        let tx = spend(0x01, 10_000);
        assert!(service.organize_and_wait(Arc::clone(&tx)).await.is_passed());
        let verdict = service.organize_and_wait(tx).await;

        assert!(matches!(
            verdict.reason(),
            Some(RejectReason::Conflict { .. })
        ));
        assert_eq!(service.pool_status().await.entry_count, 1);
        service.stop().await;
    }

    // =========================================================================
    // EVICTION UNDER CAPACITY PRESSURE
    // =========================================================================

    #[tokio::test]
    async fn test_capacity_two_eviction_ladder() {
        let chain = funded_chain(&[0x01, 0x02, 0x03, 0x04]);
        let mut config = AdmissionConfig::for_testing();
        config.max_pool_size = 2;
        let service = started_organizer(chain, config);

        // Same shape, so fee order is priority order.
        let t1 = spend(0x01, 10_000);
        let t2 = spend(0x02, 5_000);
        let t3 = spend(0x03, 20_000);
        let t4 = spend(0x04, 1_000);
        let (h1, h2, h3) = (t1.hash(), t2.hash(), t3.hash());

        assert!(service.organize_and_wait(t1).await.is_passed());
        assert!(service.organize_and_wait(t2).await.is_passed());

        // Above-minimum admission evicts the current lowest.
        assert!(service.organize_and_wait(t3).await.is_passed());
        let pool = service.fetch_mempool(10).await;
        assert!(pool.contains(&h1));
        assert!(pool.contains(&h3));
        assert!(!pool.contains(&h2));

        // Below-minimum admission is refused outright.
        let verdict = service.organize_and_wait(t4).await;
        assert!(matches!(
            verdict.reason(),
            Some(RejectReason::PolicyViolation { .. })
        ));
        assert_eq!(service.pool_status().await.entry_count, 2);
        service.stop().await;
    }

    // =========================================================================
    // UNCONFIRMED PARENT CHAINS
    // =========================================================================

    #[tokio::test]
    async fn test_child_spends_unconfirmed_parent_output() {
        let service = started_organizer(funded_chain(&[0x01]), AdmissionConfig::for_testing());

        let parent = spend(0x01, 10_000);
        let parent_hash = parent.hash();
        assert!(service.organize_and_wait(parent).await.is_passed());

        // Child resolves its input value from the pooled parent.
        let child = Arc::new(Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_output: OutPoint::new(parent_hash, 0),
                script_sig: vec![0x01, 0x02],
                sequence: u32::MAX,
            }],
            outputs: vec![TxOutput::new(30_000, vec![0x51])],
            lock_time: 0,
        });
        assert!(service.organize_and_wait(child).await.is_passed());
        assert_eq!(service.pool_status().await.entry_count, 2);
        service.stop().await;
    }

    // =========================================================================
    // DRY-RUN EQUIVALENCE
    // =========================================================================

    #[tokio::test]
    async fn test_dry_run_predicts_the_submission_verdict() {
        let service = started_organizer(
            funded_chain(&[0x01, 0x02]),
            AdmissionConfig::for_testing(),
        );

        let good = spend(0x01, 10_000);
        let unknown_input = spend(0x7F, 10_000);

        // Same state, same stages, same verdicts.
        assert!(service.transaction_validate(Arc::clone(&good)).await.is_passed());
        assert!(service.organize_and_wait(good).await.is_passed());

        let dry = service.transaction_validate(Arc::clone(&unknown_input)).await;
        let wet = service.organize_and_wait(unknown_input).await;
        assert_eq!(dry, wet);
        service.stop().await;
    }

    #[tokio::test]
    async fn test_dry_run_produces_no_notifications() {
        let service = started_organizer(funded_chain(&[0x01]), AdmissionConfig::for_testing());

        let delivered = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&delivered);
        service.subscribe(Box::new(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            HandlerDecision::Keep
        }));

        service.transaction_validate(spend(0x01, 10_000)).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
        assert_eq!(service.pool_status().await.entry_count, 0);
        service.stop().await;
    }

    // =========================================================================
    // CONNECTED BLOCKS
    // =========================================================================

    #[tokio::test]
    async fn test_connected_block_confirms_and_sweeps() {
        let chain = funded_chain(&[0x01, 0x02, 0x03]);
        let service = started_organizer(chain, AdmissionConfig::for_testing());

        let confirmed = spend(0x01, 10_000);
        let stale = spend(0x02, 10_000);
        let survivor = spend(0x03, 10_000);
        let survivor_hash = survivor.hash();
        for tx in [&confirmed, &stale, &survivor] {
            assert!(service.organize_and_wait(Arc::clone(tx)).await.is_passed());
        }

        // The block carries `confirmed` itself and a rival spend of the
        // stale entry's input.
        let rival = spend(0x02, 12_000);
        let removed = service.handle_reorganization(&[confirmed, rival], 1).await;

        assert_eq!(removed.len(), 2);
        assert_eq!(service.fetch_mempool(10).await, vec![survivor_hash]);
        service.stop().await;
    }
}
