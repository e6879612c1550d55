//! # Concurrency and Shutdown Behavior
//!
//! Races the organizer from many tasks at once: contested outputs must
//! admit exactly one winner, every submission must resolve to exactly one
//! verdict, reorganization must overtake queued commits, and shutdown must
//! fail queued work fast without touching state.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chain_types::{OutPoint, Transaction, TxInput, TxOutput};
    use tokio::time::timeout;
    use tx_organizer::adapters::InMemoryChain;
    use tx_organizer::ports::ChainQuery;
    use tx_organizer::{
        AdmissionConfig, Priority, PrioritizedMutex, RejectReason, TransactionOrganizer, Verdict,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn funded_chain(outputs: u32) -> Arc<InMemoryChain> {
        crate::init_tracing();
        let chain = Arc::new(InMemoryChain::new(500));
        for index in 0..outputs {
            chain.fund(OutPoint::new([0xF0; 32], index), 50_000);
        }
        chain
    }

    fn spend_index(index: u32, fee: u64) -> Arc<Transaction> {
        Arc::new(Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_output: OutPoint::new([0xF0; 32], index),
                script_sig: vec![0x01, 0x02],
                sequence: u32::MAX,
            }],
            outputs: vec![TxOutput::new(50_000 - fee, vec![0x51])],
            lock_time: 0,
        })
    }

    // =========================================================================
    // CONTESTED OUTPUTS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contested_output_admits_exactly_one_winner() {
        let service = Arc::new(TransactionOrganizer::new(
            AdmissionConfig::for_testing(),
            funded_chain(1),
        ));
        service.start();

        // Eight rival spends of the same output, raced from eight tasks.
        let mut handles = Vec::new();
        for variant in 0..8u64 {
            let service = Arc::clone(&service);
            let rival = spend_index(0, 5_000 + variant);
            handles.push(tokio::spawn(async move {
                service.organize_and_wait(rival).await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            let verdict = handle.await.unwrap();
            match verdict {
                Verdict::Passed => admitted += 1,
                Verdict::Rejected(RejectReason::Conflict { .. }) => {}
                other => panic!("unexpected verdict for rival spend: {other:?}"),
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(service.pool_status().await.entry_count, 1);
        service.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_independent_submissions_all_admitted() {
        let count = 32u32;
        let chain = funded_chain(count);
        let service = Arc::new(TransactionOrganizer::new(
            AdmissionConfig::for_testing(),
            Arc::clone(&chain) as Arc<dyn ChainQuery>,
        ));
        service.start();

        let mut handles = Vec::new();
        for index in 0..count {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.organize_and_wait(spend_index(index, 10_000)).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_passed());
        }

        assert_eq!(service.pool_status().await.entry_count, count as usize);
        assert_eq!(chain.appended().len(), count as usize);
        service.stop().await;
    }

    // =========================================================================
    // EXACTLY-ONE VERDICT PER SUBMISSION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_submission_resolves() {
        let service = Arc::new(TransactionOrganizer::new(
            AdmissionConfig::for_testing(),
            funded_chain(16),
        ));
        service.start();

        let mut receivers = Vec::new();
        for index in 0..16 {
            receivers.push(service.organize(spend_index(index, 10_000)).await);
        }

        for receiver in receivers {
            let verdict = timeout(Duration::from_secs(5), receiver)
                .await
                .expect("verdict must arrive")
                .expect("verdict channel must not drop");
            assert!(verdict.is_passed());
        }
        service.stop().await;
    }

    // =========================================================================
    // SHUTDOWN
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stop_resolves_in_flight_submissions() {
        let chain = funded_chain(64);
        let service = Arc::new(TransactionOrganizer::new(
            AdmissionConfig::for_testing(),
            Arc::clone(&chain) as Arc<dyn ChainQuery>,
        ));
        service.start();

        let mut receivers = Vec::new();
        for index in 0..64 {
            receivers.push(service.organize(spend_index(index, 10_000)).await);
        }
        service.stop().await;

        // Every receiver resolves: admitted before the stop took effect, or
        // failed fast as stopped. Nothing hangs, nothing is half-applied.
        let mut admitted = 0;
        for receiver in receivers {
            match timeout(Duration::from_secs(5), receiver)
                .await
                .expect("verdict must arrive")
                .expect("verdict channel must not drop")
            {
                Verdict::Passed => admitted += 1,
                Verdict::Rejected(RejectReason::ServiceStopped) => {}
                other => panic!("unexpected shutdown verdict: {other:?}"),
            }
        }

        assert_eq!(service.pool_status().await.entry_count, admitted);
        assert_eq!(chain.appended().len(), admitted);
    }

    #[tokio::test]
    async fn test_submissions_after_stop_mutate_nothing() {
        let chain = funded_chain(4);
        let service = TransactionOrganizer::new(AdmissionConfig::for_testing(), Arc::clone(&chain) as Arc<dyn ChainQuery>);
        service.start();
        service.stop().await;

        for index in 0..4 {
            let verdict = service.organize_and_wait(spend_index(index, 10_000)).await;
            assert_eq!(verdict.reason(), Some(&RejectReason::ServiceStopped));
        }
        assert_eq!(service.pool_status().await.entry_count, 0);
        assert!(chain.appended().is_empty());
    }

    // =========================================================================
    // ARBITRATION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reorganization_completes_while_commits_queue() {
        let service = Arc::new(TransactionOrganizer::new(
            AdmissionConfig::for_testing(),
            funded_chain(32),
        ));
        service.start();

        // A steady stream of commits competing for the protected region.
        let submitter = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for index in 0..32 {
                    let _ = service.organize_and_wait(spend_index(index, 10_000)).await;
                }
            })
        };

        // Reorganization handling must get through promptly regardless of
        // the commit queue.
        let block_tx = spend_index(0, 12_000);
        let reorg = timeout(
            Duration::from_secs(5),
            service.handle_reorganization(&[block_tx], 2),
        )
        .await;
        assert!(reorg.is_ok(), "high-class entry starved by commit queue");

        submitter.await.unwrap();

        // Whatever else happened, output 0 has at most one claimant and it
        // is not one swept by the block.
        let status = service.pool_status().await;
        assert!(status.entry_count <= 32);
        service.stop().await;
    }

    #[tokio::test]
    async fn test_prioritized_mutex_is_exclusive_across_classes() {
        let arbiter = PrioritizedMutex::new();

        let guard = arbiter.acquire(Priority::Low).await;
        let contender = {
            let arbiter = arbiter.clone();
            tokio::spawn(async move {
                arbiter.acquire(Priority::High).await;
            })
        };

        // The high-class contender cannot enter while the low-class guard
        // is held.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender must enter after release")
            .unwrap();
    }
}
