//! # Transaction Organizer - Admission Service
//!
//! Owns the candidate pool, the validator, the prioritized arbiter, and the
//! worker pool, and exposes the operations callers drive: submit, dry-run
//! validate, subscribe, fetch template, fetch pool snapshot, and
//! reorganization handling.
//!
//! ## Concurrency Model
//!
//! Submissions queue on a bounded channel drained by `config.workers`
//! tasks. Check, accept, and connect run against read snapshots; only the
//! commit section takes the write lock, inside the arbiter's low-class
//! protected region with a fresh connect re-check. Reorganization handling
//! enters at high class and overtakes every queued commit.

use crate::adapters::{AdmissionEvent, AdmissionEventBus, AdmissionNotifier, OutcomeHandler};
use crate::arbiter::{PrioritizedMutex, Priority};
use crate::config::AdmissionConfig;
use crate::domain::{
    BlockTemplate, CandidatePool, PoolEntry, PoolStatus, RankedEntry, RejectReason,
    TransactionValidator, Verdict,
};
use crate::ports::{ChainQuery, MiningObserver, SystemTimeSource, TimeSource};
use chain_types::{short_hash, Hash, Transaction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Pending submissions admitted to the dispatch queue before backpressure.
const JOB_QUEUE_DEPTH: usize = 256;

/// Service lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Created,
    Started,
    Stopping,
    Stopped,
}

/// One queued admission attempt.
struct AdmissionJob {
    transaction: Arc<Transaction>,
    /// False for dry-run validation: same stages, no commit, no
    /// notifications.
    commit: bool,
    done: oneshot::Sender<Verdict>,
}

/// Shared state between the service handle and its workers.
struct OrganizerCore {
    config: AdmissionConfig,
    validator: TransactionValidator,
    chain: Arc<dyn ChainQuery>,
    observer: Option<Arc<dyn MiningObserver>>,
    time: Arc<dyn TimeSource>,
    pool: RwLock<CandidatePool>,
    arbiter: PrioritizedMutex,
    notifier: AdmissionNotifier,
    bus: AdmissionEventBus,
    /// Fail-fast flag checked before every stage; set at stop so queued
    /// jobs complete with `ServiceStopped` and mutate nothing.
    stopped: AtomicBool,
}

/// The admission service.
pub struct TransactionOrganizer {
    core: Arc<OrganizerCore>,
    state: StdMutex<LifecycleState>,
    job_tx: StdMutex<Option<mpsc::Sender<AdmissionJob>>>,
    workers: StdMutex<Vec<JoinHandle<()>>>,
}

impl TransactionOrganizer {
    /// Creates a stopped organizer with the system clock and no mining
    /// observer.
    pub fn new(config: AdmissionConfig, chain: Arc<dyn ChainQuery>) -> Self {
        Self::with_collaborators(config, chain, None, Arc::new(SystemTimeSource))
    }

    /// Creates a stopped organizer with explicit collaborators.
    pub fn with_collaborators(
        config: AdmissionConfig,
        chain: Arc<dyn ChainQuery>,
        observer: Option<Arc<dyn MiningObserver>>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let pool = RwLock::new(CandidatePool::new(config.max_pool_size));
        let validator = TransactionValidator::new(config.clone());

        Self {
            core: Arc::new(OrganizerCore {
                config,
                validator,
                chain,
                observer,
                time,
                pool,
                arbiter: PrioritizedMutex::new(),
                notifier: AdmissionNotifier::new(),
                bus: AdmissionEventBus::new(),
                stopped: AtomicBool::new(true),
            }),
            state: StdMutex::new(LifecycleState::Created),
            job_tx: StdMutex::new(None),
            workers: StdMutex::new(Vec::new()),
        }
    }

    /// Starts the worker pool.
    ///
    /// Valid only from the created state; the lifecycle is one-way, so a
    /// stopped organizer is not restartable. Returns false otherwise.
    pub fn start(&self) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if *state != LifecycleState::Created {
            return false;
        }

        let (tx, rx) = mpsc::channel::<AdmissionJob>(JOB_QUEUE_DEPTH);
        let rx = Arc::new(Mutex::new(rx));
        self.core.stopped.store(false, Ordering::SeqCst);

        let worker_count = self.core.config.workers.max(1);
        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let core = Arc::clone(&self.core);
            let rx = Arc::clone(&rx);
            handles.push(tokio::spawn(worker_loop(core, rx, worker_id)));
        }

        if let Ok(mut job_tx) = self.job_tx.lock() {
            *job_tx = Some(tx);
        }
        if let Ok(mut workers) = self.workers.lock() {
            *workers = handles;
        }

        *state = LifecycleState::Started;
        info!(
            workers = worker_count,
            pool_capacity = self.core.config.max_pool_size,
            evaluator = self.core.validator.evaluator_name(),
            "transaction organizer started"
        );
        true
    }

    /// Stops the service: queued jobs complete with `ServiceStopped`,
    /// workers drain and exit, subscriptions are dropped. Returns false if
    /// not started.
    pub async fn stop(&self) -> bool {
        {
            let Ok(mut state) = self.state.lock() else {
                return false;
            };
            if *state != LifecycleState::Started {
                return false;
            }
            *state = LifecycleState::Stopping;
        }

        self.core.stopped.store(true, Ordering::SeqCst);

        // Closing the channel lets workers drain the queue and exit; the
        // stopped flag makes each drained job fail fast without touching
        // the pool.
        if let Ok(mut job_tx) = self.job_tx.lock() {
            job_tx.take();
        }

        let handles = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            let _ = handle.await;
        }

        self.core.notifier.unsubscribe_all();

        if let Ok(mut state) = self.state.lock() {
            *state = LifecycleState::Stopped;
        }
        info!("transaction organizer stopped");
        true
    }

    /// Returns true while the service accepts submissions.
    pub fn is_started(&self) -> bool {
        self.state
            .lock()
            .map(|s| *s == LifecycleState::Started)
            .unwrap_or(false)
    }

    /// Submits a transaction for admission.
    ///
    /// The returned receiver yields exactly one verdict. When the service
    /// is stopped the verdict is `ServiceStopped`, delivered without
    /// queueing.
    pub async fn organize(&self, transaction: Arc<Transaction>) -> oneshot::Receiver<Verdict> {
        self.dispatch(transaction, true).await
    }

    /// Submits and waits for the verdict.
    pub async fn organize_and_wait(&self, transaction: Arc<Transaction>) -> Verdict {
        match self.organize(transaction).await.await {
            Ok(verdict) => verdict,
            Err(_) => Verdict::Rejected(RejectReason::internal("admission worker dropped")),
        }
    }

    /// Dry-run validation: the same check / accept / connect stages against
    /// current state, with no commit, no notification, and no pool change.
    pub async fn transaction_validate(&self, transaction: Arc<Transaction>) -> Verdict {
        match self.dispatch(transaction, false).await.await {
            Ok(verdict) => verdict,
            Err(_) => Verdict::Rejected(RejectReason::internal("admission worker dropped")),
        }
    }

    async fn dispatch(
        &self,
        transaction: Arc<Transaction>,
        commit: bool,
    ) -> oneshot::Receiver<Verdict> {
        let (done, receiver) = oneshot::channel();

        if self.core.stopped.load(Ordering::SeqCst) {
            let _ = done.send(Verdict::Rejected(RejectReason::ServiceStopped));
            return receiver;
        }

        let sender = self
            .job_tx
            .lock()
            .ok()
            .and_then(|job_tx| job_tx.as_ref().cloned());
        let Some(sender) = sender else {
            let _ = done.send(Verdict::Rejected(RejectReason::ServiceStopped));
            return receiver;
        };

        let job = AdmissionJob {
            transaction,
            commit,
            done,
        };
        if let Err(err) = sender.send(job).await {
            // Channel closed between the check above and the send.
            let _ = err.0.done.send(Verdict::Rejected(RejectReason::ServiceStopped));
        }
        receiver
    }

    /// Registers an outcome handler; delivered in registration order.
    pub fn subscribe(&self, handler: OutcomeHandler) -> Uuid {
        self.core.notifier.subscribe(handler)
    }

    /// Removes an outcome handler.
    pub fn unsubscribe(&self, id: Uuid) {
        self.core.notifier.unsubscribe(id);
    }

    /// Drops every registered outcome handler. Admission continues; only
    /// callback delivery goes quiet.
    pub fn unsubscribe_all(&self) {
        self.core.notifier.unsubscribe_all();
    }

    /// Stream of admission events for broadcast-style consumers.
    pub fn event_stream(&self) -> broadcast::Receiver<AdmissionEvent> {
        self.core.bus.subscribe()
    }

    /// Fee-priority-ordered template snapshot within `max_size` bytes.
    pub async fn fetch_template(&self, max_size: usize) -> BlockTemplate {
        self.core.pool.read().await.template(max_size)
    }

    /// Up to `max_count` pool transaction identities, best first.
    pub async fn fetch_mempool(&self, max_count: usize) -> Vec<Hash> {
        self.core.pool.read().await.ranked_hashes(max_count)
    }

    /// Current pool status snapshot.
    pub async fn pool_status(&self) -> PoolStatus {
        let now = self.core.time.now();
        self.core.pool.read().await.status(now)
    }

    /// Applies a connected block (or reorganized branch) to the pool.
    ///
    /// Enters the protected region at high class, overtaking every queued
    /// commit. Entries confirmed by the block leave by identity; entries
    /// whose inputs the block consumed leave as stale double-spends.
    pub async fn handle_reorganization(
        &self,
        connected: &[Arc<Transaction>],
        depth: u32,
    ) -> Vec<PoolEntry> {
        if depth > self.core.config.max_block_reorg_depth {
            warn!(
                depth,
                limit = self.core.config.max_block_reorg_depth,
                "reorganization exceeds configured depth limit"
            );
        }

        let _guard = self.core.arbiter.acquire(Priority::High).await;
        let mut pool = self.core.pool.write().await;

        let mut removed = Vec::new();
        for tx in connected {
            if let Some(entry) = pool.remove(&tx.hash()) {
                removed.push(entry);
            }
            removed.extend(pool.remove_spent_by(tx));
        }

        info!(
            connected = connected.len(),
            removed = removed.len(),
            remaining = pool.len(),
            height = self.core.chain.current_height(),
            "applied connected transactions to pool"
        );
        removed
    }
}

/// Drains the job queue until the channel closes.
async fn worker_loop(
    core: Arc<OrganizerCore>,
    rx: Arc<Mutex<mpsc::Receiver<AdmissionJob>>>,
    worker_id: usize,
) {
    debug!(worker_id, "admission worker started");
    loop {
        let job = {
            let mut rx = rx.lock().await;
            rx.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let (verdict, entry) = if core.stopped.load(Ordering::SeqCst) {
            (Verdict::Rejected(RejectReason::ServiceStopped), None)
        } else {
            run_pipeline(&core, &job.transaction, job.commit).await
        };

        // Dry-runs and fail-fast rejections produce no observable side
        // effects.
        let stopped = matches!(verdict.reason(), Some(RejectReason::ServiceStopped));
        if job.commit && !stopped {
            publish_outcome(&core, &verdict, &job.transaction, entry.as_ref());
        }

        let _ = job.done.send(verdict);
    }
    debug!(worker_id, "admission worker exited");
}

/// The admission pipeline: check, accept, connect, and (for submissions)
/// the protected commit.
#[instrument(skip_all, fields(tx = %short_hash(&transaction.hash())))]
async fn run_pipeline(
    core: &OrganizerCore,
    transaction: &Arc<Transaction>,
    commit: bool,
) -> (Verdict, Option<PoolEntry>) {
    // Check: structural, no snapshots needed.
    let verdict = core.validator.check(transaction);
    if !verdict.is_passed() {
        return (verdict, None);
    }

    // Accept and connect run against read snapshots; results are advisory
    // until the commit section re-checks.
    let fee = {
        let pool = core.pool.read().await;

        let verdict = core.validator.accept(transaction, core.chain.as_ref(), &pool);
        if !verdict.is_passed() {
            return (verdict, None);
        }

        let fee = match core.validator.price(transaction, core.chain.as_ref(), &pool) {
            Ok(fee) => fee,
            Err(reason) => return (Verdict::Rejected(reason), None),
        };

        let verdict = core.validator.connect(transaction, core.chain.as_ref(), &pool);
        if !verdict.is_passed() {
            return (verdict, None);
        }
        fee
    };

    if !commit {
        return (Verdict::Passed, None);
    }

    commit_entry(core, transaction, fee).await
}

/// The commit section: low-class protected region, fresh connect re-check
/// atomic with insertion.
async fn commit_entry(
    core: &OrganizerCore,
    transaction: &Arc<Transaction>,
    fee: u64,
) -> (Verdict, Option<PoolEntry>) {
    let _guard = core.arbiter.acquire(Priority::Low).await;

    if core.stopped.load(Ordering::SeqCst) {
        return (Verdict::Rejected(RejectReason::ServiceStopped), None);
    }

    let mut pool = core.pool.write().await;

    // State may have moved since the unprotected stages ran.
    let verdict = core.validator.connect(transaction, core.chain.as_ref(), &pool);
    if !verdict.is_passed() {
        return (verdict, None);
    }

    let entry = PoolEntry::new(Arc::clone(transaction), fee, core.time.now());
    let hash = match pool.insert(entry) {
        Ok(hash) => hash,
        Err(reason) => return (Verdict::Rejected(reason), None),
    };
    let committed = pool.get(&hash).cloned();

    if let Err(err) = core.chain.append_transaction(Arc::clone(transaction)) {
        pool.remove(&hash);
        return (Verdict::Rejected(err.into()), None);
    }
    drop(pool);

    if let (Some(observer), Some(entry)) = (core.observer.as_ref(), committed.as_ref()) {
        observer.transaction_admitted(entry);
    }

    let pool_len = core.pool.read().await.len();
    debug!(fee, pool_len, "transaction committed to candidate pool");
    (Verdict::Passed, committed)
}

/// Exactly-once outcome fan-out: handlers first (registration order), then
/// the broadcast stream.
fn publish_outcome(
    core: &OrganizerCore,
    verdict: &Verdict,
    transaction: &Arc<Transaction>,
    entry: Option<&PoolEntry>,
) {
    core.notifier.notify(verdict, transaction);

    let event = match (verdict.reason(), entry) {
        (None, Some(entry)) => AdmissionEvent::Admitted {
            hash: entry.hash,
            fee: entry.fee,
            score: RankedEntry::score_of(entry.fee, entry.size),
        },
        (Some(reason), _) => AdmissionEvent::Rejected {
            hash: transaction.hash(),
            reason: reason.to_string(),
        },
        // Passed without an entry does not happen for committed jobs.
        (None, None) => return,
    };
    core.bus.publish(event);
}
