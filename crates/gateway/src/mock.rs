//! An in-memory, fault-injectable [`ParticipantGateway`], used by this
//! crate's own tests and by the `coordinator`/`workflow` test suites to drive
//! every scenario in the commit/rollback/resolve contract without a real
//! shard fleet.

use crate::gateway::{ParticipantGateway, QueryService};
use crate::metadata::{TransactionMetadata, TransactionState};
use crate::target::{TabletAlias, Target};
use crate::Error;
use fanout::Context;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One recorded RPC, for assertions on call order and fan-out shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Commit(Target, i64),
    Rollback(Target, i64),
    Prepare(Target, i64, String),
    StartCommit(Target, i64, String),
    SetRollback(Target, String, i64),
    CreateTransaction(Target, String, Vec<Target>),
    CommitPrepared(Target, String),
    RollbackPrepared(Target, String, i64),
    ReadTransaction(Target, String),
    ConcludeTransaction(Target, String),
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Times(u32),
    Always,
}

#[derive(Default)]
struct Inner {
    next_transaction_id: i64,
    metadata: HashMap<String, TransactionMetadata>,
    calls: Vec<Call>,
    faults: HashMap<(&'static str, Target), Fault>,
}

/// A fake shard fleet, entirely in memory.
///
/// Clone is cheap: it shares the same underlying state, the same way a real
/// gateway's clones all talk to the same tablets.
#[derive(Clone, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<Inner>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a shard assigning a fresh transaction id to a first
    /// statement, the way a real tablet would at `BeginExecute` time.
    pub fn open_transaction(&self) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_transaction_id += 1;
        inner.next_transaction_id
    }

    /// Makes the next `count` calls to `method` against `target` fail.
    pub fn fail_next(&self, method: &'static str, target: Target, count: u32) {
        self.inner
            .lock()
            .unwrap()
            .faults
            .insert((method, target), Fault::Times(count));
    }

    /// Makes every future call to `method` against `target` fail.
    pub fn fail_always(&self, method: &'static str, target: Target) {
        self.inner
            .lock()
            .unwrap()
            .faults
            .insert((method, target), Fault::Always);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn metadata_for(&self, dtid: &str) -> Option<TransactionMetadata> {
        self.inner.lock().unwrap().metadata.get(dtid).cloned()
    }

    /// Seeds a metadata record directly, for tests that start mid-protocol
    /// (e.g. exercising `resolve` against an already-PREPARE'd transaction).
    pub fn seed_metadata(&self, metadata: TransactionMetadata) {
        self.inner
            .lock()
            .unwrap()
            .metadata
            .insert(metadata.dtid.clone(), metadata);
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn maybe_fail(&self, method: &'static str, target: &Target) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        let Some(fault) = inner.faults.get_mut(&(method, target.clone())) else {
            return Ok(());
        };
        let should_fail = match fault {
            Fault::Always => true,
            Fault::Times(remaining) => {
                if *remaining == 0 {
                    false
                } else {
                    *remaining -= 1;
                    true
                }
            }
        };
        if should_fail {
            Err(Error::rpc(
                target.clone(),
                InjectedFault {
                    method,
                    target: target.clone(),
                },
            ))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("injected fault: {method} against {target}")]
struct InjectedFault {
    method: &'static str,
    target: Target,
}

#[async_trait::async_trait]
impl QueryService for MockGateway {
    async fn commit(&self, _ctx: Context, target: &Target, transaction_id: i64) -> Result<(), Error> {
        self.maybe_fail("commit", target)?;
        self.record(Call::Commit(target.clone(), transaction_id));
        Ok(())
    }

    async fn rollback(&self, _ctx: Context, target: &Target, transaction_id: i64) -> Result<(), Error> {
        self.maybe_fail("rollback", target)?;
        self.record(Call::Rollback(target.clone(), transaction_id));
        Ok(())
    }

    async fn prepare(
        &self,
        _ctx: Context,
        target: &Target,
        transaction_id: i64,
        dtid: &str,
    ) -> Result<(), Error> {
        self.maybe_fail("prepare", target)?;
        self.record(Call::Prepare(target.clone(), transaction_id, dtid.to_string()));
        Ok(())
    }

    async fn start_commit(
        &self,
        _ctx: Context,
        target: &Target,
        transaction_id: i64,
        dtid: &str,
    ) -> Result<(), Error> {
        self.maybe_fail("start_commit", target)?;
        self.record(Call::StartCommit(
            target.clone(),
            transaction_id,
            dtid.to_string(),
        ));
        let mut inner = self.inner.lock().unwrap();
        if let Some(metadata) = inner.metadata.get_mut(dtid) {
            metadata.state = TransactionState::Commit;
        }
        Ok(())
    }

    async fn set_rollback(
        &self,
        _ctx: Context,
        target: &Target,
        dtid: &str,
        transaction_id: i64,
    ) -> Result<(), Error> {
        self.maybe_fail("set_rollback", target)?;
        self.record(Call::SetRollback(target.clone(), dtid.to_string(), transaction_id));
        let mut inner = self.inner.lock().unwrap();
        if let Some(metadata) = inner.metadata.get_mut(dtid) {
            metadata.state = TransactionState::Rollback;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ParticipantGateway for MockGateway {
    async fn query_service_by_alias(
        &self,
        _ctx: Context,
        _target: &Target,
        _alias: Option<&TabletAlias>,
    ) -> Result<Arc<dyn QueryService>, Error> {
        Ok(Arc::new(self.clone()))
    }

    async fn create_transaction(
        &self,
        _ctx: Context,
        target: &Target,
        dtid: &str,
        participants: &[Target],
    ) -> Result<(), Error> {
        self.maybe_fail("create_transaction", target)?;
        self.record(Call::CreateTransaction(
            target.clone(),
            dtid.to_string(),
            participants.to_vec(),
        ));
        self.inner.lock().unwrap().metadata.insert(
            dtid.to_string(),
            TransactionMetadata {
                dtid: dtid.to_string(),
                state: TransactionState::Prepare,
                participants: participants.to_vec(),
            },
        );
        Ok(())
    }

    async fn commit_prepared(&self, _ctx: Context, target: &Target, dtid: &str) -> Result<(), Error> {
        self.maybe_fail("commit_prepared", target)?;
        self.record(Call::CommitPrepared(target.clone(), dtid.to_string()));
        Ok(())
    }

    async fn rollback_prepared(
        &self,
        _ctx: Context,
        target: &Target,
        dtid: &str,
        original_transaction_id: i64,
    ) -> Result<(), Error> {
        self.maybe_fail("rollback_prepared", target)?;
        self.record(Call::RollbackPrepared(
            target.clone(),
            dtid.to_string(),
            original_transaction_id,
        ));
        Ok(())
    }

    async fn read_transaction(
        &self,
        _ctx: Context,
        target: &Target,
        dtid: &str,
    ) -> Result<Option<TransactionMetadata>, Error> {
        self.maybe_fail("read_transaction", target)?;
        self.record(Call::ReadTransaction(target.clone(), dtid.to_string()));
        Ok(self.inner.lock().unwrap().metadata.get(dtid).cloned())
    }

    async fn conclude_transaction(&self, _ctx: Context, target: &Target, dtid: &str) -> Result<(), Error> {
        self.maybe_fail("conclude_transaction", target)?;
        self.record(Call::ConcludeTransaction(target.clone(), dtid.to_string()));
        self.inner.lock().unwrap().metadata.remove(dtid);
        Ok(())
    }
}
