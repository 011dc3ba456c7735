use crate::metadata::TransactionMetadata;
use crate::target::{TabletAlias, Target};
use crate::Error;
use fanout::Context;
use std::sync::Arc;

/// The pinned, connection-local half of a shard's RPC surface.
///
/// These operations act on a transaction that lives in the memory of one
/// specific tablet process; every call after the one that opened the
/// transaction must land on that same tablet, which is why a [`QueryService`]
/// is always obtained by resolving a [`TabletAlias`] through
/// [`ParticipantGateway::query_service_by_alias`] rather than being looked up
/// fresh per call.
#[async_trait::async_trait]
pub trait QueryService: Send + Sync {
    async fn commit(&self, ctx: Context, target: &Target, transaction_id: i64) -> Result<(), Error>;

    async fn rollback(&self, ctx: Context, target: &Target, transaction_id: i64) -> Result<(), Error>;

    async fn prepare(
        &self,
        ctx: Context,
        target: &Target,
        transaction_id: i64,
        dtid: &str,
    ) -> Result<(), Error>;

    /// Atomically commits the manager shard's own transaction and flips the
    /// durable 2PC metadata record to `COMMIT`.
    async fn start_commit(
        &self,
        ctx: Context,
        target: &Target,
        transaction_id: i64,
        dtid: &str,
    ) -> Result<(), Error>;

    /// Durably flips the 2PC metadata record's decision to `ROLLBACK`.
    async fn set_rollback(
        &self,
        ctx: Context,
        target: &Target,
        dtid: &str,
        transaction_id: i64,
    ) -> Result<(), Error>;
}

/// The unpinned, durable half of the RPC surface plus tablet resolution.
///
/// Every method here is addressed by `Target` and, where relevant, by `dtid`
/// rather than by tablet alias: the underlying state (a prepared transaction,
/// or the 2PC metadata record itself) is durable and dtid-keyed, so any
/// tablet currently serving `target` can act on it, there is nothing to pin.
#[async_trait::async_trait]
pub trait ParticipantGateway: Send + Sync {
    /// Resolves a service for `target`, pinned to `alias` when one is given.
    ///
    /// A live `ShardSession` always carries the alias of the tablet it first
    /// opened its transaction against, and must pass it here so every
    /// follow-up RPC lands on that same physical server. Recovery has no
    /// such cached alias, only the `Target` recovered from the dtid, and
    /// passes `None`, trusting the gateway to resolve whichever tablet
    /// currently serves that target.
    async fn query_service_by_alias(
        &self,
        ctx: Context,
        target: &Target,
        alias: Option<&TabletAlias>,
    ) -> Result<Arc<dyn QueryService>, Error>;

    async fn create_transaction(
        &self,
        ctx: Context,
        target: &Target,
        dtid: &str,
        participants: &[Target],
    ) -> Result<(), Error>;

    async fn commit_prepared(&self, ctx: Context, target: &Target, dtid: &str) -> Result<(), Error>;

    async fn rollback_prepared(
        &self,
        ctx: Context,
        target: &Target,
        dtid: &str,
        original_transaction_id: i64,
    ) -> Result<(), Error>;

    async fn read_transaction(
        &self,
        ctx: Context,
        target: &Target,
        dtid: &str,
    ) -> Result<Option<TransactionMetadata>, Error>;

    async fn conclude_transaction(&self, ctx: Context, target: &Target, dtid: &str) -> Result<(), Error>;
}
