use crate::session::{Session, ShardSession};
use crate::{Coordinator, Error};
use fanout::Context;
use gateway::ParticipantGateway;

impl<G: ParticipantGateway> Coordinator<G> {
    /// Unconditionally rolls back every sub-session across all three phases.
    ///
    /// A no-op if the session isn't in a transaction. Never retries: this is
    /// a best-effort attempt against every shard, and sub-sessions whose
    /// transaction id is already `0` (finalised, or already failed to
    /// commit) are skipped rather than re-hit.
    pub async fn rollback(&self, ctx: &Context, session: &mut Session) -> Result<(), Error> {
        if !session.in_transaction() {
            return Ok(());
        }

        let mut all: Vec<ShardSession> = Vec::with_capacity(
            session.pre_sessions.len() + session.shard_sessions.len() + session.post_sessions.len(),
        );
        all.extend(session.pre_sessions.iter().cloned());
        all.extend(session.shard_sessions.iter().cloned());
        all.extend(session.post_sessions.iter().cloned());

        let gateway = self.gateway.clone();
        let result = fanout::fan_out(ctx, all, move |ctx, shard| {
            let gateway = gateway.clone();
            async move { rollback_shard(gateway, ctx, shard).await }
        })
        .await;

        session.reset();
        result.map_err(Error::from)
    }
}

async fn rollback_shard<G: ParticipantGateway>(
    gateway: std::sync::Arc<G>,
    ctx: Context,
    shard: ShardSession,
) -> Result<(), gateway::Error> {
    if !shard.is_open() {
        return Ok(());
    }
    let qs = gateway
        .query_service_by_alias(ctx, &shard.target, Some(&shard.tablet_alias))
        .await?;
    qs.rollback(ctx, &shard.target, shard.transaction_id).await
}
