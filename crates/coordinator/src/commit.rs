use crate::session::{Mode, Session, ShardSession};
use crate::{Coordinator, Error};
use fanout::Context;
use gateway::ParticipantGateway;
use std::sync::Arc;

impl<G: ParticipantGateway> Coordinator<G> {
    /// Commits the session's current transaction, choosing best-effort or
    /// 2PC based on the session's mode (falling back to the coordinator's
    /// configured default when the session leaves it unspecified).
    ///
    /// A no-op returning success if the session isn't in a transaction.
    /// Reset is guaranteed on every exit path.
    pub async fn commit(&self, ctx: &Context, session: &mut Session) -> Result<(), Error> {
        let result = self.commit_dispatch(ctx, session).await;
        session.reset();
        result
    }

    async fn commit_dispatch(&self, ctx: &Context, session: &mut Session) -> Result<(), Error> {
        if !session.in_transaction() {
            return Ok(());
        }

        let twopc = match session.mode {
            Mode::Twopc => true,
            Mode::Unspecified => self.config.default_is_twopc(),
            Mode::Single | Mode::Multi => false,
        };

        if twopc {
            self.commit_twopc(ctx, session).await
        } else {
            self.commit_normal(ctx, session).await
        }
    }

    /// Best-effort multi-shard commit: pre-phase fans out in parallel, the
    /// main phase commits sequentially in insertion order for backward
    /// compatibility, and the post-phase fans out in parallel with failures
    /// downgraded to warnings rather than aborting the commit.
    pub(crate) async fn commit_normal(&self, ctx: &Context, session: &mut Session) -> Result<(), Error> {
        if let Err(err) = self.commit_fanned_out(ctx, &mut session.pre_sessions).await {
            let _ = self.rollback(ctx, session).await;
            return Err(err.into());
        }

        for index in 0..session.shard_sessions.len() {
            let shard = session.shard_sessions[index].clone();
            let result = commit_shard(self.gateway.clone(), *ctx, shard).await;
            session.shard_sessions[index].close();
            if let Err(err) = result {
                let _ = self.rollback(ctx, session).await;
                return Err(err.into());
            }
        }

        if let Err(err) = self.commit_fanned_out(ctx, &mut session.post_sessions).await {
            session.record_warning(format!("post-operation transaction had an error: {err}"));
        }

        Ok(())
    }

    /// Fans `Commit` out across `sessions` in parallel and unconditionally
    /// clears every sub-session's transaction id once the fan-out returns,
    /// regardless of which participants failed.
    async fn commit_fanned_out(
        &self,
        ctx: &Context,
        sessions: &mut [ShardSession],
    ) -> Result<(), fanout::Error<gateway::Error>> {
        if sessions.is_empty() {
            return Ok(());
        }
        let items: Vec<ShardSession> = sessions.iter().cloned().collect();
        let gateway = self.gateway.clone();
        let result = fanout::fan_out(ctx, items, move |ctx, shard| {
            let gateway = gateway.clone();
            async move { commit_shard(gateway, ctx, shard).await }
        })
        .await;
        sessions.iter_mut().for_each(ShardSession::close);
        result
    }
}

pub(crate) async fn commit_shard<G: ParticipantGateway>(
    gateway: Arc<G>,
    ctx: Context,
    shard: ShardSession,
) -> Result<(), gateway::Error> {
    let qs = gateway
        .query_service_by_alias(ctx, &shard.target, Some(&shard.tablet_alias))
        .await?;
    qs.commit(ctx, &shard.target, shard.transaction_id).await
}
