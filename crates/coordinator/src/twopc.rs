use crate::session::{Session, ShardSession};
use crate::{Coordinator, Error};
use fanout::Context;
use gateway::{Dtid, ParticipantGateway, Target};
use std::sync::Arc;

impl<G: ParticipantGateway> Coordinator<G> {
    /// Two-phase commit: `CreateTransaction -> Prepare* -> StartCommit ->
    /// CommitPrepared* -> ConcludeTransaction`, each step a strict
    /// happens-before barrier over the last.
    ///
    /// Rejects pre/post sessions outright (2PC has no room for them), and
    /// downgrades to a normal commit when there's at most one participant,
    /// since 2PC buys nothing over a single shard.
    pub(crate) async fn commit_twopc(&self, ctx: &Context, session: &mut Session) -> Result<(), Error> {
        if !session.pre_sessions.is_empty() || !session.post_sessions.is_empty() {
            let _ = self.rollback(ctx, session).await;
            return Err(Error::FailedPrecondition(
                "pre or post actions not allowed for 2PC",
            ));
        }

        if session.shard_sessions.len() <= 1 {
            return self.commit_normal(ctx, session).await;
        }

        let mm = session.shard_sessions[0].clone();
        let participants: Vec<ShardSession> = session.shard_sessions[1..].to_vec();
        let participant_targets: Vec<Target> = participants.iter().map(|s| s.target.clone()).collect();

        let dtid = Dtid::new(&mm.target, mm.transaction_id);

        // Step 1: CreateTransaction. Nothing is prepared yet, so a plain
        // rollback is safe here.
        if let Err(err) = self
            .gateway
            .create_transaction(*ctx, &mm.target, dtid.as_str(), &participant_targets)
            .await
        {
            let _ = self.rollback(ctx, session).await;
            return Err(err.into());
        }

        // Step 2: Prepare fan-out.
        if let Err(err) = self.prepare_participants(ctx, &participants, dtid.as_str()).await {
            if let Err(resolve_err) = self.resolve(ctx, dtid.as_str()).await {
                tracing::warn!(%resolve_err, %dtid, "resolve after prepare failure also failed");
            }
            return Err(err.into());
        }

        // Step 3: StartCommit is the linearisation point. Once it returns
        // success the transaction is globally committed even if the
        // remaining steps fail; a later `resolve` can re-drive them.
        let qs = self
            .gateway
            .query_service_by_alias(*ctx, &mm.target, Some(&mm.tablet_alias))
            .await?;
        qs.start_commit(*ctx, &mm.target, mm.transaction_id, dtid.as_str())
            .await?;

        // Step 4: CommitPrepared fan-out. Failure here is not rolled back,
        // the decision is already durable; `resolve` re-drives it instead.
        self.commit_prepared_targets(ctx, &participant_targets, dtid.as_str())
            .await?;

        // Step 5: ConcludeTransaction removes the durable record.
        self.gateway
            .conclude_transaction(*ctx, &mm.target, dtid.as_str())
            .await?;

        Ok(())
    }

    pub(crate) async fn prepare_participants(
        &self,
        ctx: &Context,
        participants: &[ShardSession],
        dtid: &str,
    ) -> Result<(), fanout::Error<gateway::Error>> {
        let items: Vec<ShardSession> = participants.to_vec();
        let gateway = self.gateway.clone();
        let dtid = dtid.to_string();
        fanout::fan_out(ctx, items, move |ctx, shard| {
            let gateway = gateway.clone();
            let dtid = dtid.clone();
            async move { prepare_shard(gateway, ctx, shard, dtid).await }
        })
        .await
    }

    pub(crate) async fn commit_prepared_targets(
        &self,
        ctx: &Context,
        targets: &[Target],
        dtid: &str,
    ) -> Result<(), fanout::Error<gateway::Error>> {
        let items: Vec<Target> = targets.to_vec();
        let gateway = self.gateway.clone();
        let dtid = dtid.to_string();
        fanout::fan_out(ctx, items, move |ctx, target| {
            let gateway = gateway.clone();
            let dtid = dtid.clone();
            async move { gateway.commit_prepared(ctx, &target, &dtid).await }
        })
        .await
    }

    pub(crate) async fn rollback_prepared_targets(
        &self,
        ctx: &Context,
        targets: &[Target],
        dtid: &str,
    ) -> Result<(), fanout::Error<gateway::Error>> {
        let items: Vec<Target> = targets.to_vec();
        let gateway = self.gateway.clone();
        let dtid = dtid.to_string();
        fanout::fan_out(ctx, items, move |ctx, target| {
            let gateway = gateway.clone();
            let dtid = dtid.clone();
            async move { gateway.rollback_prepared(ctx, &target, &dtid, 0).await }
        })
        .await
    }
}

async fn prepare_shard<G: ParticipantGateway>(
    gateway: Arc<G>,
    ctx: Context,
    shard: ShardSession,
    dtid: String,
) -> Result<(), gateway::Error> {
    let qs = gateway
        .query_service_by_alias(ctx, &shard.target, Some(&shard.tablet_alias))
        .await?;
    qs.prepare(ctx, &shard.target, shard.transaction_id, &dtid).await
}
