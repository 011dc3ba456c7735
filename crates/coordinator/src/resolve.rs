use crate::{Coordinator, Error};
use fanout::Context;
use gateway::{ParticipantGateway, RecoveredManager, TransactionState};

impl<G: ParticipantGateway> Coordinator<G> {
    /// Recovers a dangling 2PC transaction identified by `dtid`, driving it
    /// to a terminal state. Idempotent: once `ConcludeTransaction` has run,
    /// a re-entered `resolve` observes no record and returns immediately.
    ///
    /// Correctness under concurrent resolvers of the same dtid rests on the
    /// shard side's `CommitPrepared`/`RollbackPrepared`/`ConcludeTransaction`
    /// being idempotent, not on any lock held here.
    pub async fn resolve(&self, ctx: &Context, dtid: &str) -> Result<(), Error> {
        let mm = RecoveredManager::from_dtid(dtid)?;

        let Some(transaction) = self
            .gateway
            .read_transaction(*ctx, &mm.target, dtid)
            .await?
        else {
            return Ok(());
        };
        if transaction.dtid.is_empty() {
            return Ok(());
        }

        match transaction.state {
            TransactionState::Prepare => {
                let qs = self
                    .gateway
                    .query_service_by_alias(*ctx, &mm.target, mm.tablet_alias.as_ref())
                    .await?;
                qs.set_rollback(*ctx, &mm.target, dtid, mm.transaction_id)
                    .await?;
                self.resume_rollback(ctx, &mm.target, &transaction.participants, dtid)
                    .await
            }
            TransactionState::Rollback => {
                self.resume_rollback(ctx, &mm.target, &transaction.participants, dtid)
                    .await
            }
            TransactionState::Commit => {
                self.commit_prepared_targets(ctx, &transaction.participants, dtid)
                    .await?;
                self.gateway.conclude_transaction(*ctx, &mm.target, dtid).await?;
                Ok(())
            }
        }
    }

    async fn resume_rollback(
        &self,
        ctx: &Context,
        mm_target: &gateway::Target,
        participants: &[gateway::Target],
        dtid: &str,
    ) -> Result<(), Error> {
        self.rollback_prepared_targets(ctx, participants, dtid).await?;
        self.gateway.conclude_transaction(*ctx, mm_target, dtid).await?;
        Ok(())
    }
}
