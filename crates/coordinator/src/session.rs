use gateway::{TabletAlias, Target};

/// Per-session override of the coordinator's default commit strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Unspecified,
    Single,
    Multi,
    Twopc,
}

/// One participant's stake in the current transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSession {
    pub target: Target,
    pub tablet_alias: TabletAlias,
    /// `0` means there is no open shard-side transaction: either this
    /// session was never opened, or it already concluded or failed commit.
    pub transaction_id: i64,
}

impl ShardSession {
    pub fn new(target: Target, tablet_alias: TabletAlias, transaction_id: i64) -> Self {
        Self {
            target,
            tablet_alias,
            transaction_id,
        }
    }

    pub fn is_open(&self) -> bool {
        self.transaction_id != 0
    }

    /// Clears the shard-local transaction id. Called unconditionally on
    /// every exit path from a per-shard commit attempt (success or failure),
    /// per the unconditional-clear design adopted over the reference
    /// implementation's failure-only clear.
    pub fn close(&mut self) {
        self.transaction_id = 0;
    }
}

/// A non-fatal diagnostic surfaced to the client alongside a successful
/// commit, e.g. a post-session failure that didn't abort the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
}

/// The logical transaction handle. Owned exclusively by one request handler
/// at a time; never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct Session {
    in_transaction: bool,
    pub mode: Mode,
    pub pre_sessions: Vec<ShardSession>,
    pub shard_sessions: Vec<ShardSession>,
    pub post_sessions: Vec<ShardSession>,
    pub warnings: Vec<Warning>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Begins a new transaction on this session, first committing whatever
    /// transaction is already in flight so Begin is idempotent from the
    /// client's point of view. Mutation of `in_transaction` happens
    /// regardless of whether that prior commit succeeded, mirroring the
    /// reference coordinator's `Begin`.
    pub async fn begin<G: gateway::ParticipantGateway>(
        &mut self,
        ctx: &fanout::Context,
        coordinator: &crate::Coordinator<G>,
    ) -> Result<(), crate::Error> {
        if self.in_transaction() {
            coordinator.commit(ctx, self).await?;
        }
        self.in_transaction = true;
        Ok(())
    }

    pub(crate) fn set_in_transaction(&mut self, value: bool) {
        self.in_transaction = value;
    }

    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning {
            message: message.into(),
        });
    }

    /// Clears `in_transaction`, all three sub-session sequences, and
    /// warnings. Invoked on every commit/rollback exit path.
    pub fn reset(&mut self) {
        self.in_transaction = false;
        self.pre_sessions.clear();
        self.shard_sessions.clear();
        self.post_sessions.clear();
        self.warnings.clear();
    }
}
