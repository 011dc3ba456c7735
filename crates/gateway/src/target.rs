/// The serving type of a tablet within a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum TabletType {
    Primary,
    Replica,
    Rdonly,
}

/// The logical identity of a shard: which keyspace, which shard range within
/// it, and which tablet type should serve the request. Routing to a specific
/// physical server is a separate concern, see [`TabletAlias`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Target {
    pub keyspace: String,
    pub shard: String,
    pub tablet_type: TabletType,
}

impl Target {
    pub fn new(keyspace: impl Into<String>, shard: impl Into<String>, tablet_type: TabletType) -> Self {
        Self {
            keyspace: keyspace.into(),
            shard: shard.into(),
            tablet_type,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}({:?})", self.keyspace, self.shard, self.tablet_type)
    }
}

/// The physical identity of the tablet server currently serving [`Target`].
/// Every RPC after the one that opened a shard-side transaction must be
/// pinned to the same alias, since the transaction id is server-local.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TabletAlias {
    pub cell: String,
    pub uid: u32,
}

impl std::fmt::Display for TabletAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.cell, self.uid)
    }
}
