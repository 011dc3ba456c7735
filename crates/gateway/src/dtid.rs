use crate::target::{TabletAlias, Target};
use crate::Error;

/// A distributed transaction id.
///
/// Encoded as `keyspace:shard:transaction_id`, so that the metadata-manager
/// shard's identity and its shard-local transaction id can be recovered from
/// the dtid alone, without a side channel. The tablet alias pinning a
/// follow-up RPC to the exact server that opened the manager's transaction is
/// *not* encoded here; it is resolved fresh from `keyspace`/`shard` at
/// recovery time, the same way any other shard session is first opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dtid(String);

impl Dtid {
    /// Derives a dtid from the metadata-manager shard's target and
    /// transaction id, per the manager's `Target`/`transaction_id`.
    pub fn new(mm_target: &Target, mm_transaction_id: i64) -> Self {
        Self(format!(
            "{}:{}:{}",
            mm_target.keyspace, mm_target.shard, mm_transaction_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstructs the manager shard's (keyspace, shard, transaction_id)
    /// from a dtid string. The returned target always has `TabletType::Primary`
    /// since only the primary tablet of a shard runs 2PC metadata RPCs; the
    /// caller must still resolve a live [`TabletAlias`] for it.
    pub fn parse(dtid: &str) -> Result<(Target, i64), Error> {
        let mut parts = dtid.splitn(3, ':');
        let (Some(keyspace), Some(shard), Some(transaction_id)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidDtid(dtid.to_string()));
        };
        let transaction_id: i64 = transaction_id
            .parse()
            .map_err(|_| Error::InvalidDtid(dtid.to_string()))?;

        Ok((
            Target::new(keyspace, shard, crate::target::TabletType::Primary),
            transaction_id,
        ))
    }
}

impl std::fmt::Display for Dtid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Dtid> for String {
    fn from(dtid: Dtid) -> Self {
        dtid.0
    }
}

/// Just enough of a `ShardSession` to be recovered from a dtid: the manager's
/// logical target and its shard-local transaction id. `tablet_alias` is
/// filled in by re-resolving the target through the gateway, not decoded from
/// the dtid itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredManager {
    pub target: Target,
    pub transaction_id: i64,
    pub tablet_alias: Option<TabletAlias>,
}

impl RecoveredManager {
    pub fn from_dtid(dtid: &str) -> Result<Self, Error> {
        let (target, transaction_id) = Dtid::parse(dtid)?;
        Ok(Self {
            target,
            transaction_id,
            tablet_alias: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TabletType;

    #[test]
    fn round_trips_through_the_dtid_string() {
        let target = Target::new("ks", "80-", TabletType::Primary);
        let dtid = Dtid::new(&target, 42);
        assert_eq!(dtid.as_str(), "ks:80-:42");

        let recovered = RecoveredManager::from_dtid(dtid.as_str()).unwrap();
        assert_eq!(recovered.target, target);
        assert_eq!(recovered.transaction_id, 42);
    }

    #[test]
    fn rejects_malformed_dtids() {
        assert!(matches!(
            RecoveredManager::from_dtid("not-a-dtid"),
            Err(Error::InvalidDtid(_))
        ));
        assert!(matches!(
            RecoveredManager::from_dtid("ks:80-:not-a-number"),
            Err(Error::InvalidDtid(_))
        ));
    }

    /// Any keyspace/shard pair free of the `:` separator round-trips through
    /// a dtid string exactly, for any transaction id.
    #[quickcheck_macros::quickcheck]
    fn round_trips_for_colon_free_identifiers(keyspace: String, shard: String, transaction_id: i64) -> bool {
        let keyspace = keyspace.replace(':', "");
        let shard = shard.replace(':', "");
        let target = Target::new(keyspace, shard, TabletType::Primary);
        let dtid = Dtid::new(&target, transaction_id);

        match RecoveredManager::from_dtid(dtid.as_str()) {
            Ok(recovered) => recovered.target == target && recovered.transaction_id == transaction_id,
            Err(_) => false,
        }
    }
}
