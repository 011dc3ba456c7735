//! The participant gateway: the interface the coordinator uses to reach
//! individual shards, plus the types that identify a shard, a tablet, and a
//! 2PC transaction.
//!
//! Everything in this crate is an external collaborator's interface from the
//! coordinator's point of view; the actual RPC plumbing, routing, and
//! durable metadata storage live on the other side of [`ParticipantGateway`].

mod dtid;
mod error;
mod gateway;
mod metadata;
mod target;

#[cfg(feature = "mock")]
pub mod mock;

pub use dtid::{Dtid, RecoveredManager};
pub use error::Error;
pub use gateway::{ParticipantGateway, QueryService};
pub use metadata::{TransactionMetadata, TransactionState};
pub use target::{TabletAlias, TabletType, Target};

pub use fanout::Context;
