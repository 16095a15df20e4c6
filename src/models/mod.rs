// Data models shared across the explorer core

pub mod node_id;
pub mod records;

pub use node_id::TreeNodeId;
pub use records::{
    CollectionRecord, DatabaseRecord, Experience, NotificationRecord, OfferContent, OfferRecord,
    PartitionKeyRecord, QuotaRecord, ReadDatabaseOfferParams, ScriptDefinition, ScriptKind,
    ScriptRecord, ThroughputInfo,
};
