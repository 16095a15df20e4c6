//! Wire records returned by the listing/offer/notification fetchers.
//!
//! These mirror the resource shapes of the backing store's REST surface:
//! `_rid` is the stable, never-reused resource identifier assigned by the
//! store; `id` is the user-visible (renamable) display id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account API experience. Decides which tab a collection opens by default
/// and how partition key paths are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Experience {
    #[default]
    Sql,
    Mongo,
    Graph,
    Table,
    Cassandra,
}

impl Experience {
    pub fn label(self) -> &'static str {
        match self {
            Experience::Sql => "SQL",
            Experience::Mongo => "MongoDB",
            Experience::Graph => "Gremlin",
            Experience::Table => "Table",
            Experience::Cassandra => "Cassandra",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseRecord {
    #[serde(rename = "_rid")]
    pub rid: String,
    #[serde(rename = "_self")]
    pub self_link: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    #[serde(rename = "_rid")]
    pub rid: String,
    #[serde(rename = "_self")]
    pub self_link: String,
    pub id: String,
    #[serde(default)]
    pub partition_key: Option<PartitionKeyRecord>,
    #[serde(default)]
    pub default_ttl: Option<i64>,
    #[serde(default)]
    pub analytical_storage_ttl: Option<i64>,
    #[serde(default)]
    pub indexing_policy: Option<Value>,
    #[serde(default)]
    pub conflict_resolution_policy: Option<Value>,
    #[serde(default)]
    pub change_feed_policy: Option<Value>,
    #[serde(default)]
    pub geospatial_config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKeyRecord {
    pub paths: Vec<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub system_key: Option<bool>,
}

/// Provisioned-throughput record for a database or collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRecord {
    pub id: String,
    /// Link to the resource this offer provisions; matched by `_rid` containment.
    pub resource: String,
    #[serde(default)]
    pub offer_version: Option<String>,
    #[serde(default)]
    pub content: Option<OfferContent>,
}

impl OfferRecord {
    /// V1 offers predate per-collection throughput info; an absent version
    /// means V1.
    pub fn is_not_v1(&self) -> bool {
        matches!(self.offer_version.as_deref(), Some(v) if v != "V1")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferContent {
    #[serde(default)]
    pub offer_throughput: Option<u64>,
    #[serde(default)]
    pub collection_throughput_info: Option<ThroughputInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputInfo {
    #[serde(default)]
    pub minimum_ru_for_collection: Option<u64>,
    #[serde(default)]
    pub num_physical_partitions: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadDatabaseOfferParams {
    pub database_id: String,
    pub database_resource_id: String,
}

/// Storage quota/usage snapshot for a collection, as returned by the
/// quota-info fetcher. `unique_key_policy` rides along and is split out by
/// the settings load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaRecord {
    #[serde(default)]
    pub collection_size_kb: Option<u64>,
    #[serde(default)]
    pub documents_size_kb: Option<u64>,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default)]
    pub num_partitions: Option<u64>,
    #[serde(default)]
    pub unique_key_policy: Option<Value>,
}

/// Backend notification of a long-running operation. Relevance to a node is
/// decided by matching `description` against the throughput-update pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptKind {
    StoredProcedure,
    UserDefinedFunction,
    Trigger,
}

impl ScriptKind {
    pub fn label(self) -> &'static str {
        match self {
            ScriptKind::StoredProcedure => "Stored procedure",
            ScriptKind::UserDefinedFunction => "User defined function",
            ScriptKind::Trigger => "Trigger",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRecord {
    #[serde(rename = "_rid")]
    pub rid: String,
    #[serde(rename = "_self")]
    pub self_link: String,
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub trigger_operation: Option<String>,
}

/// Client-side definition for creating a script resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDefinition {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub trigger_operation: Option<String>,
}
