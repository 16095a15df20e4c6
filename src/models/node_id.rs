//! Type-safe identifiers for nodes in the resource tree.
//! Used by workspace persistence so snapshots survive node re-instantiation.

use serde::{Deserialize, Serialize};

/// Identifies a tree node by display ids rather than `_rid`, so a persisted
/// id still resolves after the backing resources are re-listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeNodeId {
    /// A database node
    Database { database: String },
    /// A collection within a database
    Collection { database: String, collection: String },
}

impl TreeNodeId {
    pub fn database(database: impl Into<String>) -> Self {
        Self::Database { database: database.into() }
    }

    pub fn collection(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::Collection { database: database.into(), collection: collection.into() }
    }

    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    pub fn database_name(&self) -> &str {
        match self {
            Self::Database { database } => database,
            Self::Collection { database, .. } => database,
        }
    }

    pub fn collection_name(&self) -> Option<&str> {
        match self {
            Self::Collection { collection, .. } => Some(collection),
            _ => None,
        }
    }

    /// Convert to a flat string for use as a persisted tree item id.
    /// Format: "db:{database}" | "coll:{database}:{collection}"
    pub fn to_tree_id(&self) -> String {
        match self {
            Self::Database { database } => format!("db:{}", database),
            Self::Collection { database, collection } => {
                format!("coll:{}:{}", database, collection)
            }
        }
    }

    /// Parse from a persisted tree item id. Returns None if the format is
    /// invalid.
    pub fn from_tree_id(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.splitn(3, ':').collect();

        match parts.as_slice() {
            ["db", database] => Some(Self::Database { database: (*database).to_string() }),
            ["coll", database, collection] => Some(Self::Collection {
                database: (*database).to_string(),
                collection: (*collection).to_string(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for TreeNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_tree_id())
    }
}
