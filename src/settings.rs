//! User-adjustable explorer settings, persisted by [`crate::config::ConfigManager`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Items fetched per page by document/query views.
    pub page_size: u32,
    pub cross_partition_query_enabled: bool,
    /// Max parallel partition reads for cross-partition queries.
    pub max_degree_of_parallelism: i32,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            cross_partition_query_enabled: true,
            max_degree_of_parallelism: 6,
        }
    }
}
