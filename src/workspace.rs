//! Workspace snapshot: what the user had open, for restore on next launch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::explorer::TabKind;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkspaceState {
    /// Tree ids (see [`crate::models::TreeNodeId`]) of expanded nodes.
    pub expanded_nodes: Vec<String>,
    pub selected_node: Option<String>,
    pub open_tabs: Vec<WorkspaceTab>,
    pub active_tab: Option<usize>,
    pub last_saved: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceTab {
    pub database: String,
    /// None for database-scoped tabs (e.g. database settings).
    #[serde(default)]
    pub collection: Option<String>,
    pub kind: TabKind,
    pub title: String,
}
