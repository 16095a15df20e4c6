//! The explorer coordinator: one instance owns the resource tree, the tab
//! set and the current selection. All state lives on one logical thread;
//! async fetches suspend and resume here without parallel mutation, so the
//! collections are guarded by discipline (accessor-only exposure), not locks.

pub mod tabs;
pub mod tree;

pub use tabs::{RefreshFn, Tab, TabKind, TabNode, TabsManager};
pub use tree::{Collection, Database, ScriptNode, UploadDetailsRecord, UploadFile};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::Utc;

use crate::clients::{DataClient, NotificationsClient};
use crate::console::ConsoleSink;
use crate::error::Result;
use crate::events::{Emitter, ExplorerEvent};
use crate::models::{Experience, TreeNodeId};
use crate::telemetry::{Action, TelemetrySink, TraceContext};
use crate::workspace::{WorkspaceState, WorkspaceTab};

use tree::reconcile_children;

/// Account-level facts the coordinator needs up front.
#[derive(Debug, Clone)]
pub struct ExplorerOptions {
    pub account_name: String,
    pub experience: Experience,
    /// Serverless accounts have no offers; offer loads become no-ops.
    pub serverless_enabled: bool,
    /// Multi-write accounts surface conflicts tabs.
    pub multi_write_enabled: bool,
}

/// Collaborators the core calls through. Telemetry and console failures are
/// the sinks' problem; they never fail an operation.
pub struct ExplorerClients {
    pub data: Rc<dyn DataClient>,
    pub notifications: Rc<dyn NotificationsClient>,
    pub telemetry: Rc<dyn TelemetrySink>,
    pub console: Rc<dyn ConsoleSink>,
}

/// A selectable node in the resource tree.
#[derive(Clone)]
pub enum NodeRef {
    Database(Rc<Database>),
    Collection(Rc<Collection>),
    Script(Rc<ScriptNode>),
}

impl NodeRef {
    pub fn rid(&self) -> String {
        match self {
            NodeRef::Database(database) => database.rid().to_string(),
            NodeRef::Collection(collection) => collection.rid().to_string(),
            NodeRef::Script(script) => script.rid().to_string(),
        }
    }

    pub fn node_kind(&self) -> &'static str {
        match self {
            NodeRef::Database(_) => "Database",
            NodeRef::Collection(_) => "Collection",
            NodeRef::Script(script) => script.node_kind(),
        }
    }

    pub fn as_database(&self) -> Option<&Rc<Database>> {
        match self {
            NodeRef::Database(database) => Some(database),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Rc<Collection>> {
        match self {
            NodeRef::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

pub struct Explorer {
    options: ExplorerOptions,
    data: Rc<dyn DataClient>,
    notifications: Rc<dyn NotificationsClient>,
    telemetry: Rc<dyn TelemetrySink>,
    console: Rc<dyn ConsoleSink>,
    events: Emitter,
    tabs: TabsManager,
    databases: RefCell<Vec<Rc<Database>>>,
    selected_node: RefCell<Option<NodeRef>>,
    is_refreshing: Cell<bool>,
    self_ref: Weak<Explorer>,
}

impl Explorer {
    pub fn new(options: ExplorerOptions, clients: ExplorerClients) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Explorer>| Self {
            options,
            data: clients.data,
            notifications: clients.notifications,
            telemetry: clients.telemetry,
            console: clients.console,
            events: Emitter::new(),
            tabs: TabsManager::new(weak.clone()),
            databases: RefCell::new(Vec::new()),
            selected_node: RefCell::new(None),
            is_refreshing: Cell::new(false),
            self_ref: weak.clone(),
        })
    }

    pub fn account_name(&self) -> &str {
        &self.options.account_name
    }

    pub fn experience(&self) -> Experience {
        self.options.experience
    }

    pub fn is_serverless_enabled(&self) -> bool {
        self.options.serverless_enabled
    }

    pub fn is_multi_write_enabled(&self) -> bool {
        self.options.multi_write_enabled
    }

    pub fn events(&self) -> &Emitter {
        &self.events
    }

    pub fn tabs(&self) -> &TabsManager {
        &self.tabs
    }

    pub fn databases(&self) -> Vec<Rc<Database>> {
        self.databases.borrow().clone()
    }

    pub fn find_database_with_id(&self, database_id: &str) -> Option<Rc<Database>> {
        self.databases.borrow().iter().find(|database| database.id() == database_id).cloned()
    }

    /// Single process-wide selection slot; last write wins, no history.
    pub fn selected_node(&self) -> Option<NodeRef> {
        self.selected_node.borrow().clone()
    }

    pub fn set_selected_node(&self, node: Option<NodeRef>) {
        let rid = node.as_ref().map(NodeRef::rid);
        *self.selected_node.borrow_mut() = node;
        self.events.emit(ExplorerEvent::SelectionChanged { rid });
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing.get()
    }

    pub(crate) fn set_is_refreshing(&self, value: bool) {
        self.is_refreshing.set(value);
    }

    /// Reconcile the database list against a fresh listing. A failed fetch
    /// leaves the current list untouched.
    pub async fn load_databases(&self) -> Result<()> {
        let token = self.telemetry.trace_start(Action::LoadDatabases, self.base_trace());
        let records = match self.data.list_databases().await {
            Ok(records) => records,
            Err(error) => {
                self.telemetry.trace_failure(
                    Action::LoadDatabases,
                    self.base_trace().with_error(&error),
                    token,
                );
                return Err(error);
            }
        };

        let current = self.databases.borrow().clone();
        let next = reconcile_children(
            &current,
            &records,
            |record| record.rid.as_str(),
            |database| database.rid(),
            |database| database.id(),
            |record| Database::new(self.self_ref.clone(), record),
        )?;
        let count = next.len();
        *self.databases.borrow_mut() = next;

        self.telemetry.trace_success(Action::LoadDatabases, self.base_trace(), token);
        self.events.emit(ExplorerEvent::DatabasesLoaded { count });
        Ok(())
    }

    /// Snapshot expansion, selection and deduplicated tabs for persistence.
    pub fn workspace_snapshot(&self) -> WorkspaceState {
        let mut expanded_nodes = Vec::new();
        for database in self.databases() {
            if database.is_expanded() {
                expanded_nodes.push(TreeNodeId::database(database.id()).to_tree_id());
            }
            for collection in database.collections() {
                if collection.is_expanded() {
                    expanded_nodes
                        .push(TreeNodeId::collection(database.id(), collection.id()).to_tree_id());
                }
            }
        }

        let selected_node = self.selected_node().and_then(|node| match node {
            NodeRef::Database(database) => Some(TreeNodeId::database(database.id()).to_tree_id()),
            NodeRef::Collection(collection) => Some(
                TreeNodeId::collection(collection.database_id(), collection.id()).to_tree_id(),
            ),
            // Script nodes are re-listed on expand; not worth persisting.
            NodeRef::Script(_) => None,
        });

        let open: Vec<Rc<Tab>> = self
            .tabs
            .tabs()
            .into_iter()
            .filter(|tab| !tab.kind().is_multi_instance())
            .collect();
        let active_tab = self.tabs.active_tab().and_then(|active| {
            open.iter().position(|tab| Rc::ptr_eq(tab, &active))
        });
        let open_tabs = open
            .iter()
            .map(|tab| WorkspaceTab {
                database: tab.node().database_id(),
                collection: tab.node().collection_id(),
                kind: tab.kind(),
                title: tab.title(),
            })
            .collect();

        WorkspaceState {
            expanded_nodes,
            selected_node,
            open_tabs,
            active_tab,
            last_saved: Some(Utc::now()),
        }
    }

    /// Best-effort restore of a persisted workspace: re-expand recorded
    /// nodes, reopen deduplicated tabs, restore selection. Failures are
    /// logged and skipped, never fatal; the tree may have changed since the
    /// snapshot.
    pub async fn restore_workspace(&self, workspace: &WorkspaceState) {
        for id in &workspace.expanded_nodes {
            match TreeNodeId::from_tree_id(id) {
                Some(TreeNodeId::Database { database }) => {
                    let Some(node) = self.find_database_with_id(&database) else {
                        continue;
                    };
                    if let Err(error) = node.expand().await {
                        log::warn!("Failed to re-expand database {}: {}", database, error);
                    }
                }
                Some(TreeNodeId::Collection { database, collection }) => {
                    if let Some(node) = self
                        .find_database_with_id(&database)
                        .and_then(|node| node.find_collection_with_id(&collection))
                    {
                        node.expand();
                    }
                }
                None => log::warn!("Ignoring unparseable workspace node id {}", id),
            }
        }

        for tab in &workspace.open_tabs {
            if let Err(error) = self.reopen_workspace_tab(tab).await {
                log::warn!("Failed to reopen {} tab for {}: {}", tab.title, tab.database, error);
            }
        }

        if let Some(id) = &workspace.selected_node {
            let node = match TreeNodeId::from_tree_id(id) {
                Some(TreeNodeId::Database { database }) => {
                    self.find_database_with_id(&database).map(NodeRef::Database)
                }
                Some(TreeNodeId::Collection { database, collection }) => self
                    .find_database_with_id(&database)
                    .and_then(|node| node.find_collection_with_id(&collection))
                    .map(NodeRef::Collection),
                None => None,
            };
            if node.is_some() {
                self.set_selected_node(node);
            }
        }
    }

    async fn reopen_workspace_tab(&self, tab: &WorkspaceTab) -> Result<()> {
        let Some(database) = self.find_database_with_id(&tab.database) else {
            return Ok(());
        };

        match (&tab.collection, tab.kind) {
            (None, TabKind::DatabaseSettings) => {
                database.open_settings_tab().await?;
            }
            (Some(collection_id), kind) if !kind.is_multi_instance() => {
                let Some(collection) = database.find_collection_with_id(collection_id) else {
                    return Ok(());
                };
                match kind {
                    TabKind::Documents => collection.open_tab().await?,
                    TabKind::Settings => collection.open_settings_tab().await?,
                    TabKind::QueryTables => collection.open_entities_tab().await?,
                    TabKind::Graph => collection.open_graph_documents_tab().await?,
                    TabKind::Conflicts => collection.open_conflicts_tab().await?,
                    _ => return Ok(()),
                };
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn data_client(&self) -> Rc<dyn DataClient> {
        self.data.clone()
    }

    pub(crate) fn notifications_client(&self) -> Rc<dyn NotificationsClient> {
        self.notifications.clone()
    }

    pub(crate) fn telemetry(&self) -> Rc<dyn TelemetrySink> {
        self.telemetry.clone()
    }

    pub(crate) fn console(&self) -> Rc<dyn ConsoleSink> {
        self.console.clone()
    }

    pub(crate) fn base_trace(&self) -> TraceContext {
        TraceContext {
            account_name: Some(self.options.account_name.clone()),
            experience: Some(self.options.experience),
            ..Default::default()
        }
    }
}
