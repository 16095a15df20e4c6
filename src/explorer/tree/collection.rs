//! Collection node: per-API tab entry points, settings load, script
//! children and document upload.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::try_join;
use serde_json::Value;

use crate::console::ConsoleMessageKind;
use crate::error::{Error, Result};
use crate::events::ExplorerEvent;
use crate::explorer::tabs::{OpenTabOptions, Tab, TabKind, TabNode};
use crate::explorer::{Explorer, NodeRef};
use crate::models::{
    CollectionRecord, Experience, NotificationRecord, OfferRecord, PartitionKeyRecord, QuotaRecord,
    ScriptKind, ScriptRecord,
};
use crate::telemetry::{Action, ActionModifier, Area};

use super::scripts::ScriptNode;
use super::THROUGHPUT_UPDATE;

/// One file handed to [`Collection::upload_documents`].
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content: String,
}

/// Per-file outcome of a document upload.
#[derive(Debug, Clone, Default)]
pub struct UploadDetailsRecord {
    pub file_name: String,
    pub num_succeeded: u32,
    pub num_failed: u32,
    pub errors: Vec<String>,
}

const UPLOAD_ERROR_DUMP_LIMIT: usize = 100;

pub struct Collection {
    container: Weak<Explorer>,
    rid: String,
    self_link: String,
    database_id: String,
    id: RefCell<String>,
    partition_key: Option<PartitionKeyRecord>,
    partition_key_property: Option<String>,
    partition_key_property_header: Option<String>,
    default_ttl: Cell<Option<i64>>,
    analytical_storage_ttl: Cell<Option<i64>>,
    indexing_policy: RefCell<Option<Value>>,
    unique_key_policy: RefCell<Option<Value>>,
    conflict_resolution_policy: RefCell<Option<Value>>,
    quota_info: RefCell<Option<QuotaRecord>>,
    offer: RefCell<Option<OfferRecord>>,
    children: RefCell<Vec<Rc<ScriptNode>>>,
    is_expanded: Cell<bool>,
    is_stored_procedures_expanded: Cell<bool>,
    is_user_defined_functions_expanded: Cell<bool>,
    is_triggers_expanded: Cell<bool>,
    selected_subnode: Cell<Option<TabKind>>,
    focused_subnode: Cell<Option<TabKind>>,
}

impl Collection {
    pub(crate) fn new(
        container: Weak<Explorer>,
        database_id: String,
        record: &CollectionRecord,
    ) -> Rc<Self> {
        let mongo = container
            .upgrade()
            .is_some_and(|explorer| explorer.experience() == Experience::Mongo);
        let (partition_key_property, partition_key_property_header) = record
            .partition_key
            .as_ref()
            .map(|key| partition_key_property(&key.paths, mongo))
            .unwrap_or((None, None));

        Rc::new(Self {
            container,
            rid: record.rid.clone(),
            self_link: record.self_link.clone(),
            database_id,
            id: RefCell::new(record.id.clone()),
            partition_key: record.partition_key.clone(),
            partition_key_property,
            partition_key_property_header,
            default_ttl: Cell::new(record.default_ttl),
            analytical_storage_ttl: Cell::new(record.analytical_storage_ttl),
            indexing_policy: RefCell::new(record.indexing_policy.clone()),
            unique_key_policy: RefCell::new(None),
            conflict_resolution_policy: RefCell::new(record.conflict_resolution_policy.clone()),
            quota_info: RefCell::new(None),
            offer: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            is_expanded: Cell::new(false),
            is_stored_procedures_expanded: Cell::new(false),
            is_user_defined_functions_expanded: Cell::new(false),
            is_triggers_expanded: Cell::new(false),
            selected_subnode: Cell::new(None),
            focused_subnode: Cell::new(None),
        })
    }

    pub(crate) fn explorer(&self) -> Rc<Explorer> {
        self.container.upgrade().expect("explorer dropped while collection node in use")
    }

    pub fn rid(&self) -> &str {
        &self.rid
    }

    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn id(&self) -> String {
        self.id.borrow().clone()
    }

    /// Display id only; identity (`rid`) never changes.
    pub fn set_id(&self, id: impl Into<String>) {
        *self.id.borrow_mut() = id.into();
    }

    pub fn partition_key(&self) -> Option<&PartitionKeyRecord> {
        self.partition_key.as_ref()
    }

    pub fn partition_key_property(&self) -> Option<&str> {
        self.partition_key_property.as_deref()
    }

    pub fn partition_key_property_header(&self) -> Option<&str> {
        self.partition_key_property_header.as_deref()
    }

    pub fn default_ttl(&self) -> Option<i64> {
        self.default_ttl.get()
    }

    pub fn analytical_storage_ttl(&self) -> Option<i64> {
        self.analytical_storage_ttl.get()
    }

    pub fn indexing_policy(&self) -> Option<Value> {
        self.indexing_policy.borrow().clone()
    }

    pub fn unique_key_policy(&self) -> Option<Value> {
        self.unique_key_policy.borrow().clone()
    }

    pub fn quota_info(&self) -> Option<QuotaRecord> {
        self.quota_info.borrow().clone()
    }

    pub fn offer(&self) -> Option<OfferRecord> {
        self.offer.borrow().clone()
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded.get()
    }

    pub fn selected_subnode(&self) -> Option<TabKind> {
        self.selected_subnode.get()
    }

    pub fn focused_subnode(&self) -> Option<TabKind> {
        self.focused_subnode.get()
    }

    pub fn set_focused_subnode(&self, kind: Option<TabKind>) {
        self.focused_subnode.set(kind);
    }

    /// Script menus only exist for the document and graph APIs.
    pub fn show_scripts(&self) -> bool {
        self.container.upgrade().is_some_and(|explorer| {
            matches!(explorer.experience(), Experience::Sql | Experience::Graph)
        })
    }

    /// Conflicts only surface on multi-write accounts with a resolution policy.
    pub fn show_conflicts(&self) -> bool {
        self.conflict_resolution_policy.borrow().is_some()
            && self.container.upgrade().is_some_and(|explorer| explorer.is_multi_write_enabled())
    }

    pub fn owning_database(&self) -> Option<Rc<super::Database>> {
        self.container.upgrade()?.find_database_with_id(&self.database_id)
    }

    pub fn select(self: &Rc<Self>) {
        let explorer = self.explorer();
        explorer.set_selected_node(Some(NodeRef::Collection(self.clone())));
        explorer.telemetry().trace(
            Action::SelectItem,
            ActionModifier::Mark,
            self.resource_tree_trace("Collection node"),
        );
    }

    pub fn is_node_selected(&self) -> bool {
        let Some(explorer) = self.container.upgrade() else {
            return false;
        };
        self.is_subnode_selected(TabKind::Query)
            || (!self.is_expanded()
                && explorer
                    .selected_node()
                    .is_some_and(|node| node.node_kind() == "Collection" && node.rid() == self.rid))
    }

    pub fn is_subnode_selected(&self, kind: TabKind) -> bool {
        let Some(explorer) = self.container.upgrade() else {
            return false;
        };
        explorer.selected_node().is_some_and(|node| node.rid() == self.rid)
            && self.selected_subnode.get() == Some(kind)
    }

    /// Toggle expansion, then refresh tabs bound to this collection so the
    /// visible ones stay current.
    pub async fn expand_collapse(self: &Rc<Self>) {
        self.select();
        if self.is_expanded.get() {
            self.collapse();
        } else {
            self.expand();
        }

        let rid = self.rid.clone();
        self.explorer()
            .tabs()
            .refresh_matching(&|tab| tab.collection_rid().as_deref() == Some(rid.as_str()))
            .await;
    }

    /// Collection expansion is flag-only; children load through the script
    /// subtrees.
    pub fn expand(&self) {
        if self.is_expanded.get() {
            return;
        }

        self.is_expanded.set(true);
        let explorer = self.explorer();
        explorer.telemetry().trace(
            Action::ExpandTreeNode,
            ActionModifier::Mark,
            self.resource_tree_trace("Collection node"),
        );
        explorer.events().emit(ExplorerEvent::NodeExpanded { rid: self.rid.clone() });
    }

    pub fn collapse(&self) {
        if !self.is_expanded.get() {
            return;
        }

        self.is_expanded.set(false);
        let explorer = self.explorer();
        explorer.telemetry().trace(
            Action::CollapseTreeNode,
            ActionModifier::Mark,
            self.resource_tree_trace("Collection node"),
        );
        explorer.events().emit(ExplorerEvent::NodeCollapsed { rid: self.rid.clone() });
    }

    /// Open the default data tab for the account's API.
    pub async fn open_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        match self.explorer().experience() {
            Experience::Table | Experience::Cassandra => self.open_entities_tab().await,
            Experience::Graph => self.open_graph_documents_tab().await,
            Experience::Mongo => self.open_mongo_documents_tab().await,
            Experience::Sql => self.open_documents_tab().await,
        }
    }

    /// Collection content label for the account's API.
    pub fn label(&self) -> &'static str {
        match self.container.upgrade().map(|explorer| explorer.experience()) {
            Some(Experience::Table) => "Entities",
            Some(Experience::Cassandra) => "Rows",
            Some(Experience::Graph) => "Graph",
            Some(Experience::Mongo) => "Documents",
            _ => "Items",
        }
    }

    pub async fn open_documents_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        self.open_data_tab(TabKind::Documents, "Items", "Documents node").await
    }

    pub async fn open_mongo_documents_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        self.open_data_tab(TabKind::Documents, "Documents", "Documents node").await
    }

    pub async fn open_graph_documents_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        self.open_data_tab(TabKind::Graph, "Graph", "Documents node").await
    }

    pub async fn open_conflicts_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        self.open_data_tab(TabKind::Conflicts, "Conflicts", "Conflicts node").await
    }

    pub async fn open_entities_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        let title = if self.explorer().experience() == Experience::Cassandra {
            "Rows"
        } else {
            "Entities"
        };
        self.open_data_tab(TabKind::QueryTables, title, "Entities node").await
    }

    /// Shared open path for data tabs that need no settings prefetch.
    async fn open_data_tab(
        self: &Rc<Self>,
        kind: TabKind,
        title: &'static str,
        description: &'static str,
    ) -> Result<Rc<Tab>> {
        let explorer = self.explorer();
        explorer.set_selected_node(Some(NodeRef::Collection(self.clone())));
        self.selected_subnode.set(Some(kind));
        explorer.telemetry().trace(
            Action::SelectItem,
            ActionModifier::Mark,
            self.resource_tree_trace(description),
        );

        let trace = self.tab_trace(title);
        let rid = self.rid.clone();
        let node = TabNode::Collection(self.clone());
        explorer
            .tabs()
            .open(OpenTabOptions {
                kind,
                trace,
                matches: Box::new(move |tab| {
                    tab.collection_rid().as_deref() == Some(rid.as_str())
                }),
                pending: None,
                prepare: None,
                factory: Box::new(move || Tab::new(kind, title, node)),
            })
            .await
    }

    fn settings_tab_title(&self) -> &'static str {
        if self.offer.borrow().is_some() { "Scale & Settings" } else { "Settings" }
    }

    /// Open (or re-activate) the settings tab. Creation joins the pending-
    /// notification fetch with the settings load and only then constructs
    /// the tab; re-activation refreshes the pending notification alone.
    pub async fn open_settings_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        let explorer = self.explorer();
        explorer.set_selected_node(Some(NodeRef::Collection(self.clone())));
        self.selected_subnode.set(Some(TabKind::Settings));
        explorer.telemetry().trace(
            Action::SelectItem,
            ActionModifier::Mark,
            self.resource_tree_trace("Settings node"),
        );

        let trace = self.tab_trace(self.settings_tab_title());
        let rid = self.rid.clone();
        let pending = {
            let this = self.clone();
            async move { this.pending_throughput_notification().await }.boxed_local()
        };
        let prepare = {
            let this = self.clone();
            async move { this.read_settings().await }.boxed_local()
        };
        let factory = {
            let this = self.clone();
            Box::new(move || {
                let title = this.settings_tab_title();
                Tab::new(TabKind::Settings, title, TabNode::Collection(this.clone()))
            })
        };

        let result = explorer
            .tabs()
            .open(OpenTabOptions {
                kind: TabKind::Settings,
                trace,
                matches: Box::new(move |tab| {
                    tab.collection_rid().as_deref() == Some(rid.as_str())
                }),
                pending: Some(pending),
                prepare: Some(prepare),
                factory,
            })
            .await;

        if let Err(error) = &result {
            explorer.console().log(
                ConsoleMessageKind::Error,
                &format!(
                    "Error while fetching container settings for container {}: {}",
                    self.id(),
                    error
                ),
            );
        }
        result
    }

    /// Always creates a new tab, numbered after the existing query tabs.
    pub fn new_query_tab(self: &Rc<Self>, query_text: Option<String>) -> Rc<Tab> {
        let explorer = self.explorer();
        let number = explorer.tabs().get_tabs(TabKind::Query, None).len() + 1;
        let title = format!("Query {}", number);

        let token = explorer
            .telemetry()
            .trace_start(Action::Tab, self.tab_trace(title.clone()));
        let tab = Rc::new(Tab::new(TabKind::Query, title, TabNode::Collection(self.clone())));
        tab.set_load_start_key(token);
        tab.set_query_text(query_text);
        explorer.tabs().activate_new_tab(tab.clone());
        tab
    }

    /// Always creates a new tab, numbered after the existing graph tabs.
    pub fn new_graph_query_tab(self: &Rc<Self>) -> Rc<Tab> {
        let explorer = self.explorer();
        let number = explorer.tabs().get_tabs(TabKind::Graph, None).len() + 1;
        let title = format!("Graph Query {}", number);

        let token = explorer
            .telemetry()
            .trace_start(Action::Tab, self.tab_trace(title.clone()));
        let tab = Rc::new(Tab::new(TabKind::Graph, title, TabNode::Collection(self.clone())));
        tab.set_load_start_key(token);
        explorer.tabs().activate_new_tab(tab.clone());
        tab
    }

    /// Always creates a new tab, numbered after the existing shell tabs.
    pub fn new_shell_tab(self: &Rc<Self>) -> Rc<Tab> {
        let explorer = self.explorer();
        let number = explorer.tabs().get_tabs(TabKind::Shell, None).len() + 1;
        let title = format!("Shell {}", number);

        let tab = Rc::new(Tab::new(TabKind::Shell, title, TabNode::Collection(self.clone())));
        explorer.tabs().activate_new_tab(tab.clone());
        tab
    }

    /// Load quota info and this collection's offer: the two fetches join,
    /// then the offer detail (throughput info) folds into the stored offer.
    pub async fn read_settings(&self) -> Result<()> {
        let explorer = self.explorer();
        let telemetry = explorer.telemetry();
        explorer.set_is_refreshing(true);

        let trace = explorer
            .base_trace()
            .with_database(self.database_id.clone())
            .with_collection(self.id());
        let token = telemetry.trace_start(Action::LoadOffers, trace.clone());

        let quota = explorer.data_client().read_collection_quota_info(&self.database_id, &self.id());
        let offers = explorer.data_client().read_offers();
        let (mut quota, offers) = match try_join(quota, offers).await {
            Ok(result) => result,
            Err(error) => {
                explorer.set_is_refreshing(false);
                telemetry.trace_failure(Action::LoadOffers, trace.with_error(&error), token);
                return Err(error);
            }
        };
        explorer.set_is_refreshing(false);

        *self.unique_key_policy.borrow_mut() = quota.unique_key_policy.take();

        let offer = offers.iter().find(|offer| offer.resource.contains(&self.rid)).cloned();
        let Some(mut offer) = offer else {
            *self.quota_info.borrow_mut() = Some(quota);
            telemetry.trace_success(Action::LoadOffers, trace, token);
            return Ok(());
        };

        let detail = match explorer.data_client().read_offer(&offer).await {
            Ok(detail) => detail,
            Err(error) => {
                telemetry.trace_failure(Action::LoadOffers, trace.with_error(&error), token);
                return Err(error);
            }
        };

        if offer.is_not_v1() {
            let throughput_info =
                detail.content.as_ref().and_then(|content| content.collection_throughput_info.clone());
            offer.content.get_or_insert_with(Default::default).collection_throughput_info =
                throughput_info;
        }
        *self.offer.borrow_mut() = Some(offer);
        *self.quota_info.borrow_mut() = Some(quota);

        telemetry.trace_success(Action::LoadOffers, trace, token);
        Ok(())
    }

    // =========================================================================
    // Script children
    // =========================================================================

    pub fn children(&self) -> Vec<Rc<ScriptNode>> {
        self.children.borrow().clone()
    }

    pub fn stored_procedures(&self) -> Vec<Rc<ScriptNode>> {
        self.script_children(ScriptKind::StoredProcedure)
    }

    pub fn user_defined_functions(&self) -> Vec<Rc<ScriptNode>> {
        self.script_children(ScriptKind::UserDefinedFunction)
    }

    pub fn triggers(&self) -> Vec<Rc<ScriptNode>> {
        self.script_children(ScriptKind::Trigger)
    }

    fn script_children(&self, kind: ScriptKind) -> Vec<Rc<ScriptNode>> {
        self.children.borrow().iter().filter(|node| node.kind() == kind).cloned().collect()
    }

    /// Replace the children of one script kind with a fresh listing; other
    /// kinds are untouched.
    fn replace_script_children(&self, kind: ScriptKind, records: Vec<ScriptRecord>) {
        let mut children = self.children.borrow_mut();
        children.retain(|node| node.kind() != kind);
        children.extend(records.iter().map(|record| ScriptNode::new(kind, record)));
    }

    pub async fn load_stored_procedures(&self) -> Result<()> {
        let records = self
            .explorer()
            .data_client()
            .read_stored_procedures(&self.database_id, &self.id())
            .await?;
        self.replace_script_children(ScriptKind::StoredProcedure, records);
        Ok(())
    }

    pub async fn load_user_defined_functions(&self) -> Result<()> {
        let records = self
            .explorer()
            .data_client()
            .read_user_defined_functions(&self.database_id, &self.id())
            .await?;
        self.replace_script_children(ScriptKind::UserDefinedFunction, records);
        Ok(())
    }

    pub async fn load_triggers(&self) -> Result<()> {
        let records =
            self.explorer().data_client().read_triggers(&self.database_id, &self.id()).await?;
        self.replace_script_children(ScriptKind::Trigger, records);
        Ok(())
    }

    pub async fn expand_stored_procedures(&self) -> Result<()> {
        self.expand_script_subtree(
            ScriptKind::StoredProcedure,
            &self.is_stored_procedures_expanded,
            "Stored procedures node",
        )
        .await
    }

    pub async fn expand_user_defined_functions(&self) -> Result<()> {
        self.expand_script_subtree(
            ScriptKind::UserDefinedFunction,
            &self.is_user_defined_functions_expanded,
            "UDF node",
        )
        .await
    }

    pub async fn expand_triggers(&self) -> Result<()> {
        self.expand_script_subtree(ScriptKind::Trigger, &self.is_triggers_expanded, "Triggers node")
            .await
    }

    async fn expand_script_subtree(
        &self,
        kind: ScriptKind,
        flag: &Cell<bool>,
        description: &'static str,
    ) -> Result<()> {
        if flag.get() {
            return Ok(());
        }

        let load = match kind {
            ScriptKind::StoredProcedure => self.load_stored_procedures().boxed_local(),
            ScriptKind::UserDefinedFunction => self.load_user_defined_functions().boxed_local(),
            ScriptKind::Trigger => self.load_triggers().boxed_local(),
        };
        let explorer = self.explorer();
        match load.await {
            Ok(()) => {
                flag.set(true);
                explorer.telemetry().trace(
                    Action::ExpandTreeNode,
                    ActionModifier::Mark,
                    self.resource_tree_trace(description),
                );
                Ok(())
            }
            Err(error) => {
                explorer.telemetry().trace(
                    Action::ExpandTreeNode,
                    ActionModifier::Failed,
                    self.resource_tree_trace(description).with_error(&error),
                );
                Err(error)
            }
        }
    }

    pub fn is_stored_procedures_expanded(&self) -> bool {
        self.is_stored_procedures_expanded.get()
    }

    pub fn is_user_defined_functions_expanded(&self) -> bool {
        self.is_user_defined_functions_expanded.get()
    }

    pub fn is_triggers_expanded(&self) -> bool {
        self.is_triggers_expanded.get()
    }

    pub fn collapse_stored_procedures(&self) {
        self.collapse_script_subtree(&self.is_stored_procedures_expanded, "Stored procedures node");
    }

    pub fn collapse_user_defined_functions(&self) {
        self.collapse_script_subtree(&self.is_user_defined_functions_expanded, "UDF node");
    }

    pub fn collapse_triggers(&self) {
        self.collapse_script_subtree(&self.is_triggers_expanded, "Triggers node");
    }

    fn collapse_script_subtree(&self, flag: &Cell<bool>, description: &'static str) {
        if !flag.get() {
            return;
        }

        flag.set(false);
        let explorer = self.explorer();
        explorer.telemetry().trace(
            Action::CollapseTreeNode,
            ActionModifier::Mark,
            self.resource_tree_trace(description),
        );
    }

    pub fn create_stored_procedure_node(self: &Rc<Self>, record: &ScriptRecord) -> Rc<ScriptNode> {
        self.create_script_node(ScriptKind::StoredProcedure, record)
    }

    pub fn create_user_defined_function_node(
        self: &Rc<Self>,
        record: &ScriptRecord,
    ) -> Rc<ScriptNode> {
        self.create_script_node(ScriptKind::UserDefinedFunction, record)
    }

    pub fn create_trigger_node(self: &Rc<Self>, record: &ScriptRecord) -> Rc<ScriptNode> {
        self.create_script_node(ScriptKind::Trigger, record)
    }

    fn create_script_node(&self, kind: ScriptKind, record: &ScriptRecord) -> Rc<ScriptNode> {
        let node = ScriptNode::new(kind, record);
        self.children.borrow_mut().push(node.clone());
        if let Some(explorer) = self.container.upgrade() {
            explorer.set_selected_node(Some(NodeRef::Script(node.clone())));
        }
        node
    }

    pub fn find_stored_procedure_with_id(&self, script_id: &str) -> Option<Rc<ScriptNode>> {
        self.find_script_with_id(ScriptKind::StoredProcedure, script_id)
    }

    pub fn find_user_defined_function_with_id(&self, script_id: &str) -> Option<Rc<ScriptNode>> {
        self.find_script_with_id(ScriptKind::UserDefinedFunction, script_id)
    }

    pub fn find_trigger_with_id(&self, script_id: &str) -> Option<Rc<ScriptNode>> {
        self.find_script_with_id(ScriptKind::Trigger, script_id)
    }

    fn find_script_with_id(&self, kind: ScriptKind, script_id: &str) -> Option<Rc<ScriptNode>> {
        self.children
            .borrow()
            .iter()
            .find(|node| node.kind() == kind && node.id() == script_id)
            .cloned()
    }

    // =========================================================================
    // Document upload
    // =========================================================================

    /// Create documents from JSON file contents (a single document or an
    /// array per file). Failures are counted per file, never aborting the
    /// batch; a console summary is written per file with a capped error dump.
    pub async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<Vec<UploadDetailsRecord>> {
        if files.is_empty() {
            return Err(Error::InvalidInput("no files specified".into()));
        }

        let explorer = self.explorer();
        let console = explorer.console();
        let in_progress = console.log(
            ConsoleMessageKind::InProgress,
            &format!("Uploading and creating documents in container {}", self.id()),
        );
        let token = explorer.telemetry().trace_start(
            Action::UploadDocuments,
            explorer
                .base_trace()
                .with_database(self.database_id.clone())
                .with_collection(self.id()),
        );

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let mut record =
                UploadDetailsRecord { file_name: file.name.clone(), ..Default::default() };
            match serde_json::from_str::<Value>(&file.content) {
                Err(error) => {
                    record.num_failed += 1;
                    record.errors.push(error.to_string());
                }
                Ok(Value::Array(items)) => {
                    for item in items {
                        self.create_document_counted(&mut record, item).await;
                    }
                }
                Ok(value) => {
                    self.create_document_counted(&mut record, value).await;
                }
            }
            records.push(record);
        }

        console.clear(in_progress);
        self.log_upload_details(&records);
        explorer.telemetry().trace_success(
            Action::UploadDocuments,
            explorer
                .base_trace()
                .with_database(self.database_id.clone())
                .with_collection(self.id()),
            token,
        );

        let succeeded: u32 = records.iter().map(|record| record.num_succeeded).sum();
        let failed: u32 = records.iter().map(|record| record.num_failed).sum();
        explorer.events().emit(ExplorerEvent::DocumentsUploaded {
            collection_id: self.id(),
            succeeded,
            failed,
        });
        Ok(records)
    }

    async fn create_document_counted(&self, record: &mut UploadDetailsRecord, document: Value) {
        let explorer = self.explorer();
        match explorer
            .data_client()
            .create_document(&self.database_id, &self.id(), document)
            .await
        {
            Ok(_) => record.num_succeeded += 1,
            Err(error) => {
                record.num_failed += 1;
                record.errors.push(error.to_string());
            }
        }
    }

    fn log_upload_details(&self, records: &[UploadDetailsRecord]) {
        let explorer = self.explorer();
        let console = explorer.console();

        let succeeded: u32 = records.iter().map(|record| record.num_succeeded).sum();
        let failed: u32 = records.iter().map(|record| record.num_failed).sum();
        if succeeded == 0 {
            console.log(
                ConsoleMessageKind::Error,
                &format!("Failed to upload all documents to container {}", self.id()),
            );
        } else if failed > 0 {
            console.log(
                ConsoleMessageKind::Error,
                &format!(
                    "Failed to upload {} of {} documents to container {}",
                    failed,
                    succeeded + failed,
                    self.id()
                ),
            );
        } else {
            console.log(
                ConsoleMessageKind::Info,
                &format!(
                    "Successfully uploaded all {} documents to container {}",
                    succeeded,
                    self.id()
                ),
            );
        }

        let mut dumped = 0;
        'files: for record in records {
            for error in &record.errors {
                if dumped >= UPLOAD_ERROR_DUMP_LIMIT {
                    break 'files;
                }
                console.log(
                    ConsoleMessageKind::Error,
                    &format!(
                        "Document creation error for container {} - file {}: {}",
                        self.id(),
                        record.file_name,
                        error
                    ),
                );
                dumped += 1;
            }
        }

        for record in records {
            let kind = if record.num_failed > 0 {
                ConsoleMessageKind::Error
            } else {
                ConsoleMessageKind::Info
            };
            console.log(
                kind,
                &format!(
                    "Item creation summary for container {} - file {}: {} items created, {} errors",
                    self.id(),
                    record.file_name,
                    record.num_succeeded,
                    record.num_failed
                ),
            );
        }
    }

    /// Find the throughput-update notification for this collection, if one
    /// is pending. Fetch failures resolve to None after logging.
    pub(crate) async fn pending_throughput_notification(&self) -> Option<NotificationRecord> {
        let explorer = self.container.upgrade()?;
        match explorer.notifications_client().fetch_notifications().await {
            Ok(notifications) => {
                let id = self.id();
                notifications.into_iter().find(|notification| {
                    notification.kind == "message"
                        && notification.collection_name.as_deref() == Some(id.as_str())
                        && notification
                            .description
                            .as_deref()
                            .is_some_and(|description| THROUGHPUT_UPDATE.is_match(description))
                })
            }
            Err(error) => {
                log::error!(
                    "Failed to fetch pending notifications for container {}: {}",
                    self.id(),
                    error
                );
                None
            }
        }
    }

    fn resource_tree_trace(&self, description: &'static str) -> crate::telemetry::TraceContext {
        self.explorer()
            .base_trace()
            .with_area(Area::ResourceTree)
            .with_description(description)
            .with_database(self.database_id.clone())
            .with_collection(self.id())
    }

    fn tab_trace(&self, title: impl Into<String>) -> crate::telemetry::TraceContext {
        self.explorer()
            .base_trace()
            .with_area(Area::Tab)
            .with_database(self.database_id.clone())
            .with_collection(self.id())
            .with_tab_title(title)
    }
}

/// Derive the flat partition key property ("pk.nested") and its header
/// ("/pk/nested") from the first partition key path. Mongo paths may carry
/// `$v` segments and quoted components that are stripped.
fn partition_key_property(paths: &[String], mongo: bool) -> (Option<String>, Option<String>) {
    let Some(first) = paths.first() else {
        return (None, None);
    };

    let mut header = first.clone();
    let mut property: String = first
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
        .replace('\'', "");

    if mongo && property.contains('"') {
        property = property.replace('"', "");
    }

    if mongo && property.contains("$v") {
        // From $v.shard.$v.key.$v > shard.key
        property = property.replace(".$v", "").replace("$v.", "");
        header = format!("/{}", property);
    }

    if property.is_empty() {
        (None, None)
    } else {
        (Some(property), Some(header))
    }
}
