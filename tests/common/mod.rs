//! Shared fixtures: scripted fake collaborators driving the explorer core.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use uuid::Uuid;

use nimbus::clients::{DataClient, NotificationsClient};
use nimbus::console::{ConsoleMessageKind, ConsoleSink};
use nimbus::error::{Error, Result};
use nimbus::models::{
    CollectionRecord, DatabaseRecord, Experience, NotificationRecord, OfferRecord, QuotaRecord,
    ReadDatabaseOfferParams, ScriptDefinition, ScriptRecord,
};
use nimbus::telemetry::{Action, ActionModifier, TelemetrySink, TraceContext, TraceToken};
use nimbus::{Explorer, ExplorerClients, ExplorerOptions};

pub fn database_record(rid: &str, id: &str) -> DatabaseRecord {
    DatabaseRecord {
        rid: rid.to_string(),
        self_link: format!("dbs/{}", rid),
        id: id.to_string(),
    }
}

pub fn collection_record(rid: &str, id: &str) -> CollectionRecord {
    CollectionRecord {
        rid: rid.to_string(),
        self_link: format!("dbs/d1/colls/{}", rid),
        id: id.to_string(),
        partition_key: None,
        default_ttl: None,
        analytical_storage_ttl: None,
        indexing_policy: None,
        conflict_resolution_policy: None,
        change_feed_policy: None,
        geospatial_config: None,
    }
}

pub fn script_record(rid: &str, id: &str) -> ScriptRecord {
    ScriptRecord {
        rid: rid.to_string(),
        self_link: format!("dbs/d1/colls/c1/sprocs/{}", rid),
        id: id.to_string(),
        body: "function() {}".to_string(),
        trigger_type: None,
        trigger_operation: None,
    }
}

/// A notification the throughput-update pattern matches.
pub fn throughput_notification(
    database_name: Option<&str>,
    collection_name: Option<&str>,
) -> NotificationRecord {
    NotificationRecord {
        id: Some("n1".to_string()),
        kind: "message".to_string(),
        database_name: database_name.map(str::to_string),
        collection_name: collection_name.map(str::to_string),
        description: Some("Throughput update (36000 RU/s) in progress".to_string()),
    }
}

/// Offer provisioning the collection with the given rid.
pub fn collection_offer(rid: &str) -> OfferRecord {
    OfferRecord {
        id: format!("offer-{}", rid),
        resource: format!("dbs/d1/colls/{}", rid),
        offer_version: Some("V2".to_string()),
        content: None,
    }
}

#[derive(Default)]
pub struct FakeDataClient {
    pub databases: RefCell<Vec<DatabaseRecord>>,
    pub collections: RefCell<HashMap<String, Vec<CollectionRecord>>>,
    pub database_offers: RefCell<HashMap<String, OfferRecord>>,
    pub offers: RefCell<Vec<OfferRecord>>,
    pub quota: RefCell<QuotaRecord>,
    pub scripts: RefCell<Vec<ScriptRecord>>,

    pub fail_list_databases: Cell<bool>,
    pub fail_list_collections: Cell<bool>,
    pub fail_quota: Cell<bool>,
    pub fail_offers: Cell<bool>,
    pub fail_create_document: Cell<bool>,
    pub fail_delete: Cell<bool>,
    pub fail_create_script: Cell<bool>,
    /// Force a suspension point inside every fetch, so fetches take
    /// "nonzero time" and concurrent callers interleave.
    pub yield_before_reply: Cell<bool>,

    pub list_databases_calls: Cell<usize>,
    pub list_collections_calls: Cell<usize>,
    pub read_database_offer_calls: Cell<usize>,
    pub quota_calls: Cell<usize>,
    pub read_offers_calls: Cell<usize>,
    pub read_offer_calls: Cell<usize>,
    pub create_document_calls: Cell<usize>,

    pub created_documents: RefCell<Vec<Value>>,
    pub deleted_collections: RefCell<Vec<(String, String)>>,
    pub deleted_databases: RefCell<Vec<String>>,
}

impl FakeDataClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn set_collections(&self, database_id: &str, records: Vec<CollectionRecord>) {
        self.collections.borrow_mut().insert(database_id.to_string(), records);
    }

    fn reply<T: 'static>(
        &self,
        fail: bool,
        what: &'static str,
        value: T,
    ) -> LocalBoxFuture<'static, Result<T>> {
        let pause = self.yield_before_reply.get();
        async move {
            if pause {
                tokio::task::yield_now().await;
            }
            if fail { Err(Error::fetch(format!("{} unavailable", what))) } else { Ok(value) }
        }
        .boxed_local()
    }
}

impl DataClient for FakeDataClient {
    fn list_databases(&self) -> LocalBoxFuture<'static, Result<Vec<DatabaseRecord>>> {
        self.list_databases_calls.set(self.list_databases_calls.get() + 1);
        self.reply(self.fail_list_databases.get(), "database listing", self.databases.borrow().clone())
    }

    fn list_collections(
        &self,
        database_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<CollectionRecord>>> {
        self.list_collections_calls.set(self.list_collections_calls.get() + 1);
        let records =
            self.collections.borrow().get(database_id).cloned().unwrap_or_default();
        self.reply(self.fail_list_collections.get(), "collection listing", records)
    }

    fn read_database_offer(
        &self,
        params: ReadDatabaseOfferParams,
    ) -> LocalBoxFuture<'static, Result<Option<OfferRecord>>> {
        self.read_database_offer_calls.set(self.read_database_offer_calls.get() + 1);
        let offer = self.database_offers.borrow().get(&params.database_id).cloned();
        self.reply(false, "database offer", offer)
    }

    fn read_collection_quota_info(
        &self,
        _database_id: &str,
        _collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<QuotaRecord>> {
        self.quota_calls.set(self.quota_calls.get() + 1);
        self.reply(self.fail_quota.get(), "quota info", self.quota.borrow().clone())
    }

    fn read_offers(&self) -> LocalBoxFuture<'static, Result<Vec<OfferRecord>>> {
        self.read_offers_calls.set(self.read_offers_calls.get() + 1);
        self.reply(self.fail_offers.get(), "offer listing", self.offers.borrow().clone())
    }

    fn read_offer(&self, offer: &OfferRecord) -> LocalBoxFuture<'static, Result<OfferRecord>> {
        self.read_offer_calls.set(self.read_offer_calls.get() + 1);
        self.reply(false, "offer detail", offer.clone())
    }

    fn read_stored_procedures(
        &self,
        _database_id: &str,
        _collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<ScriptRecord>>> {
        self.reply(false, "stored procedure listing", self.scripts.borrow().clone())
    }

    fn read_user_defined_functions(
        &self,
        _database_id: &str,
        _collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<ScriptRecord>>> {
        self.reply(false, "udf listing", self.scripts.borrow().clone())
    }

    fn read_triggers(
        &self,
        _database_id: &str,
        _collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<ScriptRecord>>> {
        self.reply(false, "trigger listing", self.scripts.borrow().clone())
    }

    fn create_document(
        &self,
        _database_id: &str,
        _collection_id: &str,
        document: Value,
    ) -> LocalBoxFuture<'static, Result<Value>> {
        self.create_document_calls.set(self.create_document_calls.get() + 1);
        if !self.fail_create_document.get() {
            self.created_documents.borrow_mut().push(document.clone());
        }
        self.reply(self.fail_create_document.get(), "document create", document)
    }

    fn create_stored_procedure(
        &self,
        database_id: &str,
        collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>> {
        self.create_script(database_id, collection_id, definition)
    }

    fn create_user_defined_function(
        &self,
        database_id: &str,
        collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>> {
        self.create_script(database_id, collection_id, definition)
    }

    fn create_trigger(
        &self,
        database_id: &str,
        collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>> {
        self.create_script(database_id, collection_id, definition)
    }

    fn delete_collection(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<()>> {
        if !self.fail_delete.get() {
            self.deleted_collections
                .borrow_mut()
                .push((database_id.to_string(), collection_id.to_string()));
            if let Some(records) = self.collections.borrow_mut().get_mut(database_id) {
                records.retain(|record| record.id != collection_id);
            }
        }
        self.reply(self.fail_delete.get(), "collection delete", ())
    }

    fn delete_database(&self, database_id: &str) -> LocalBoxFuture<'static, Result<()>> {
        if !self.fail_delete.get() {
            self.deleted_databases.borrow_mut().push(database_id.to_string());
            self.databases.borrow_mut().retain(|record| record.id != database_id);
        }
        self.reply(self.fail_delete.get(), "database delete", ())
    }
}

impl FakeDataClient {
    fn create_script(
        &self,
        _database_id: &str,
        _collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>> {
        let record = ScriptRecord {
            rid: format!("rid-{}", definition.id),
            self_link: format!("dbs/d1/colls/c1/scripts/{}", definition.id),
            id: definition.id,
            body: definition.body,
            trigger_type: definition.trigger_type,
            trigger_operation: definition.trigger_operation,
        };
        self.reply(self.fail_create_script.get(), "script create", record)
    }
}

#[derive(Default)]
pub struct FakeNotificationsClient {
    pub notifications: RefCell<Vec<NotificationRecord>>,
    pub fail: Cell<bool>,
    pub calls: Cell<usize>,
}

impl FakeNotificationsClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }
}

impl NotificationsClient for FakeNotificationsClient {
    fn fetch_notifications(&self) -> LocalBoxFuture<'static, Result<Vec<NotificationRecord>>> {
        self.calls.set(self.calls.get() + 1);
        let fail = self.fail.get();
        let notifications = self.notifications.borrow().clone();
        async move {
            if fail {
                Err(Error::fetch("notification feed unavailable"))
            } else {
                Ok(notifications)
            }
        }
        .boxed_local()
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub traces: RefCell<Vec<(Action, ActionModifier)>>,
    next_token: Cell<TraceToken>,
}

impl RecordingTelemetry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn count(&self, action: Action, modifier: ActionModifier) -> usize {
        self.traces
            .borrow()
            .iter()
            .filter(|(traced_action, traced_modifier)| {
                *traced_action == action && *traced_modifier == modifier
            })
            .count()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn trace(&self, action: Action, modifier: ActionModifier, _context: TraceContext) {
        self.traces.borrow_mut().push((action, modifier));
    }

    fn trace_start(&self, action: Action, _context: TraceContext) -> TraceToken {
        self.traces.borrow_mut().push((action, ActionModifier::Start));
        let token = self.next_token.get() + 1;
        self.next_token.set(token);
        token
    }

    fn trace_success(&self, action: Action, _context: TraceContext, _token: TraceToken) {
        self.traces.borrow_mut().push((action, ActionModifier::Success));
    }

    fn trace_failure(&self, action: Action, _context: TraceContext, _token: TraceToken) {
        self.traces.borrow_mut().push((action, ActionModifier::Failed));
    }
}

#[derive(Default)]
pub struct RecordingConsole {
    pub messages: RefCell<Vec<(ConsoleMessageKind, String)>>,
    pub cleared: RefCell<Vec<Uuid>>,
}

impl RecordingConsole {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn contains(&self, kind: ConsoleMessageKind, needle: &str) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|(logged_kind, message)| *logged_kind == kind && message.contains(needle))
    }
}

impl ConsoleSink for RecordingConsole {
    fn log(&self, kind: ConsoleMessageKind, message: &str) -> Uuid {
        self.messages.borrow_mut().push((kind, message.to_string()));
        Uuid::new_v4()
    }

    fn clear(&self, id: Uuid) {
        self.cleared.borrow_mut().push(id);
    }
}

pub struct TestBed {
    pub explorer: Rc<Explorer>,
    pub data: Rc<FakeDataClient>,
    pub notifications: Rc<FakeNotificationsClient>,
    pub telemetry: Rc<RecordingTelemetry>,
    pub console: Rc<RecordingConsole>,
}

pub fn explorer_with_experience(experience: Experience) -> TestBed {
    let _ = env_logger::builder().is_test(true).try_init();

    let data = FakeDataClient::new();
    let notifications = FakeNotificationsClient::new();
    let telemetry = RecordingTelemetry::new();
    let console = RecordingConsole::new();

    let explorer = Explorer::new(
        ExplorerOptions {
            account_name: "contoso-test".to_string(),
            experience,
            serverless_enabled: false,
            multi_write_enabled: true,
        },
        ExplorerClients {
            data: data.clone(),
            notifications: notifications.clone(),
            telemetry: telemetry.clone(),
            console: console.clone(),
        },
    );

    TestBed { explorer, data, notifications, telemetry, console }
}

pub fn explorer() -> TestBed {
    explorer_with_experience(Experience::Sql)
}

/// Seed one database with the given collections and load the database list.
pub async fn seeded_database(
    bed: &TestBed,
    database: (&str, &str),
    collections: &[(&str, &str)],
) -> Rc<nimbus::Database> {
    let (rid, id) = database;
    bed.data.databases.borrow_mut().push(database_record(rid, id));
    bed.data.set_collections(
        id,
        collections.iter().map(|(rid, id)| collection_record(rid, id)).collect(),
    );
    bed.explorer.load_databases().await.expect("failed to load databases");
    bed.explorer.find_database_with_id(id).expect("database missing after load")
}
