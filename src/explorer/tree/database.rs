//! Database node: owns its collection children and reconciles them against
//! the store's listings.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::try_join;

use crate::console::ConsoleMessageKind;
use crate::error::Result;
use crate::events::ExplorerEvent;
use crate::explorer::tabs::{OpenTabOptions, Tab, TabKind, TabNode};
use crate::explorer::{Explorer, NodeRef};
use crate::models::{DatabaseRecord, NotificationRecord, OfferRecord, ReadDatabaseOfferParams};
use crate::telemetry::{Action, ActionModifier, Area};

use super::collection::Collection;
use super::{THROUGHPUT_UPDATE, reconcile_children};

pub struct Database {
    container: Weak<Explorer>,
    rid: String,
    self_link: String,
    id: RefCell<String>,
    offer: RefCell<Option<OfferRecord>>,
    collections: RefCell<Vec<Rc<Collection>>>,
    is_expanded: Cell<bool>,
    load_in_flight: Cell<bool>,
    selected_subnode: Cell<Option<TabKind>>,
}

impl Database {
    pub(crate) fn new(container: Weak<Explorer>, record: &DatabaseRecord) -> Rc<Self> {
        Rc::new(Self {
            container,
            rid: record.rid.clone(),
            self_link: record.self_link.clone(),
            id: RefCell::new(record.id.clone()),
            offer: RefCell::new(None),
            collections: RefCell::new(Vec::new()),
            is_expanded: Cell::new(false),
            load_in_flight: Cell::new(false),
            selected_subnode: Cell::new(None),
        })
    }

    fn explorer(&self) -> Rc<Explorer> {
        self.container.upgrade().expect("explorer dropped while database node in use")
    }

    pub fn rid(&self) -> &str {
        &self.rid
    }

    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    pub fn id(&self) -> String {
        self.id.borrow().clone()
    }

    /// Display id only; identity (`rid`) never changes.
    pub fn set_id(&self, id: impl Into<String>) {
        *self.id.borrow_mut() = id.into();
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded.get()
    }

    /// Shared-throughput databases carry an offer of their own.
    pub fn is_shared(&self) -> bool {
        self.offer.borrow().is_some()
    }

    pub fn offer(&self) -> Option<OfferRecord> {
        self.offer.borrow().clone()
    }

    pub fn collections(&self) -> Vec<Rc<Collection>> {
        self.collections.borrow().clone()
    }

    pub fn find_collection_with_id(&self, collection_id: &str) -> Option<Rc<Collection>> {
        self.collections
            .borrow()
            .iter()
            .find(|collection| collection.id() == collection_id)
            .cloned()
    }

    pub fn selected_subnode(&self) -> Option<TabKind> {
        self.selected_subnode.get()
    }

    pub fn select(self: &Rc<Self>) {
        let explorer = self.explorer();
        explorer.set_selected_node(Some(NodeRef::Database(self.clone())));
        explorer.telemetry().trace(
            Action::SelectItem,
            ActionModifier::Mark,
            explorer.base_trace().with_area(Area::ResourceTree).with_description("Database node"),
        );
    }

    pub fn is_node_selected(&self) -> bool {
        let Some(explorer) = self.container.upgrade() else {
            return false;
        };
        !self.is_expanded()
            && explorer
                .selected_node()
                .is_some_and(|node| node.node_kind() == "Database" && node.rid() == self.rid)
    }

    /// Expand the node: fetch the offer and reconcile children, then flip
    /// the expansion flag. No-op if already expanded or a load is in flight,
    /// so concurrent calls cannot race a second child fetch. On failure the
    /// flag stays false and the error propagates after a failure trace.
    pub async fn expand(&self) -> Result<()> {
        if self.is_expanded.get() || self.load_in_flight.get() {
            return Ok(());
        }

        self.load_in_flight.set(true);
        let result = try_join(self.load_offer(), self.load_collections()).await;
        self.load_in_flight.set(false);

        let explorer = self.explorer();
        let trace =
            explorer.base_trace().with_area(Area::ResourceTree).with_description("Database node");
        match result {
            Ok(_) => {
                self.is_expanded.set(true);
                explorer.telemetry().trace(Action::ExpandTreeNode, ActionModifier::Mark, trace);
                explorer.events().emit(ExplorerEvent::NodeExpanded { rid: self.rid.clone() });
                Ok(())
            }
            Err(error) => {
                explorer.telemetry().trace(
                    Action::ExpandTreeNode,
                    ActionModifier::Failed,
                    trace.with_error(&error),
                );
                Err(error)
            }
        }
    }

    /// Collapse without evicting loaded children; re-expanding is cheap.
    pub fn collapse(&self) {
        if !self.is_expanded.get() {
            return;
        }

        self.is_expanded.set(false);
        let explorer = self.explorer();
        explorer.telemetry().trace(
            Action::CollapseTreeNode,
            ActionModifier::Mark,
            explorer.base_trace().with_area(Area::ResourceTree).with_description("Database node"),
        );
        explorer.events().emit(ExplorerEvent::NodeCollapsed { rid: self.rid.clone() });
    }

    /// Fetch the current listing and merge it into the child set. Children
    /// present in both keep their instance, so their expansion flags and any
    /// tabs bound to them survive. A failed fetch changes nothing.
    pub async fn load_collections(&self) -> Result<()> {
        let explorer = self.explorer();
        let database_id = self.id();
        let records = explorer.data_client().list_collections(&database_id).await?;

        let current = self.collections.borrow().clone();
        let next = reconcile_children(
            &current,
            &records,
            |record| record.rid.as_str(),
            |collection| collection.rid(),
            |collection| collection.id(),
            |record| Collection::new(self.container.clone(), database_id.clone(), record),
        )?;
        let count = next.len();
        *self.collections.borrow_mut() = next;

        explorer
            .events()
            .emit(ExplorerEvent::CollectionsLoaded { database_id: self.id(), count });
        Ok(())
    }

    /// Read the database's shared offer, once. Serverless accounts have no
    /// offers to read.
    pub async fn load_offer(&self) -> Result<()> {
        let explorer = self.explorer();
        if explorer.is_serverless_enabled() || self.offer.borrow().is_some() {
            return Ok(());
        }

        let params = ReadDatabaseOfferParams {
            database_id: self.id(),
            database_resource_id: self.self_link.clone(),
        };
        let offer = explorer.data_client().read_database_offer(params).await?;
        *self.offer.borrow_mut() = offer;
        Ok(())
    }

    /// Open (or re-activate) the database's scale settings tab.
    pub async fn open_settings_tab(self: &Rc<Self>) -> Result<Rc<Tab>> {
        let explorer = self.explorer();
        explorer.set_selected_node(Some(NodeRef::Database(self.clone())));
        self.selected_subnode.set(Some(TabKind::DatabaseSettings));
        explorer.telemetry().trace(
            Action::SelectItem,
            ActionModifier::Mark,
            explorer.base_trace().with_area(Area::ResourceTree).with_description("Settings node"),
        );

        let trace = explorer
            .base_trace()
            .with_area(Area::Tab)
            .with_database(self.id())
            .with_tab_title("Scale");
        let rid = self.rid.clone();
        let pending = {
            let this = self.clone();
            async move { this.pending_throughput_notification().await }.boxed_local()
        };
        let node = TabNode::Database(self.clone());

        let result = explorer
            .tabs()
            .open(OpenTabOptions {
                kind: TabKind::DatabaseSettings,
                trace,
                matches: Box::new(move |tab| tab.node_rid() == rid),
                pending: Some(pending),
                prepare: None,
                factory: Box::new(move || Tab::new(TabKind::DatabaseSettings, "Scale", node)),
            })
            .await;

        if let Err(error) = &result {
            explorer.console().log(
                ConsoleMessageKind::Error,
                &format!(
                    "Error while fetching database settings for database {}: {}",
                    self.id(),
                    error
                ),
            );
        }
        result
    }

    /// Find the throughput-update notification for this database, if one is
    /// pending. Fetch failures resolve to None after logging; absence of a
    /// notification is a valid resting state.
    pub(crate) async fn pending_throughput_notification(&self) -> Option<NotificationRecord> {
        let explorer = self.container.upgrade()?;
        match explorer.notifications_client().fetch_notifications().await {
            Ok(notifications) => {
                let id = self.id();
                notifications.into_iter().find(|notification| {
                    notification.kind == "message"
                        && notification.collection_name.is_none()
                        && notification.database_name.as_deref() == Some(id.as_str())
                        && notification
                            .description
                            .as_deref()
                            .is_some_and(|description| THROUGHPUT_UPDATE.is_match(description))
                })
            }
            Err(error) => {
                log::error!(
                    "Failed to fetch pending notifications for database {}: {}",
                    self.id(),
                    error
                );
                None
            }
        }
    }
}
