//! Tab lifecycle coordination.
//!
//! The manager owns the open-tab set and enforces at-most-one tab per
//! (node identity, kind) pair for deduplicated kinds. Ad hoc query, shell
//! and graph-query tabs bypass dedup and are numbered by current count + 1.
//! All mutation goes through the methods here; external code reads tabs but
//! never edits the set directly.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::{LocalBoxFuture, join, join_all};
use serde::{Deserialize, Serialize};

use crate::console::ConsoleMessageKind;
use crate::error::Result;
use crate::events::ExplorerEvent;
use crate::models::NotificationRecord;
use crate::telemetry::{Action, TraceContext, TraceToken};

use super::Explorer;
use super::tree::{Collection, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabKind {
    Documents,
    Settings,
    DatabaseSettings,
    Query,
    Graph,
    QueryTables,
    Conflicts,
    Shell,
}

impl TabKind {
    /// Kinds exempt from the one-tab-per-node rule. Ad hoc graph queries are
    /// also multi-instance but share `Graph` with the deduplicated graph
    /// documents view, so they are exempted at their creation path instead.
    pub fn is_multi_instance(self) -> bool {
        matches!(self, TabKind::Query | TabKind::Shell)
    }
}

/// The tree node a tab is bound to. Tabs rebind to updated node state
/// through this reference, so a listing refresh never detaches them.
#[derive(Clone)]
pub enum TabNode {
    Database(Rc<Database>),
    Collection(Rc<Collection>),
}

impl TabNode {
    pub fn rid(&self) -> String {
        match self {
            TabNode::Database(database) => database.rid().to_string(),
            TabNode::Collection(collection) => collection.rid().to_string(),
        }
    }

    pub fn database_id(&self) -> String {
        match self {
            TabNode::Database(database) => database.id(),
            TabNode::Collection(collection) => collection.database_id().to_string(),
        }
    }

    pub fn collection_id(&self) -> Option<String> {
        match self {
            TabNode::Database(_) => None,
            TabNode::Collection(collection) => Some(collection.id()),
        }
    }

    pub fn as_database(&self) -> Option<&Rc<Database>> {
        match self {
            TabNode::Database(database) => Some(database),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Rc<Collection>> {
        match self {
            TabNode::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

/// Data-refresh hook bound by the view layer; re-run on refresh requests.
pub type RefreshFn = Rc<dyn Fn(&Tab) -> LocalBoxFuture<'static, Result<()>>>;

pub struct Tab {
    kind: TabKind,
    title: RefCell<String>,
    node: TabNode,
    is_active: Cell<bool>,
    pending_notification: RefCell<Option<NotificationRecord>>,
    refresh: RefCell<Option<RefreshFn>>,
    load_start_key: Cell<Option<TraceToken>>,
    query_text: RefCell<Option<String>>,
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("kind", &self.kind)
            .field("title", &self.title.borrow())
            .field("node", &self.node.rid())
            .field("is_active", &self.is_active.get())
            .field("load_start_key", &self.load_start_key.get())
            .field("query_text", &self.query_text.borrow())
            .field("has_refresh", &self.refresh.borrow().is_some())
            .finish()
    }
}

impl Tab {
    pub fn new(kind: TabKind, title: impl Into<String>, node: TabNode) -> Self {
        Self {
            kind,
            title: RefCell::new(title.into()),
            node,
            is_active: Cell::new(false),
            pending_notification: RefCell::new(None),
            refresh: RefCell::new(None),
            load_start_key: Cell::new(None),
            query_text: RefCell::new(None),
        }
    }

    pub fn kind(&self) -> TabKind {
        self.kind
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.borrow_mut() = title.into();
    }

    pub fn node(&self) -> &TabNode {
        &self.node
    }

    pub fn node_rid(&self) -> String {
        self.node.rid()
    }

    pub fn collection_rid(&self) -> Option<String> {
        self.node.as_collection().map(|collection| collection.rid().to_string())
    }

    pub fn is_active(&self) -> bool {
        self.is_active.get()
    }

    pub fn pending_notification(&self) -> Option<NotificationRecord> {
        self.pending_notification.borrow().clone()
    }

    pub fn set_pending_notification(&self, notification: Option<NotificationRecord>) {
        *self.pending_notification.borrow_mut() = notification;
    }

    pub fn set_refresh(&self, refresh: RefreshFn) {
        *self.refresh.borrow_mut() = Some(refresh);
    }

    /// Telemetry token from the open that created this tab; the shell pairs
    /// it with a success trace once the first content load lands.
    pub fn load_start_key(&self) -> Option<TraceToken> {
        self.load_start_key.get()
    }

    pub(crate) fn set_load_start_key(&self, token: TraceToken) {
        self.load_start_key.set(Some(token));
    }

    pub fn query_text(&self) -> Option<String> {
        self.query_text.borrow().clone()
    }

    pub fn set_query_text(&self, text: Option<String>) {
        *self.query_text.borrow_mut() = text;
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.is_active.set(active);
    }
}

/// Everything `TabsManager::open` needs to open-or-activate one tab.
pub(crate) struct OpenTabOptions {
    pub kind: TabKind,
    pub trace: TraceContext,
    /// Uniqueness predicate over tabs of `kind`; some kinds match by node
    /// identity alone, others need ancillary context.
    pub matches: Box<dyn Fn(&Tab) -> bool>,
    /// Pending-notification fetch. Never fails: fetch errors resolve to None.
    pub pending: Option<LocalBoxFuture<'static, Option<NotificationRecord>>>,
    /// Settings prefetch the tab needs before it can render.
    pub prepare: Option<LocalBoxFuture<'static, Result<()>>>,
    pub factory: Box<dyn FnOnce() -> Tab>,
}

pub struct TabsManager {
    explorer: Weak<Explorer>,
    tabs: RefCell<Vec<Rc<Tab>>>,
    active: RefCell<Option<Rc<Tab>>>,
}

impl TabsManager {
    pub(crate) fn new(explorer: Weak<Explorer>) -> Self {
        Self { explorer, tabs: RefCell::new(Vec::new()), active: RefCell::new(None) }
    }

    fn explorer(&self) -> Rc<Explorer> {
        self.explorer.upgrade().expect("explorer dropped while tabs manager in use")
    }

    /// All open tabs, in creation order.
    pub fn tabs(&self) -> Vec<Rc<Tab>> {
        self.tabs.borrow().clone()
    }

    /// Tabs of one kind, optionally filtered, in creation order.
    pub fn get_tabs(
        &self,
        kind: TabKind,
        predicate: Option<&dyn Fn(&Tab) -> bool>,
    ) -> Vec<Rc<Tab>> {
        self.tabs
            .borrow()
            .iter()
            .filter(|tab| tab.kind() == kind)
            .filter(|tab| predicate.is_none_or(|predicate| predicate(tab)))
            .cloned()
            .collect()
    }

    pub fn active_tab(&self) -> Option<Rc<Tab>> {
        self.active.borrow().clone()
    }

    /// Bring a tab to the foreground.
    pub fn activate_tab(&self, tab: &Rc<Tab>) {
        let previous = self.active.borrow_mut().replace(tab.clone());
        if let Some(previous) = previous
            && !Rc::ptr_eq(&previous, tab)
        {
            previous.set_active(false);
        }
        tab.set_active(true);
        self.explorer()
            .events()
            .emit(ExplorerEvent::TabActivated { kind: tab.kind(), title: tab.title() });
    }

    /// Add a freshly constructed tab and bring it to the foreground.
    pub fn activate_new_tab(&self, tab: Rc<Tab>) {
        self.tabs.borrow_mut().push(tab.clone());
        self.explorer()
            .events()
            .emit(ExplorerEvent::TabOpened { kind: tab.kind(), title: tab.title() });
        self.activate_tab(&tab);
    }

    /// Open-or-activate path shared by the deduplicated tab kinds.
    ///
    /// An existing match is activated after reattaching a fresh pending
    /// notification; only the full creation path runs the settings prefetch.
    /// Creation joins both fetches before constructing the tab. On prefetch
    /// failure the tab is not created: the failure is traced against the
    /// open's start token and re-raised.
    ///
    /// Two concurrent opens for the same (node, kind) can both reach the
    /// creation path; user gestures serialize on the coordinator thread, so
    /// uniqueness is best-effort across suspension points by design.
    pub(crate) async fn open(&self, options: OpenTabOptions) -> Result<Rc<Tab>> {
        let OpenTabOptions { kind, trace, matches, pending, prepare, factory } = options;

        if let Some(existing) = self.get_tabs(kind, Some(&*matches)).into_iter().next() {
            if let Some(pending) = pending {
                existing.set_pending_notification(pending.await);
            }
            self.activate_tab(&existing);
            self.run_refresh_hook(&existing).await;
            return Ok(existing);
        }

        let telemetry = self.explorer().telemetry();
        let token = telemetry.trace_start(Action::Tab, trace.clone());

        let pending = async {
            match pending {
                Some(future) => future.await,
                None => None,
            }
        };
        let prepare = async {
            match prepare {
                Some(future) => future.await,
                None => Ok(()),
            }
        };
        let (notification, prepared) = join(pending, prepare).await;

        if let Err(error) = prepared {
            telemetry.trace_failure(Action::Tab, trace.with_error(&error), token);
            return Err(error);
        }

        let tab = Rc::new(factory());
        tab.set_load_start_key(token);
        tab.set_pending_notification(notification);
        self.activate_new_tab(tab.clone());
        Ok(tab)
    }

    /// Re-run the bound refresh of every open tab matching the predicate.
    /// Refreshes run together; one tab's failure never blocks another's.
    pub async fn refresh_matching(&self, predicate: &dyn Fn(&Tab) -> bool) {
        let targets: Vec<Rc<Tab>> =
            self.tabs.borrow().iter().filter(|tab| predicate(tab)).cloned().collect();

        join_all(targets.iter().map(|tab| self.run_refresh_hook(tab))).await;
    }

    async fn run_refresh_hook(&self, tab: &Rc<Tab>) {
        let hook = tab.refresh.borrow().clone();
        let Some(hook) = hook else {
            return;
        };
        if let Err(error) = hook(tab).await {
            let explorer = self.explorer();
            explorer.console().log(
                ConsoleMessageKind::Error,
                &format!("Error while refreshing tab {}: {}", tab.title(), error),
            );
            explorer
                .events()
                .emit(ExplorerEvent::TabRefreshFailed { title: tab.title(), error: error.to_string() });
        }
    }

    /// Close a tab. Closing the foreground tab activates its neighbor.
    pub fn close_tab(&self, tab: &Rc<Tab>) {
        let index = {
            let mut tabs = self.tabs.borrow_mut();
            let Some(index) = tabs.iter().position(|open| Rc::ptr_eq(open, tab)) else {
                return;
            };
            tabs.remove(index);
            index
        };

        let was_active =
            self.active.borrow().as_ref().is_some_and(|active| Rc::ptr_eq(active, tab));
        tab.set_active(false);

        if was_active {
            *self.active.borrow_mut() = None;
            let next = {
                let tabs = self.tabs.borrow();
                if tabs.is_empty() {
                    None
                } else {
                    tabs.get(index.min(tabs.len() - 1)).cloned()
                }
            };
            if let Some(next) = next {
                self.activate_tab(&next);
            }
        }

        self.explorer()
            .events()
            .emit(ExplorerEvent::TabClosed { kind: tab.kind(), title: tab.title() });
    }

    /// Close every tab matching the predicate (e.g. after a delete).
    pub fn close_tabs_matching(&self, predicate: &dyn Fn(&Tab) -> bool) {
        let targets: Vec<Rc<Tab>> =
            self.tabs.borrow().iter().filter(|tab| predicate(tab)).cloned().collect();
        for tab in targets {
            self.close_tab(&tab);
        }
    }
}
