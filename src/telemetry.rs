//! Telemetry sink for user-visible operations.
//!
//! Every selection, expand/collapse and tab open is traced. Long operations
//! use a correlated start/success/failure pair keyed by a token. Sink
//! implementations must never fail the calling operation; the trait surface
//! returns nothing to propagate.

use std::cell::Cell;

use crate::models::Experience;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectItem,
    ExpandTreeNode,
    CollapseTreeNode,
    Tab,
    LoadDatabases,
    LoadCollections,
    LoadOffers,
    DeleteCollection,
    DeleteDatabase,
    CreateScript,
    UploadDocuments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionModifier {
    Mark,
    Start,
    Success,
    Failed,
}

/// Explorer surface an action originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    ResourceTree,
    Tab,
    ContextMenu,
}

/// Correlates a `trace_start` with its matching success/failure.
pub type TraceToken = u64;

#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    pub account_name: Option<String>,
    pub experience: Option<Experience>,
    pub area: Option<Area>,
    pub description: Option<String>,
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
    pub tab_title: Option<String>,
    pub error: Option<String>,
}

impl TraceContext {
    pub fn with_area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database_name = Some(database.into());
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection_name = Some(collection.into());
        self
    }

    pub fn with_tab_title(mut self, title: impl Into<String>) -> Self {
        self.tab_title = Some(title.into());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

pub trait TelemetrySink {
    fn trace(&self, action: Action, modifier: ActionModifier, context: TraceContext);

    fn trace_start(&self, action: Action, context: TraceContext) -> TraceToken;

    fn trace_success(&self, action: Action, context: TraceContext, token: TraceToken);

    fn trace_failure(&self, action: Action, context: TraceContext, token: TraceToken);
}

/// Default sink: structured lines on the `log` facade.
#[derive(Default)]
pub struct LogTelemetry {
    next_token: Cell<TraceToken>,
}

impl LogTelemetry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TelemetrySink for LogTelemetry {
    fn trace(&self, action: Action, modifier: ActionModifier, context: TraceContext) {
        log::debug!("telemetry {:?}/{:?}: {:?}", action, modifier, context);
    }

    fn trace_start(&self, action: Action, context: TraceContext) -> TraceToken {
        let token = self.next_token.get().wrapping_add(1);
        self.next_token.set(token);
        log::debug!("telemetry {:?}/Start [{}]: {:?}", action, token, context);
        token
    }

    fn trace_success(&self, action: Action, context: TraceContext, token: TraceToken) {
        log::debug!("telemetry {:?}/Success [{}]: {:?}", action, token, context);
    }

    fn trace_failure(&self, action: Action, context: TraceContext, token: TraceToken) {
        log::debug!("telemetry {:?}/Failed [{}]: {:?}", action, token, context);
    }
}
