//! Script nodes: stored procedures, user-defined functions and triggers
//! owned by a collection.

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{ScriptKind, ScriptRecord};

#[derive(Debug)]
pub struct ScriptNode {
    kind: ScriptKind,
    rid: String,
    self_link: String,
    id: RefCell<String>,
    body: RefCell<String>,
    trigger_type: Option<String>,
    trigger_operation: Option<String>,
}

impl ScriptNode {
    pub(crate) fn new(kind: ScriptKind, record: &ScriptRecord) -> Rc<Self> {
        Rc::new(Self {
            kind,
            rid: record.rid.clone(),
            self_link: record.self_link.clone(),
            id: RefCell::new(record.id.clone()),
            body: RefCell::new(record.body.clone()),
            trigger_type: record.trigger_type.clone(),
            trigger_operation: record.trigger_operation.clone(),
        })
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn node_kind(&self) -> &'static str {
        match self.kind {
            ScriptKind::StoredProcedure => "StoredProcedure",
            ScriptKind::UserDefinedFunction => "UserDefinedFunction",
            ScriptKind::Trigger => "Trigger",
        }
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

    pub fn set_id(&self, id: impl Into<String>) {
        *self.id.borrow_mut() = id.into();
    }

    pub fn body(&self) -> String {
        self.body.borrow().clone()
    }

    pub fn set_body(&self, body: impl Into<String>) {
        *self.body.borrow_mut() = body.into();
    }

    pub fn trigger_type(&self) -> Option<&str> {
        self.trigger_type.as_deref()
    }

    pub fn trigger_operation(&self) -> Option<&str> {
        self.trigger_operation.as_deref()
    }
}
