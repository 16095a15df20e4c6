//! Explorer events for reactive shells.
//!
//! Mutations publish through an explicit [`Emitter`] rather than implicit
//! property interception; derived views (tabs of a kind, tree entries) are
//! recomputed on demand from the authoritative collections.

use std::cell::RefCell;

use crate::explorer::TabKind;

/// Events emitted by the explorer core for UI reactivity
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    // Tree lifecycle
    DatabasesLoaded {
        count: usize,
    },
    CollectionsLoaded {
        database_id: String,
        count: usize,
    },
    NodeExpanded {
        rid: String,
    },
    NodeCollapsed {
        rid: String,
    },
    SelectionChanged {
        rid: Option<String>,
    },

    // Tab lifecycle
    TabOpened {
        kind: TabKind,
        title: String,
    },
    TabActivated {
        kind: TabKind,
        title: String,
    },
    TabClosed {
        kind: TabKind,
        title: String,
    },
    TabRefreshFailed {
        title: String,
        error: String,
    },

    // Data operations
    CollectionDeleted {
        database_id: String,
        collection_id: String,
    },
    DatabaseDeleted {
        database_id: String,
    },
    DocumentsUploaded {
        collection_id: String,
        succeeded: u32,
        failed: u32,
    },
}

type Subscriber = Box<dyn Fn(&ExplorerEvent)>;

/// Synchronous subscriber list. Subscribers run on the coordinator's thread
/// and must not subscribe/unsubscribe from within a dispatch.
#[derive(Default)]
pub struct Emitter {
    subscribers: RefCell<Vec<Subscriber>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&ExplorerEvent) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    pub fn emit(&self, event: ExplorerEvent) {
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn emit_reaches_all_subscribers() {
        let emitter = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..2 {
            let seen = seen.clone();
            emitter.subscribe(move |event| seen.borrow_mut().push(event.clone()));
        }

        emitter.emit(ExplorerEvent::DatabasesLoaded { count: 3 });
        assert_eq!(seen.borrow().len(), 2);
    }
}
