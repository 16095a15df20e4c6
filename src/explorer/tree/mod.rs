//! Resource tree nodes and listing reconciliation.

mod collection;
mod database;
mod scripts;

pub use collection::{Collection, UploadDetailsRecord, UploadFile};
pub use database::Database;
pub use scripts::ScriptNode;

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Pattern deciding whether a backend notification is a pending throughput
/// change for some node.
pub(crate) static THROUGHPUT_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("Throughput update (.*) in progress").expect("invalid throughput pattern")
});

/// Merge a fresh server-side listing into the current child set.
///
/// Children present in both keep their object identity, so expansion flags
/// and open tabs bound to them survive the refresh. Records without a
/// matching child are instantiated through `make`; children absent from the
/// listing are dropped. The result is ordered by display id, ascending,
/// case-folded.
///
/// All-or-nothing: a record with an empty identifier aborts before any node
/// is constructed, and the caller's collection is untouched on error.
pub(crate) fn reconcile_children<N, R>(
    current: &[Rc<N>],
    fresh: &[R],
    record_rid: impl Fn(&R) -> &str,
    node_rid: impl Fn(&N) -> &str,
    display_id: impl Fn(&N) -> String,
    make: impl Fn(&R) -> Rc<N>,
) -> Result<Vec<Rc<N>>> {
    for record in fresh {
        if record_rid(record).is_empty() {
            return Err(Error::MalformedRecord(
                "listing record is missing a resource identifier".into(),
            ));
        }
    }

    let mut next: Vec<Rc<N>> = current
        .iter()
        .filter(|node| fresh.iter().any(|record| record_rid(record) == node_rid(node)))
        .cloned()
        .collect();

    for record in fresh {
        let exists = current.iter().any(|node| node_rid(node) == record_rid(record));
        if !exists {
            next.push(make(record));
        }
    }

    next.sort_unstable_by_key(|node| display_id(node).to_lowercase());
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        rid: String,
        name: String,
    }

    struct Record {
        rid: &'static str,
        name: &'static str,
    }

    fn run(current: &[Rc<Item>], fresh: &[Record]) -> Result<Vec<Rc<Item>>> {
        reconcile_children(
            current,
            fresh,
            |record| record.rid,
            |item| item.rid.as_str(),
            |item| item.name.clone(),
            |record| Rc::new(Item { rid: record.rid.to_string(), name: record.name.to_string() }),
        )
    }

    #[test]
    fn fresh_listing_populates_empty_set_sorted() {
        let result = run(
            &[],
            &[Record { rid: "c2", name: "Beta" }, Record { rid: "c1", name: "Alpha" }],
        )
        .expect("reconcile failed");
        let names: Vec<_> = result.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
    }

    #[test]
    fn survivors_keep_identity_and_vanished_are_dropped() {
        let alpha = Rc::new(Item { rid: "c1".into(), name: "Alpha".into() });
        let beta = Rc::new(Item { rid: "c2".into(), name: "Beta".into() });

        let result = run(
            &[alpha.clone(), beta.clone()],
            &[Record { rid: "c2", name: "Beta" }, Record { rid: "c3", name: "Gamma" }],
        )
        .expect("reconcile failed");

        assert_eq!(result.len(), 2);
        assert!(Rc::ptr_eq(&result[0], &beta));
        assert_eq!(result[1].name, "Gamma");
        assert!(!result.iter().any(|item| Rc::ptr_eq(item, &alpha)));
    }

    #[test]
    fn empty_identifier_aborts_without_construction() {
        let alpha = Rc::new(Item { rid: "c1".into(), name: "Alpha".into() });
        let error = run(
            &[alpha],
            &[Record { rid: "c2", name: "Beta" }, Record { rid: "", name: "Broken" }],
        )
        .expect_err("expected malformed record error");
        assert!(matches!(error, Error::MalformedRecord(_)));
    }

    #[test]
    fn ordering_is_case_insensitive() {
        let result = run(
            &[],
            &[
                Record { rid: "c1", name: "beta" },
                Record { rid: "c2", name: "Alpha" },
                Record { rid: "c3", name: "gamma" },
            ],
        )
        .expect("reconcile failed");
        let names: Vec<_> = result.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "beta", "gamma"]);
    }
}
