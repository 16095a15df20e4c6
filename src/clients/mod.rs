//! Collaborator contracts the core is written against.
//!
//! The explorer core owns no wire format: listings, offers, quota, scripts,
//! and notifications all arrive through these traits, implemented elsewhere
//! (vendor SDK, generated REST clients). Every method is a suspension point;
//! failures propagate to the core unretried; retry policy, if any, belongs
//! to the implementation.
//!
//! The core runs on one logical thread, so futures are `!Send` and boxed
//! locally.

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    CollectionRecord, DatabaseRecord, NotificationRecord, OfferRecord, QuotaRecord,
    ReadDatabaseOfferParams, ScriptDefinition, ScriptRecord,
};

/// Listing, offer/quota, script and document access for one account.
pub trait DataClient {
    fn list_databases(&self) -> LocalBoxFuture<'static, Result<Vec<DatabaseRecord>>>;

    fn list_collections(
        &self,
        database_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<CollectionRecord>>>;

    /// Read the shared-throughput offer of a database, if it has one.
    fn read_database_offer(
        &self,
        params: ReadDatabaseOfferParams,
    ) -> LocalBoxFuture<'static, Result<Option<OfferRecord>>>;

    fn read_collection_quota_info(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<QuotaRecord>>;

    /// List all offers of the account. The caller matches a collection's
    /// offer by resource-link containment of its `_rid`.
    fn read_offers(&self) -> LocalBoxFuture<'static, Result<Vec<OfferRecord>>>;

    /// Read the detail view of a known offer (adds throughput info).
    fn read_offer(&self, offer: &OfferRecord) -> LocalBoxFuture<'static, Result<OfferRecord>>;

    fn read_stored_procedures(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<ScriptRecord>>>;

    fn read_user_defined_functions(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<ScriptRecord>>>;

    fn read_triggers(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<ScriptRecord>>>;

    fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document: Value,
    ) -> LocalBoxFuture<'static, Result<Value>>;

    fn create_stored_procedure(
        &self,
        database_id: &str,
        collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>>;

    fn create_user_defined_function(
        &self,
        database_id: &str,
        collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>>;

    fn create_trigger(
        &self,
        database_id: &str,
        collection_id: &str,
        definition: ScriptDefinition,
    ) -> LocalBoxFuture<'static, Result<ScriptRecord>>;

    fn delete_collection(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> LocalBoxFuture<'static, Result<()>>;

    fn delete_database(&self, database_id: &str) -> LocalBoxFuture<'static, Result<()>>;
}

/// Source of long-running-operation notifications for the account.
pub trait NotificationsClient {
    fn fetch_notifications(&self) -> LocalBoxFuture<'static, Result<Vec<NotificationRecord>>>;
}
