//! Data-access operations wrapped with console progress, logging and
//! telemetry. Errors are logged and re-raised; the shell decides what the
//! user sees.

use std::rc::Rc;

use crate::console::ConsoleMessageKind;
use crate::error::Result;
use crate::events::ExplorerEvent;
use crate::explorer::tree::{Collection, ScriptNode};
use crate::explorer::{Explorer, Tab};
use crate::models::{ScriptDefinition, ScriptKind};
use crate::telemetry::Action;

/// Delete a collection, then drop its tabs and reconcile the parent's
/// children so the tree reflects the store.
pub async fn delete_collection(
    explorer: &Rc<Explorer>,
    database_id: &str,
    collection_id: &str,
) -> Result<()> {
    let console = explorer.console();
    let telemetry = explorer.telemetry();
    let progress = console.log(
        ConsoleMessageKind::InProgress,
        &format!("Deleting container {}", collection_id),
    );
    let trace =
        explorer.base_trace().with_database(database_id).with_collection(collection_id);
    let token = telemetry.trace_start(Action::DeleteCollection, trace.clone());

    if let Err(error) = explorer.data_client().delete_collection(database_id, collection_id).await
    {
        console.clear(progress);
        console.log(
            ConsoleMessageKind::Error,
            &format!("Error while deleting container {}: {}", collection_id, error),
        );
        log::error!("Failed to delete container {}: {}", collection_id, error);
        telemetry.trace_failure(Action::DeleteCollection, trace.with_error(&error), token);
        return Err(error);
    }

    console.log(
        ConsoleMessageKind::Info,
        &format!("Successfully deleted container {}", collection_id),
    );
    console.clear(progress);
    telemetry.trace_success(Action::DeleteCollection, trace, token);

    if let Some(database) = explorer.find_database_with_id(database_id) {
        if let Some(collection) = database.find_collection_with_id(collection_id) {
            let rid = collection.rid().to_string();
            explorer.tabs().close_tabs_matching(&|tab: &Tab| {
                tab.collection_rid().as_deref() == Some(rid.as_str())
            });
        }
        database.load_collections().await?;
    }

    explorer.events().emit(ExplorerEvent::CollectionDeleted {
        database_id: database_id.to_string(),
        collection_id: collection_id.to_string(),
    });
    Ok(())
}

/// Delete a database, then drop every tab bound to it or its collections
/// and reconcile the database list.
pub async fn delete_database(explorer: &Rc<Explorer>, database_id: &str) -> Result<()> {
    let console = explorer.console();
    let telemetry = explorer.telemetry();
    let progress = console
        .log(ConsoleMessageKind::InProgress, &format!("Deleting database {}", database_id));
    let trace = explorer.base_trace().with_database(database_id);
    let token = telemetry.trace_start(Action::DeleteDatabase, trace.clone());

    if let Err(error) = explorer.data_client().delete_database(database_id).await {
        console.clear(progress);
        console.log(
            ConsoleMessageKind::Error,
            &format!("Error while deleting database {}: {}", database_id, error),
        );
        log::error!("Failed to delete database {}: {}", database_id, error);
        telemetry.trace_failure(Action::DeleteDatabase, trace.with_error(&error), token);
        return Err(error);
    }

    console.log(
        ConsoleMessageKind::Info,
        &format!("Successfully deleted database {}", database_id),
    );
    console.clear(progress);
    telemetry.trace_success(Action::DeleteDatabase, trace, token);

    let owned = database_id.to_string();
    explorer.tabs().close_tabs_matching(&|tab: &Tab| tab.node().database_id() == owned);
    explorer.load_databases().await?;

    explorer
        .events()
        .emit(ExplorerEvent::DatabaseDeleted { database_id: database_id.to_string() });
    Ok(())
}

pub async fn create_stored_procedure(
    collection: &Rc<Collection>,
    definition: ScriptDefinition,
) -> Result<Rc<ScriptNode>> {
    create_script(collection, ScriptKind::StoredProcedure, definition).await
}

pub async fn create_user_defined_function(
    collection: &Rc<Collection>,
    definition: ScriptDefinition,
) -> Result<Rc<ScriptNode>> {
    create_script(collection, ScriptKind::UserDefinedFunction, definition).await
}

pub async fn create_trigger(
    collection: &Rc<Collection>,
    definition: ScriptDefinition,
) -> Result<Rc<ScriptNode>> {
    create_script(collection, ScriptKind::Trigger, definition).await
}

async fn create_script(
    collection: &Rc<Collection>,
    kind: ScriptKind,
    definition: ScriptDefinition,
) -> Result<Rc<ScriptNode>> {
    let explorer = collection.explorer();
    let console = explorer.console();
    let telemetry = explorer.telemetry();
    let label = kind.label().to_lowercase();
    let progress = console.log(
        ConsoleMessageKind::InProgress,
        &format!("Creating {} {}", label, definition.id),
    );
    let trace = explorer
        .base_trace()
        .with_database(collection.database_id())
        .with_collection(collection.id());
    let token = telemetry.trace_start(Action::CreateScript, trace.clone());

    let client = explorer.data_client();
    let database_id = collection.database_id().to_string();
    let collection_id = collection.id();
    let result = match kind {
        ScriptKind::StoredProcedure => {
            client.create_stored_procedure(&database_id, &collection_id, definition.clone()).await
        }
        ScriptKind::UserDefinedFunction => {
            client
                .create_user_defined_function(&database_id, &collection_id, definition.clone())
                .await
        }
        ScriptKind::Trigger => {
            client.create_trigger(&database_id, &collection_id, definition.clone()).await
        }
    };

    match result {
        Err(error) => {
            console.clear(progress);
            console.log(
                ConsoleMessageKind::Error,
                &format!("Error while creating {} {}: {}", label, definition.id, error),
            );
            log::error!("Failed to create {} {}: {}", label, definition.id, error);
            telemetry.trace_failure(Action::CreateScript, trace.with_error(&error), token);
            Err(error)
        }
        Ok(record) => {
            console.clear(progress);
            telemetry.trace_success(Action::CreateScript, trace, token);
            let node = match kind {
                ScriptKind::StoredProcedure => collection.create_stored_procedure_node(&record),
                ScriptKind::UserDefinedFunction => {
                    collection.create_user_defined_function_node(&record)
                }
                ScriptKind::Trigger => collection.create_trigger_node(&record),
            };
            Ok(node)
        }
    }
}
