//! Coordination core for a multi-model cloud database explorer.
//!
//! Two cooperating pieces: the resource tree (databases and collections
//! reconciled against server-side listings, with expand/collapse state) and
//! the tab lifecycle coordinator (one tab per node and view kind, ad hoc
//! query tabs exempted). Everything runs on one logical thread; the rendering
//! layer, vendor SDK and resource-management clients live behind the
//! collaborator traits in [`clients`].

pub mod clients;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod explorer;
pub mod models;
pub mod ops;
pub mod settings;
pub mod telemetry;
pub mod workspace;

pub use config::ConfigManager;
pub use console::{ConsoleMessageKind, ConsoleSink, LogConsole};
pub use error::{Error, Result};
pub use events::{Emitter, ExplorerEvent};
pub use explorer::{
    Collection, Database, Explorer, ExplorerClients, ExplorerOptions, NodeRef, RefreshFn,
    ScriptNode, Tab, TabKind, TabNode, TabsManager, UploadDetailsRecord, UploadFile,
};
pub use settings::ExplorerSettings;
pub use telemetry::{Action, ActionModifier, Area, LogTelemetry, TelemetrySink, TraceContext};
pub use workspace::{WorkspaceState, WorkspaceTab};
