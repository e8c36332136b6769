// ============================================================================
// optbench library
// ============================================================================
//
// Creates the opt_* tables, fills them with synthetic clients, products and
// orders, times equivalent JOIN formulations and reports row counts and
// schemas.

pub mod core;
pub mod result;
pub mod connection;
pub mod interface;
pub mod generator;
pub mod loader;
pub mod script;
pub mod harness;
pub mod verify;
pub mod pipeline;

// Re-export main types for convenience
pub use crate::core::{BenchError, Client, ClientStatus, Order, Product, Result, SqlParam, Value};
pub use result::QueryResult;

pub use connection::{Backend, ConnectionConfig, connect};
pub use generator::{DatasetGenerator, OrderWindow, ProductPool};
pub use harness::{NamedQuery, TimedQuery, compare_formulations, time_query};
pub use interface::{ScriptStats, SqlSession};
pub use loader::{InsertTemplate, Insertable, LoadReport, load_batch, load_chunked};
pub use pipeline::{RunConfig, RunSummary, ScaleConfig, Step, run};
pub use script::{ScriptReport, run_script_file};
pub use verify::{VerificationReport, verify};
