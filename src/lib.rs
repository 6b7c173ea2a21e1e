//! # hookpool
//!
//! Hook-instrumented, hot-reloadable PostgreSQL client manager.
//!
//! This crate builds a pooled `sqlx` client from declarative options, wraps
//! every data operation (create, query, update, delete, raw) in a pre- and
//! post-hook that emits one trace span per operation, and rebuilds the
//! whole client in place when configuration changes, without invalidating
//! handles that callers already hold.
//!
//! ## Architecture
//!
//! ```text
//! Config source (config/)  ──ChangeEvent──►  ChangeBus (client/)
//!     │                                           │
//!     ▼                                           ▼
//! Options (options/)  ─────────────►  ClientManager (client/)
//!                                         │  build / swap
//!                                         ▼
//!                        ClientHandle ──► PooledClient
//!                                         ├── sqlx::PgPool
//!                                         └── HookPipeline (hooks/)
//!                                                └── SpanCapability (span/)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod options;
pub mod span;
