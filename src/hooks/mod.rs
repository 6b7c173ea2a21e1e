//! Hook pipeline: pre- and post-hooks around every data operation.
//!
//! Hooks are registered per ([`OperationCategory`], [`HookPhase`]) in a
//! fixed [`HookTable`]. The [`HookPipeline`] runs the before-hook, awaits
//! the driver, and runs the after-hook from a drop guard, so every
//! operation that started also finishes its instrumentation.

pub mod context;
pub mod instrument;
pub mod pipeline;
pub mod table;

use std::fmt;

pub use context::OperationContext;
pub use instrument::{install_tracing_hooks, operation_name};
pub use pipeline::HookPipeline;
pub use table::{Hook, HookTable};

/// Category of data operation a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    /// Row insertion.
    Create,
    /// Row retrieval.
    Query,
    /// Row modification.
    Update,
    /// Row removal.
    Delete,
    /// Arbitrary statement execution.
    Raw,
}

impl OperationCategory {
    /// Every category, in registration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Query,
        Self::Update,
        Self::Delete,
        Self::Raw,
    ];

    /// Returns the lowercase name used in logs and span fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Query => "query",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a hook runs relative to the driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Immediately before the driver executes the statement.
    Before,
    /// Immediately after the driver returns.
    After,
}

impl HookPhase {
    /// Both phases, in execution order.
    pub const ALL: [Self; 2] = [Self::Before, Self::After];
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
        })
    }
}
