//! Per-invocation instrumentation state.

use std::fmt;
use std::time::{Duration, Instant};

use super::OperationCategory;
use crate::span::{RequestContext, TraceSpan};

/// State carried from the before-hook to the after-hook of one operation.
///
/// Created when the operation begins and consumed when it completes. It is
/// never shared between operations.
pub struct OperationContext {
    category: OperationCategory,
    request: RequestContext,
    statement: Option<String>,
    span: Option<Box<dyn TraceSpan>>,
    error: Option<String>,
    started: Instant,
}

impl OperationContext {
    /// Creates the context for a new operation.
    #[must_use]
    pub fn new(category: OperationCategory, request: RequestContext) -> Self {
        Self {
            category,
            request,
            statement: None,
            span: None,
            error: None,
            started: Instant::now(),
        }
    }

    /// Returns the operation category.
    #[must_use]
    pub fn category(&self) -> OperationCategory {
        self.category
    }

    /// Returns the caller's request context.
    #[must_use]
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// Returns the finalized statement text, once the driver has it.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    /// Records the finalized statement text.
    pub fn set_statement(&mut self, statement: impl Into<String>) {
        self.statement = Some(statement.into());
    }

    /// Returns the error reported for the operation, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records an error for the operation.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Attaches the span started for this operation.
    pub fn attach_span(&mut self, span: Box<dyn TraceSpan>) {
        self.span = Some(span);
    }

    /// Removes and returns the attached span.
    pub fn take_span(&mut self) -> Option<Box<dyn TraceSpan>> {
        self.span.take()
    }

    /// Returns `true` if a span is attached.
    #[must_use]
    pub fn has_span(&self) -> bool {
        self.span.is_some()
    }

    /// Time since the operation began.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("category", &self.category)
            .field("statement", &self.statement)
            .field("has_span", &self.span.is_some())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
