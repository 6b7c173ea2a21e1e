//! Tracing hooks: one span per data operation.
//!
//! The before-hook starts a span and stashes it in the
//! [`OperationContext`]; the after-hook names it after the statement verb,
//! tags it with the statement, records any error and finishes it. Neither
//! hook can fail the operation.

use std::sync::Arc;

use super::{HookPhase, HookTable, OperationCategory, OperationContext};
use crate::error::HookRegistrationError;
use crate::span::SpanCapability;

/// Span tag carrying the full statement text.
pub const STATEMENT_TAG: &str = "db.statement";

/// Registers a before- and after-hook for every category.
///
/// # Errors
///
/// Returns a [`HookRegistrationError`] if any slot is already taken.
pub fn install_tracing_hooks(
    table: &mut HookTable,
    spans: &Arc<dyn SpanCapability>,
) -> Result<(), HookRegistrationError> {
    for category in OperationCategory::ALL {
        let spans = Arc::clone(spans);
        table.register(
            category,
            HookPhase::Before,
            Arc::new(move |op: &mut OperationContext| start_span(spans.as_ref(), op)),
        )?;
        table.register(category, HookPhase::After, Arc::new(finish_span))?;
    }
    Ok(())
}

/// Returns the first whitespace-delimited token of a statement.
///
/// `"SELECT * FROM users"` yields `"SELECT"`. Statements opening with a
/// comment yield the comment marker.
#[must_use]
pub fn operation_name(statement: &str) -> Option<&str> {
    statement.split_whitespace().next()
}

fn start_span(spans: &dyn SpanCapability, op: &mut OperationContext) {
    match spans.start(op.category(), op.request()) {
        Ok(span) => op.attach_span(span),
        Err(err) => {
            tracing::debug!(
                category = %op.category(),
                error = %err,
                "span start failed, operation runs untraced"
            );
        }
    }
}

fn finish_span(op: &mut OperationContext) {
    let Some(mut span) = op.take_span() else {
        return;
    };
    let statement = op.statement().unwrap_or_default();
    span.set_name(operation_name(statement).unwrap_or(op.category().as_str()));
    span.set_tag(STATEMENT_TAG, statement);
    if let Some(error) = op.error() {
        span.set_error(error);
    }
    span.finish();
}
