//! Span capability: the narrow tracing surface the hook pipeline needs.
//!
//! The pipeline only ever starts a span, names it, tags it, marks it failed
//! and finishes it. [`SpanCapability`] abstracts exactly that so any tracing
//! backend can be plugged in; [`TracingSpans`] is the adapter for the
//! `tracing` ecosystem, following the OpenTelemetry database conventions
//! (`otel.name`, `db.system`, `db.operation`, `db.statement`).

use std::fmt;
use std::time::{Duration, Instant};

use tracing::field;

use crate::error::SpanError;
use crate::hooks::OperationCategory;

/// The caller's ambient request context.
///
/// Carries the span a data operation should be parented to, and the
/// deadline the caller is working against. Neither is required: an empty
/// context produces root spans with no deadline.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    parent: Option<tracing::Span>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context with no parent span and no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Captures the currently entered `tracing` span as the parent.
    #[must_use]
    pub fn current() -> Self {
        let span = tracing::Span::current();
        Self {
            parent: (!span.is_disabled()).then_some(span),
            deadline: None,
        }
    }

    /// Sets the parent span explicitly.
    #[must_use]
    pub fn with_parent(mut self, parent: tracing::Span) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the parent span, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&tracing::Span> {
        self.parent.as_ref()
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// One in-flight span borrowed by the pipeline for a single operation.
pub trait TraceSpan: Send {
    /// Sets the display name.
    fn set_name(&mut self, name: &str);

    /// Attaches a string tag.
    fn set_tag(&mut self, key: &str, value: &str);

    /// Marks the span failed and records the error message.
    fn set_error(&mut self, error: &str);

    /// Finishes the span. Consumes it, so it can only happen once.
    fn finish(self: Box<Self>);
}

/// Starts spans for data operations.
pub trait SpanCapability: Send + Sync + fmt::Debug {
    /// Starts a span for `category`, as a child of the request's parent
    /// span when there is one, carrying the request's deadline.
    ///
    /// # Errors
    ///
    /// Returns a [`SpanError`] if the backend cannot record the span.
    fn start(
        &self,
        category: OperationCategory,
        request: &RequestContext,
    ) -> Result<Box<dyn TraceSpan>, SpanError>;
}

/// [`SpanCapability`] backed by the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpans;

impl SpanCapability for TracingSpans {
    fn start(
        &self,
        category: OperationCategory,
        request: &RequestContext,
    ) -> Result<Box<dyn TraceSpan>, SpanError> {
        let parent = request.parent().and_then(tracing::Span::id);
        let span = tracing::info_span!(
            parent: parent,
            "db.operation",
            otel.name = field::Empty,
            otel.status_code = field::Empty,
            db.system = "postgresql",
            db.operation = category.as_str(),
            db.statement = field::Empty,
            error.message = field::Empty,
            deadline_ms = field::Empty,
            elapsed_ms = field::Empty,
        );
        if span.is_disabled() {
            return Err(SpanError::Disabled);
        }
        if let Some(deadline) = request.deadline() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            span.record(
                "deadline_ms",
                u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            );
        }
        Ok(Box::new(TracingSpan {
            span,
            started: Instant::now(),
        }))
    }
}

struct TracingSpan {
    span: tracing::Span,
    started: Instant,
}

impl TraceSpan for TracingSpan {
    fn set_name(&mut self, name: &str) {
        self.span.record("otel.name", name);
    }

    fn set_tag(&mut self, key: &str, value: &str) {
        self.span.record(key, value);
    }

    fn set_error(&mut self, error: &str) {
        self.span.record("otel.status_code", "ERROR");
        self.span.record("error.message", error);
    }

    fn finish(self: Box<Self>) {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.span.record("elapsed_ms", elapsed);
        drop(self.span);
    }
}


#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::recording::LogBuffer;
    use super::*;

    #[test]
    fn background_context_is_empty() {
        let ctx = RequestContext::background();
        assert!(ctx.parent().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn current_without_subscriber_has_no_parent() {
        let ctx = RequestContext::current();
        assert!(ctx.parent().is_none());
    }

    #[test]
    fn with_timeout_sets_future_deadline() {
        let before = Instant::now();
        let ctx = RequestContext::background().with_timeout(Duration::from_secs(2));
        let Some(deadline) = ctx.deadline() else {
            panic!("expected deadline");
        };
        assert!(deadline > before);
    }

    #[test]
    fn tracing_spans_report_disabled_without_subscriber() {
        let result = TracingSpans.start(OperationCategory::Query, &RequestContext::background());
        assert!(matches!(result, Err(SpanError::Disabled)));
    }

    #[test]
    fn tracing_spans_record_fields_on_close() {
        let logs = LogBuffer::new();
        tracing::subscriber::with_default(logs.subscriber(), || {
            let parent = tracing::info_span!("request");
            let ctx = RequestContext::background()
                .with_parent(parent)
                .with_timeout(Duration::from_millis(500));
            let Ok(mut span) = TracingSpans.start(OperationCategory::Create, &ctx) else {
                panic!("expected span");
            };
            span.set_name("INSERT");
            span.set_tag("db.statement", "INSERT INTO t VALUES (1)");
            span.set_error("boom");
            span.finish();
        });

        let output = logs.contents();
        let Some(close) = output.lines().find(|l| l.contains("db.operation")) else {
            panic!("expected a closed db.operation span, got: {output}");
        };
        assert!(close.contains("request:db.operation"));
        assert!(close.contains("db.operation=\"create\""));
        assert!(close.contains("otel.name=\"INSERT\""));
        assert!(close.contains("db.statement=\"INSERT INTO t VALUES (1)\""));
        assert!(close.contains("otel.status_code=\"ERROR\""));
        assert!(close.contains("error.message=\"boom\""));
        assert!(close.contains("deadline_ms="));
        assert!(close.contains("elapsed_ms="));
    }

    #[test]
    fn successful_span_has_no_error_field() {
        let logs = LogBuffer::new();
        tracing::subscriber::with_default(logs.subscriber(), || {
            let Ok(mut span) =
                TracingSpans.start(OperationCategory::Query, &RequestContext::background())
            else {
                panic!("expected span");
            };
            span.set_name("SELECT");
            span.finish();
        });

        let output = logs.contents();
        assert!(output.contains("otel.name=\"SELECT\""));
        assert!(!output.contains("error.message"));
    }

    #[test]
    fn current_captures_entered_span() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let request = tracing::info_span!("request");
            let _guard = request.enter();
            let ctx = RequestContext::current();
            assert!(ctx.parent().is_some());
        });
    }
}
