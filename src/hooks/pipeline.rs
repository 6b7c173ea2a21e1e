//! Runs a driver call between its before- and after-hooks.

use std::future::Future;

use super::{HookPhase, HookTable, OperationCategory, OperationContext};
use crate::error::HookRegistrationError;
use crate::span::RequestContext;

/// A verified [`HookTable`] plus statement logging.
///
/// # Ordering
///
/// For one invocation: before-hook → driver → after-hook. Concurrent
/// invocations are independent.
#[derive(Debug)]
pub struct HookPipeline {
    table: HookTable,
    log_statements: bool,
}

impl HookPipeline {
    /// Wraps a table after checking every slot is filled.
    ///
    /// With `log_statements` set, every statement is also logged at
    /// `INFO` once it completes.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::Missing`] if the table has a gap.
    pub fn new(table: HookTable, log_statements: bool) -> Result<Self, HookRegistrationError> {
        table.verify()?;
        Ok(Self {
            table,
            log_statements,
        })
    }

    /// Returns `true` if statements are logged.
    #[must_use]
    pub fn logs_statements(&self) -> bool {
        self.log_statements
    }

    /// Runs `driver` for one operation of `category`.
    ///
    /// The after-hook runs exactly once, including when `driver` panics or
    /// the returned future is dropped before completion. The driver's
    /// result is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever error the driver returned.
    pub async fn run<T, Fut>(
        &self,
        category: OperationCategory,
        request: &RequestContext,
        statement: &str,
        driver: Fut,
    ) -> Result<T, sqlx::Error>
    where
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let mut op = OperationContext::new(category, request.clone());
        self.table.invoke(category, HookPhase::Before, &mut op);

        let mut guard = AfterGuard {
            pipeline: self,
            op,
            completed: false,
        };
        guard.op.set_statement(statement);

        let result = driver.await;
        if let Err(err) = &result {
            guard.op.set_error(err.to_string());
        }
        guard.completed = true;
        drop(guard);
        result
    }
}

/// Runs the after-hook when dropped.
struct AfterGuard<'a> {
    pipeline: &'a HookPipeline,
    op: OperationContext,
    completed: bool,
}

impl Drop for AfterGuard<'_> {
    fn drop(&mut self) {
        if !self.completed && self.op.error().is_none() {
            if std::thread::panicking() {
                self.op.set_error("operation panicked");
            } else {
                self.op.set_error("operation cancelled");
            }
        }

        let category = self.op.category();
        self.pipeline
            .table
            .invoke(category, HookPhase::After, &mut self.op);

        if self.pipeline.log_statements {
            tracing::info!(
                %category,
                statement = self.op.statement().unwrap_or_default(),
                elapsed_ms = u64::try_from(self.op.elapsed().as_millis()).unwrap_or(u64::MAX),
                error = self.op.error(),
                "sql"
            );
        }
    }
}
