//! Fixed registration table of hooks.
//!
//! One slot pair per [`OperationCategory`], selected by an exhaustive
//! `match`: adding a category without a slot does not compile.

use std::fmt;
use std::sync::Arc;

use super::{HookPhase, OperationCategory, OperationContext};
use crate::error::HookRegistrationError;

/// A hook callback. Runs synchronously on the invoking task.
pub type Hook = Arc<dyn Fn(&mut OperationContext) + Send + Sync>;

#[derive(Clone, Default)]
struct HookPair {
    before: Option<Hook>,
    after: Option<Hook>,
}

impl HookPair {
    fn slot(&self, phase: HookPhase) -> Option<&Hook> {
        match phase {
            HookPhase::Before => self.before.as_ref(),
            HookPhase::After => self.after.as_ref(),
        }
    }

    fn slot_mut(&mut self, phase: HookPhase) -> &mut Option<Hook> {
        match phase {
            HookPhase::Before => &mut self.before,
            HookPhase::After => &mut self.after,
        }
    }
}

/// Hooks keyed by (category, phase), at most one per slot.
#[derive(Clone, Default)]
pub struct HookTable {
    create: HookPair,
    query: HookPair,
    update: HookPair,
    delete: HookPair,
    raw: HookPair,
}

impl HookTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pair(&self, category: OperationCategory) -> &HookPair {
        match category {
            OperationCategory::Create => &self.create,
            OperationCategory::Query => &self.query,
            OperationCategory::Update => &self.update,
            OperationCategory::Delete => &self.delete,
            OperationCategory::Raw => &self.raw,
        }
    }

    fn pair_mut(&mut self, category: OperationCategory) -> &mut HookPair {
        match category {
            OperationCategory::Create => &mut self.create,
            OperationCategory::Query => &mut self.query,
            OperationCategory::Update => &mut self.update,
            OperationCategory::Delete => &mut self.delete,
            OperationCategory::Raw => &mut self.raw,
        }
    }

    /// Registers `hook` in the (`category`, `phase`) slot.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::Duplicate`] if the slot is taken.
    pub fn register(
        &mut self,
        category: OperationCategory,
        phase: HookPhase,
        hook: Hook,
    ) -> Result<(), HookRegistrationError> {
        let slot = self.pair_mut(category).slot_mut(phase);
        if slot.is_some() {
            return Err(HookRegistrationError::Duplicate { category, phase });
        }
        *slot = Some(hook);
        Ok(())
    }

    /// Returns the hook in a slot.
    #[must_use]
    pub fn get(&self, category: OperationCategory, phase: HookPhase) -> Option<&Hook> {
        self.pair(category).slot(phase)
    }

    /// Checks that every slot is filled.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::Missing`] for the first empty slot.
    pub fn verify(&self) -> Result<(), HookRegistrationError> {
        for category in OperationCategory::ALL {
            for phase in HookPhase::ALL {
                if self.get(category, phase).is_none() {
                    return Err(HookRegistrationError::Missing { category, phase });
                }
            }
        }
        Ok(())
    }

    /// Invokes the hook in a slot, if any.
    pub fn invoke(&self, category: OperationCategory, phase: HookPhase, op: &mut OperationContext) {
        if let Some(hook) = self.get(category, phase) {
            hook(op);
        }
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for category in OperationCategory::ALL {
            for phase in HookPhase::ALL {
                if self.get(category, phase).is_some() {
                    list.entry(&format_args!("{category}/{phase}"));
                }
            }
        }
        list.finish()
    }
}
