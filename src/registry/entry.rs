//! Registry slot types

use std::sync::Arc;

use crate::device::DeviceContext;

/// One card slot in the registry
///
/// Either empty or bound to a live context. Disconnect clears the slot
/// before the audio subsystem frees the context.
#[derive(Debug, Default)]
pub struct RegistryEntry {
    /// Bound context (None when no card is attached at this index)
    pub(super) context: Option<Arc<DeviceContext>>,

    /// Card index of the last binding
    pub card_num: u32,
}

impl RegistryEntry {
    /// Bind a context, replacing any previous binding
    pub(super) fn bind(&mut self, card_num: u32, context: Arc<DeviceContext>) {
        self.context = Some(context);
        self.card_num = card_num;
    }

    /// Clear the binding
    pub(super) fn clear(&mut self) {
        self.context = None;
        self.card_num = 0;
    }

    /// Check if a context is bound
    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    /// Check if this slot is bound to exactly `context`
    pub fn is_bound_to(&self, context: &Arc<DeviceContext>) -> bool {
        self.context
            .as_ref()
            .map_or(false, |bound| Arc::ptr_eq(bound, context))
    }

    /// Get the bound context
    pub fn context(&self) -> Option<&Arc<DeviceContext>> {
        self.context.as_ref()
    }
}
