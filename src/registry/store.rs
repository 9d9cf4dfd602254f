//! Device registry implementation
//!
//! Fixed-capacity table of card slots. Each slot has its own `RwLock`, so
//! operations on different cards never contend; operations on the same card
//! serialize on that card's context lock.

use std::sync::Arc;

use tokio::sync::{OwnedMutexGuard, RwLock};

use super::config::RegistryConfig;
use super::entry::RegistryEntry;
use super::error::RegistryError;
use crate::device::{resolver, ContextState, DeviceContext, Direction, Substream};

/// Card lock held across an offload request
///
/// Holding the guard keeps the card's stream list stable and blocks a
/// concurrent disconnect until the guard is dropped.
pub struct CardGuard {
    context: Arc<DeviceContext>,
    state: OwnedMutexGuard<ContextState>,
}

impl CardGuard {
    /// The locked context
    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }

    /// The locked stream list
    pub fn state(&self) -> &ContextState {
        &self.state
    }

    /// Card index of the locked context
    pub fn card_index(&self) -> u32 {
        self.context.card_index()
    }

    /// Resolve a substream on the locked card
    pub fn resolve(&self, device_index: u32, direction: Direction) -> Option<&Substream> {
        resolver::resolve(&self.context, &self.state, device_index, direction)
    }
}

/// Registry of attached cards
pub struct DeviceRegistry {
    /// One slot per card index
    slots: Box<[RwLock<RegistryEntry>]>,

    /// Configuration
    config: RegistryConfig,
}

impl DeviceRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        let slots = (0..config.max_cards)
            .map(|_| RwLock::new(RegistryEntry::default()))
            .collect();

        Self { slots, config }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of card slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, card: u32) -> Result<&RwLock<RegistryEntry>, RegistryError> {
        self.slots
            .get(card as usize)
            .ok_or(RegistryError::OutOfRange {
                card,
                max_cards: self.slots.len(),
            })
    }

    /// Bind a context to a card index
    ///
    /// Replaces any previous binding for the index.
    pub async fn register(
        &self,
        card: u32,
        context: Arc<DeviceContext>,
    ) -> Result<(), RegistryError> {
        let slot = self.slot(card)?;

        let _card_lock = context.lock().await;
        let mut entry = slot.write().await;

        if entry.is_bound() && !entry.is_bound_to(&context) {
            tracing::debug!(card = card, "Replacing existing card binding");
        }
        entry.bind(card, Arc::clone(&context));

        tracing::info!(
            card = card,
            bus = context.usb_device().bus,
            address = context.usb_device().address,
            "Card registered"
        );

        Ok(())
    }

    /// Clear the binding for a card index
    ///
    /// Idempotent: an empty slot is left as is.
    pub async fn unregister(&self, card: u32) -> Result<(), RegistryError> {
        let slot = self.slot(card)?;

        loop {
            let current = slot.read().await.context().cloned();

            let Some(context) = current else {
                tracing::debug!(card = card, "Card already unregistered");
                return Ok(());
            };

            let _card_lock = context.lock().await;
            let mut entry = slot.write().await;

            // Rebound while we waited for the card lock; retry under the new context's lock
            if !entry.is_bound_to(&context) {
                continue;
            }

            entry.clear();
            tracing::info!(card = card, "Card unregistered");
            return Ok(());
        }
    }

    /// Get the context bound to a card index
    ///
    /// Returns None if the index is out of range or unbound.
    pub async fn lookup(&self, card: u32) -> Option<Arc<DeviceContext>> {
        let slot = self.slot(card).ok()?;
        let entry = slot.read().await;
        entry.context().cloned()
    }

    /// Look up a card and take its lock
    ///
    /// The binding is checked again once the lock is held; if the card was
    /// unregistered or replaced in between, returns None.
    pub async fn lock(&self, card: u32) -> Option<CardGuard> {
        let slot = self.slot(card).ok()?;
        let context = self.lookup(card).await?;

        let state = context.lock().await;

        if !slot.read().await.is_bound_to(&context) {
            tracing::debug!(card = card, "Card unbound while waiting for lock");
            return None;
        }

        Some(CardGuard { context, state })
    }

    /// Card indices that currently have a bound context
    pub async fn bound_cards(&self) -> Vec<u32> {
        let mut cards = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            if slot.read().await.is_bound() {
                cards.push(index as u32);
            }
        }

        cards
    }

    /// Number of bound cards
    pub async fn len(&self) -> usize {
        self.bound_cards().await.len()
    }

    /// Check if no card is bound
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::device::{AudioStream, UsbDevice};

    fn context(card: u32) -> Arc<DeviceContext> {
        Arc::new(DeviceContext::with_streams(
            card,
            UsbDevice::new(1, card as u8 + 2, 0x1234, 0x0001),
            vec![AudioStream::new(0)],
        ))
    }

    fn small_registry() -> DeviceRegistry {
        DeviceRegistry::with_config(RegistryConfig::default().max_cards(2))
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let registry = small_registry();
        let ctx = context(2);

        let result = registry.register(2, Arc::clone(&ctx)).await;
        assert_eq!(
            result,
            Err(RegistryError::OutOfRange {
                card: 2,
                max_cards: 2
            })
        );
        assert!(registry.unregister(2).await.is_err());
        assert!(registry.lookup(2).await.is_none());
        assert!(registry.lock(u32::MAX).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let registry = small_registry();
        let ctx = context(1);

        registry.register(1, Arc::clone(&ctx)).await.unwrap();
        let found = registry.lookup(1).await.unwrap();
        assert!(Arc::ptr_eq(&found, &ctx));
        assert_eq!(registry.bound_cards().await, vec![1]);
        assert_eq!(registry.slots[1].read().await.card_num, 1);

        registry.unregister(1).await.unwrap();
        assert!(registry.lookup(1).await.is_none());
        assert_eq!(registry.slots[1].read().await.card_num, 0);

        // Unregistering again is a no-op
        registry.unregister(1).await.unwrap();
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_overwrites() {
        let registry = small_registry();
        let first = context(1);
        let second = context(1);

        registry.register(1, Arc::clone(&first)).await.unwrap();
        registry.register(1, Arc::clone(&second)).await.unwrap();

        let found = registry.lookup(1).await.unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_lock_returns_bound_context() {
        let registry = small_registry();
        let ctx = context(0);
        registry.register(0, Arc::clone(&ctx)).await.unwrap();

        let guard = registry.lock(0).await.unwrap();
        assert!(Arc::ptr_eq(guard.context(), &ctx));
        assert_eq!(guard.card_index(), 0);
        assert!(guard.resolve(0, Direction::Playback).is_some());
        assert!(guard.resolve(1, Direction::Playback).is_none());
    }

    #[tokio::test]
    async fn test_unregister_waits_for_guard() {
        let registry = Arc::new(small_registry());
        let ctx = context(0);
        registry.register(0, Arc::clone(&ctx)).await.unwrap();

        let guard = registry.lock(0).await.unwrap();

        let reg = Arc::clone(&registry);
        let handle = tokio::spawn(async move { reg.unregister(0).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());
        assert!(registry.lookup(0).await.is_some());

        drop(guard);
        handle.await.unwrap().unwrap();
        assert!(registry.lookup(0).await.is_none());
    }

    #[tokio::test]
    async fn test_unregister_pending_until_guard_dropped() {
        use tokio_test::{assert_pending, assert_ready_ok, task};

        let registry = small_registry();
        registry.register(1, context(1)).await.unwrap();
        let guard = registry.lock(1).await.unwrap();

        let mut unregister = task::spawn(registry.unregister(1));
        assert_pending!(unregister.poll());

        drop(guard);
        assert!(unregister.is_woken());
        assert_ready_ok!(unregister.poll());
        drop(unregister);

        assert!(registry.lookup(1).await.is_none());
    }

    #[tokio::test]
    async fn test_lock_after_replace_sees_new_context() {
        let registry = Arc::new(small_registry());
        let old = context(0);
        let new = context(0);
        registry.register(0, Arc::clone(&old)).await.unwrap();

        // Hold the old card's lock so a locker queues behind it
        let old_lock = old.lock().await;
        let reg = Arc::clone(&registry);
        let locker = tokio::spawn(async move { reg.lock(0).await.is_some() });
        tokio::time::sleep(Duration::from_millis(20)).await;

        registry.register(0, Arc::clone(&new)).await.unwrap();
        drop(old_lock);

        // The queued locker held the old context; the slot now points elsewhere
        assert!(!locker.await.unwrap());

        let guard = registry.lock(0).await.unwrap();
        assert!(Arc::ptr_eq(guard.context(), &new));
    }

    #[tokio::test]
    async fn test_distinct_cards_independent() {
        let registry = small_registry();
        let a = context(0);
        let b = context(1);
        registry.register(0, Arc::clone(&a)).await.unwrap();
        registry.register(1, Arc::clone(&b)).await.unwrap();

        let _guard_a = registry.lock(0).await.unwrap();
        // Card 1 stays usable while card 0 is locked
        registry.unregister(1).await.unwrap();
        assert_eq!(registry.bound_cards().await, vec![0]);
    }
}
