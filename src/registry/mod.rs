//! Card registry for offload dispatch
//!
//! The registry maps a sound card index to the device context currently
//! attached at that index. It has a fixed number of slots, one per card the
//! platform supports.
//!
//! # Locking
//!
//! ```text
//!                      Arc<DeviceRegistry>
//!               ┌──────────────────────────────┐
//!               │ slots: [RwLock<RegistryEntry │
//!               │   { context: Option<Arc<    │
//!               │       DeviceContext>> }>;   │
//!               │   max_cards]                │
//!               └──────────────┬───────────────┘
//!                              │
//!         ┌────────────────────┼────────────────────┐
//!         ▼                    ▼                    ▼
//!    register()           unregister()          lock()
//!    card lock ──►        slot read ──►         slot read ──►
//!    slot write           card lock ──►         card lock ──►
//!                         slot write            slot re-read
//! ```
//!
//! The card lock (the context's mutex) is always taken before a slot lock,
//! and no slot lock is held while waiting for a card lock.

pub mod config;
pub mod entry;
pub mod error;
pub mod store;

pub use config::{RegistryConfig, MAX_CARDS};
pub use entry::RegistryEntry;
pub use error::RegistryError;
pub use store::{CardGuard, DeviceRegistry};
