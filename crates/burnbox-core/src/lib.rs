//! Core types and traits for the Burnbox paste service.
//!
//! This crate provides the paste record and its read-time lifecycle rules,
//! the identifier type, the error taxonomy, and the seams (key-value store,
//! clock, paste manager) shared by the storage, lifecycle and gateway crates.

pub mod clock;
pub mod error;
pub mod manager;
pub mod paste_id;
pub mod record;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PasteError, StorageError};
pub use manager::{ConsumedPaste, NewPaste, PasteManager};
pub use paste_id::PasteId;
pub use record::{PasteRecord, ReadDecision};
pub use store::KeyValueStore;
