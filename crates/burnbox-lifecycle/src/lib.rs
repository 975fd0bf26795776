//! The paste lifecycle manager.
//!
//! [`PasteService`] implements [`PasteManager`](burnbox_core::PasteManager)
//! on top of any [`KeyValueStore`](burnbox_core::KeyValueStore): it creates
//! pastes and consumes views at read time, deleting pastes once they expire
//! or run out of views.

pub mod service;
pub mod settings;

pub use service::PasteService;
pub use settings::ServiceSettings;
