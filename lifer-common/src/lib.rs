//! # Lifer Common Library
//!
//! Shared code for the Lifer Quiz service including:
//! - Domain models (species records, saved lists)
//! - Event types (LiferEvent enum) and EventBus
//! - Database initialization and state blob persistence
//! - Configuration loading and root folder resolution

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
pub use models::{SavedList, SpeciesRecord};
