//! Categorized persistent key-value store.
//!
//! The store is the leaf dependency of the whole supervisor: every component
//! reads or writes it, and lifecycle events (`manager start`, onroad/offroad
//! transitions) bulk-clear the keys tagged for them.
//!
//! ## Contents
//! - [`ParamStore`]: directory-backed store, one file per key
//! - [`Category`]: the fixed lifecycle-category set
//! - [`schema`]: compile-time key → category tagging
//! - [`defaults`]: the default table seeded once per boot

mod store;

pub mod defaults;
pub mod schema;

pub use schema::Category;
pub use store::ParamStore;
