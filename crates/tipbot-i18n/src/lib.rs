//! Locale-aware message rendering for tipbot replies.
//!
//! Messages are minijinja templates addressed by symbolic keys (see [`keys`]).
//! Rendering falls back to the default locale when a translation is missing.

mod catalog_en;
mod catalog_es;
pub mod keys;
mod translation_bundle;

pub use translation_bundle::{TranslationBundle, TranslationError};
