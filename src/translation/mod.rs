/*!
 * Translation engine: per-language records, the per-instance cache,
 * fallback resolution of attribute values, and the save and delete
 * policies applied at the base record's lifecycle hooks.
 */

pub mod cache;
pub mod core;
pub mod deletion;
pub mod persistence;
pub mod record;

pub use cache::TranslationCache;
pub use core::{AttributeWrite, PropertyAccess, Translateable};
pub use deletion::DeletionOutcome;
pub use record::{AttributeValues, TranslationRecord};
