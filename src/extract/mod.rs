//! Extraction engine building blocks: text cleanup, title validation,
//! ordered locator cascades, per-field extraction and de-duplication.

pub mod cascade;
pub mod dedupe;
pub mod field;
pub mod locator;
pub mod normalize;
pub mod validate;
