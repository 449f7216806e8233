//! Job listing extraction for employer career pages.
//!
//! Sites are read through ATS-specific locator cascades (Workday, Greenhouse,
//! Lever), a generic fallback for unknown markup, or a SmartRecruiters JSON
//! feed, and reduced to validated, de-duplicated [`models::job::JobRecord`]s.

pub mod collectors;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod output;
pub mod page;
pub mod retrieval;
