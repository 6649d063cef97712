//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `study_session` - Study session aggregate, timeline events and subjects

pub mod foundation;
pub mod study_session;
