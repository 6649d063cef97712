//! Study Sessions - tracking bounded periods of study.
//!
//! A user has at most one Active study session at a time. Each session
//! carries an append-only timeline of start, pause, resume and stop events
//! and is completed exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
