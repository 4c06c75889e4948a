//! Bot Manager engine
//!
//! Supervises bot processes declared in a document store and publishes
//! their lifecycle as an event stream.

pub mod application;
pub mod constants;
pub mod domain;
pub mod infrastructure;
