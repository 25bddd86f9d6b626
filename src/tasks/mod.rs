//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: purges expired values from the in-process store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
