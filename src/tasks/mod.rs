//! Background Tasks Module
//!
//! Contains background tasks that run alongside the in-memory store.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
