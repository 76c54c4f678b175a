//! API Routes
//!
//! Route handlers organized by functionality.

pub mod classify;
pub mod health;
pub mod process;
pub mod resolve;
