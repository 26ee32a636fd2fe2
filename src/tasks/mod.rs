//! Background tasks module
//!
//! This module contains the periodic ticker that drives a running countdown.

pub mod countdown;

// Re-export main types
pub use countdown::{CountdownScheduler, TickerHandle, TICK_PERIOD};
