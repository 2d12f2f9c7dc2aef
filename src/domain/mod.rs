//! Core domain types and logic.
//!
//! Everything here is synchronous and pure over its inputs; collaborators are
//! reached only through the traits in [`crate::ports`].

pub mod backtest;
pub mod compare;
pub mod config_validation;
pub mod decision;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod ohlcv;
pub mod signal;
