//! Core types for Parts Order.
//!
//! This module provides type-safe wrappers for product names and prices.

pub mod name;
pub mod price;

pub use name::{NameError, ProductName};
pub use price::{Price, PriceError};
