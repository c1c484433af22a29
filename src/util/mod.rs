//! Utility modules

pub mod fill;
