//! Utility modules for the limits CLI

pub mod formatting;
