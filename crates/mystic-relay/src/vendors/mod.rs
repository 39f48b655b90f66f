//! Vendor-specific provider integrations.

pub mod together;
