//! Error types for the bulk document gateway.
//!
//! This module provides a unified error type for all gateway operations.

mod gateway_error;

pub use gateway_error::GatewayError;
