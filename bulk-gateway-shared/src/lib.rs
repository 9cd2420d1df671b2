//! # Bulk Gateway Shared
//!
//! This crate defines the data structures shared across the bulk document gateway:
//! open-ended documents, per-call engine options, update payloads and the uniform
//! `ActionResult` record every gateway operation returns.

pub mod errors;
pub mod types;

pub use errors::PayloadError;
pub use types::action_result::{ActionOutcome, ActionResult};
pub use types::document::Document;
pub use types::one_or_many::OneOrMany;
pub use types::options::OperationOptions;
pub use types::update_spec::{QueryUpdate, Script, UpdateSpec};
