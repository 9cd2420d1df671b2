//! This module defines the core data structures used by the gateway.
//! It re-exports `Document`, `OperationOptions`, `ActionResult` and the update payloads.

pub mod action_result;
pub mod document;
pub mod one_or_many;
pub mod options;
pub mod update_spec;

pub use action_result::{ActionOutcome, ActionResult};
pub use document::Document;
pub use one_or_many::OneOrMany;
pub use options::OperationOptions;
pub use update_spec::{QueryUpdate, Script, UpdateSpec};
