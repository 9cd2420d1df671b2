//! Input validation and path helpers shared by the request builder and the gateway.

use crate::errors::GatewayError;

/// Validate an index name before any engine call.
///
/// # Arguments
///
/// * `index` - The index name supplied by the caller
///
/// # Returns
///
/// * `Ok(())` - If the name is usable
/// * `Err(GatewayError::ValidationError)` - If the name is empty or contains a path
///   separator or a comma (commas address several indices at once)
pub fn validate_index(index: &str) -> Result<(), GatewayError> {
    if index.trim().is_empty() {
        return Err(GatewayError::validation("Index name is required"));
    }
    if index.contains('/') || index.contains(',') {
        return Err(GatewayError::validation(format!(
            "Index name '{}' must not contain '/' or ','",
            index
        )));
    }
    Ok(())
}

/// Validate a document id before any engine call.
pub fn validate_id(id: &str) -> Result<(), GatewayError> {
    if id.is_empty() {
        return Err(GatewayError::validation("Document id must not be empty"));
    }
    Ok(())
}

/// Validate every id of a batch, reporting the position of the first bad one.
pub fn validate_ids(ids: &[String]) -> Result<(), GatewayError> {
    for (position, id) in ids.iter().enumerate() {
        validate_id(id).map_err(|_| {
            GatewayError::validation(format!("Document id at position {} is empty", position))
        })?;
    }
    Ok(())
}

/// Percent-encode a single URL path segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
