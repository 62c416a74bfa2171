//! Uniform `{message, data}` wrapper returned by every JSON endpoint.

use serde::Serialize;

/// Success body shared by the JSON endpoints. Errors use `AppError` instead.
///
/// Absent fields are omitted from the JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// A confirmation message with no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            message: None,
            data: Some(data),
        }
    }
}
