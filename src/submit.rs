use crate::error::{Result, VerifyError};
use crate::transport::{document_path, Transport};
use crate::types::{Ack, FieldMapping, SubmitPayload};
use serde_json::Value;

/// Sends corrected fields with `PUT /api/document/{id}`.
pub struct SubmitClient<T: Transport> {
    transport: T,
}

impl<T: Transport> SubmitClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The whole mapping goes back, confidences and boxes included.
    pub fn submit(&self, document_id: &str, fields: &FieldMapping) -> Result<Ack> {
        let body = serde_json::to_value(SubmitPayload {
            extracted_data: fields,
        })
        .map_err(|e| VerifyError::Decode(e.to_string()))?;

        let response = match self.transport.put_json(&document_path(document_id), &body) {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error submitting data: {}", e);
                return Err(VerifyError::SubmitFailure {
                    status: None,
                    message: "An error occurred while saving.".to_string(),
                });
            }
        };

        if response.is_success() {
            log::info!("Saved {} field(s) for document {}", fields.len(), document_id);
            // 204 and friends: saved, but nothing to hand on.
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Ack::Null);
            }
            return response.json().map_err(|e| {
                log::error!("Error reading save response for {}: {}", document_id, e);
                VerifyError::SubmitFailure {
                    status: Some(response.status),
                    message: "An error occurred while saving.".to_string(),
                }
            });
        }
        if response.is_unauthorized() {
            self.transport.sign_out();
            return Err(VerifyError::Unauthorized);
        }

        let message = response
            .json::<Value>()
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        log::warn!("Submit for {} rejected ({}): {}", document_id, response.status, message);
        Err(VerifyError::SubmitFailure {
            status: Some(response.status),
            message,
        })
    }
}
