use crate::error::{Result, VerifyError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Normalized rectangle locating a field on its source page, as fractions of
/// the page (or image) dimensions. Not validated: out-of-range values pass through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Single extracted field (value + optional confidence and location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(
        rename = "boundingBox",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_box: Option<BoundingBox>,
    /// Keys the backend sent that we do not interpret; sent back as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtractedField {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            confidence: None,
            bounding_box: None,
            extra: Map::new(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// Field name -> extracted field. Display order is computed on demand, never stored.
pub type FieldMapping = HashMap<String, ExtractedField>;

/// Which render path a document takes, decided once from its key's extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Image { mime: String },
    Paginated,
}

impl DocumentKind {
    pub fn from_document_key(document_key: &str) -> Self {
        let extension = document_key
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_lowercase();
        if extension == "pdf" {
            DocumentKind::Paginated
        } else {
            DocumentKind::Image {
                mime: format!("image/{}", extension),
            }
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            DocumentKind::Image { mime } => mime,
            DocumentKind::Paginated => "application/pdf",
        }
    }
}

/// Body of `GET /api/document/{id}` once extraction has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub document_id: String,
    #[serde(default)]
    pub document_key: String,
    #[serde(default)]
    pub base64_encoded_file: Option<String>,
    #[serde(default)]
    pub extracted_data: Option<FieldMapping>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentSnapshot {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_document_key(&self.document_key)
    }

    /// Decoded document bytes, if the backend sent any.
    pub fn raw_content(&self) -> Result<Option<Vec<u8>>> {
        match self.base64_encoded_file.as_deref() {
            None | Some("") => Ok(None),
            Some(encoded) => BASE64
                .decode(encoded.trim())
                .map(Some)
                .map_err(|e| VerifyError::Decode(format!("Invalid base64: {}", e))),
        }
    }

    /// Key without the upload prefix, as shown under the preview.
    pub fn display_file_name(&self) -> String {
        self.document_key.replace("input/", "")
    }

    /// `data:` URL for hosts that display the payload directly.
    pub fn data_url(&self) -> Option<String> {
        let encoded = self.base64_encoded_file.as_deref()?;
        Some(format!("data:{};base64,{}", self.kind().mime_type(), encoded))
    }
}

/// Body of `PUT /api/document/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitPayload<'a> {
    pub extracted_data: &'a FieldMapping,
}

/// Server acknowledgment of a submission, handed to the next workflow step.
pub type Ack = Value;
