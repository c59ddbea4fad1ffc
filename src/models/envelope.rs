use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminant telling the renderer how to read an envelope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResultShape {
    Tabular,
    Documents,
    None,
}

impl ResultShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultShape::Tabular => "tabular",
            ResultShape::Documents => "documents",
            ResultShape::None => "none",
        }
    }
}

/// Shape-tagged result of one dispatch. Created per call and never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEnvelope {
    pub success: bool,
    pub message: String,
    pub shape: ResultShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Value>>,
}

impl ResultEnvelope {
    /// Envelope carrying only a status message
    pub fn message_only(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            shape: ResultShape::None,
            columns: None,
            rows: None,
            documents: None,
        }
    }

    /// Synthetic envelope for a failure absorbed before or during transport
    pub fn failure(message: impl Into<String>) -> Self {
        Self::message_only(false, message)
    }

    pub fn tabular(message: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            shape: ResultShape::Tabular,
            columns: Some(columns),
            rows: Some(rows),
            ..Self::message_only(true, message)
        }
    }

    pub fn documents(message: impl Into<String>, documents: Vec<Value>) -> Self {
        Self {
            shape: ResultShape::Documents,
            documents: Some(documents),
            ..Self::message_only(true, message)
        }
    }

    /// Number of rows or documents carried, zero for message-only envelopes
    pub fn record_count(&self) -> usize {
        match self.shape {
            ResultShape::Tabular => self.rows.as_ref().map_or(0, Vec::len),
            ResultShape::Documents => self.documents.as_ref().map_or(0, Vec::len),
            ResultShape::None => 0,
        }
    }
}
