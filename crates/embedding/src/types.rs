use serde::{Deserialize, Serialize};
use std::fmt;

/// Input modality of a query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => f.write_str("text"),
            Modality::Image => f.write_str("image"),
        }
    }
}

/// What to embed. Either field may be absent; both may be present.
///
/// Empty text and empty byte buffers are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingRequest {
    pub text: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl EmbeddingRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn image(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            text: None,
            image: Some(bytes.into()),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.image = Some(bytes.into());
        self
    }

    /// Text to send, if any.
    pub fn text_input(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Image bytes to send, if any.
    pub fn image_input(&self) -> Option<&[u8]> {
        self.image.as_deref().filter(|b| !b.is_empty())
    }

    pub fn has(&self, modality: Modality) -> bool {
        match modality {
            Modality::Text => self.text_input().is_some(),
            Modality::Image => self.image_input().is_some(),
        }
    }

    /// True when neither modality carries data; such requests never reach the endpoint.
    pub fn is_empty(&self) -> bool {
        !self.has(Modality::Text) && !self.has(Modality::Image)
    }
}

/// Per-modality vectors returned for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<f32>>,
}

impl EmbeddingResult {
    pub fn vector(&self, modality: Modality) -> Option<&[f32]> {
        match modality {
            Modality::Text => self.text.as_deref(),
            Modality::Image => self.image.as_deref(),
        }
    }

    pub fn into_vector(self, modality: Modality) -> Option<Vec<f32>> {
        match modality {
            Modality::Text => self.text,
            Modality::Image => self.image,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_and_buffers_count_as_absent() {
        let req = EmbeddingRequest::text("").with_image(Vec::new());
        assert!(req.is_empty());
        assert!(req.text_input().is_none());
        assert!(req.image_input().is_none());
        assert!(EmbeddingRequest::default().is_empty());
    }

    #[test]
    fn both_modalities_may_be_supplied() {
        let req = EmbeddingRequest::text("red car").with_image(vec![1, 2, 3]);
        assert!(req.has(Modality::Text));
        assert!(req.has(Modality::Image));
        assert!(!req.is_empty());
    }

    #[test]
    fn result_vector_selects_modality() {
        let result = EmbeddingResult {
            text: Some(vec![0.1, 0.2]),
            image: None,
        };
        assert_eq!(result.vector(Modality::Text), Some(&[0.1f32, 0.2][..]));
        assert_eq!(result.vector(Modality::Image), None);
        assert_eq!(result.into_vector(Modality::Text), Some(vec![0.1, 0.2]));
    }

    #[test]
    fn result_serializes_only_present_vectors() {
        let result = EmbeddingResult {
            text: None,
            image: Some(vec![1.0]),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"image":[1.0]}"#);
    }

    #[test]
    fn modality_display() {
        assert_eq!(Modality::Text.to_string(), "text");
        assert_eq!(Modality::Image.to_string(), "image");
    }
}
