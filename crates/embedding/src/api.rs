use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::{EmbeddingConfig, EmbeddingError, EmbeddingRequest, EmbeddingResult};

const TEXT_EMBEDDING_KEY: &str = "textEmbedding";
const IMAGE_EMBEDDING_KEY: &str = "imageEmbedding";
const IMAGE_BYTES_KEY: &str = "bytesBase64Encoded";

/// Sends one `:predict` call. The REST implementation is [`HttpTransport`]; tests plug in fakes.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn predict(&self, url: &str, body: Value) -> Result<Value, EmbeddingError>;
}

/// `reqwest`-backed transport. The client is built once and reused for every call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    auth_header: Option<String>,
}

impl HttpTransport {
    pub fn from_config(cfg: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = cfg.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            auth_header: cfg.auth_header.clone(),
        })
    }
}

#[async_trait]
impl PredictionTransport for HttpTransport {
    async fn predict(&self, url: &str, body: Value) -> Result<Value, EmbeddingError> {
        let mut request = self.client.post(url).json(&body);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Request(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EmbeddingError::Response(format!("invalid JSON: {e}")))
    }
}

/// Build the single prediction instance for `request`.
///
/// Text goes under `text`; image bytes go base64-encoded (standard alphabet, padded)
/// under `image.bytesBase64Encoded`. Absent modalities are omitted entirely.
pub fn build_instance(request: &EmbeddingRequest) -> Value {
    let mut instance = Map::new();
    if let Some(text) = request.text_input() {
        instance.insert("text".into(), Value::String(text.to_owned()));
    }
    if let Some(bytes) = request.image_input() {
        instance.insert(
            "image".into(),
            json!({ "bytesBase64Encoded": STANDARD.encode(bytes) }),
        );
    }
    Value::Object(instance)
}

/// Wrap instances into the `:predict` request body.
pub fn build_predict_body(instances: Vec<Value>) -> Value {
    json!({ "instances": instances })
}

/// Recover the raw image bytes carried by an instance built with [`build_instance`].
pub fn decode_instance_image(instance: &Value) -> Result<Option<Vec<u8>>, EmbeddingError> {
    let Some(encoded) = instance.get("image").and_then(|img| img.get(IMAGE_BYTES_KEY)) else {
        return Ok(None);
    };
    let encoded = encoded
        .as_str()
        .ok_or_else(|| EmbeddingError::Response(format!("`{IMAGE_BYTES_KEY}` must be a string")))?;
    STANDARD
        .decode(encoded)
        .map(Some)
        .map_err(|e| EmbeddingError::Response(format!("invalid base64 image: {e}")))
}

/// Pull the requested vectors out of the first prediction.
///
/// A vector is only looked up when its modality was sent; a requested vector that is
/// missing from the response is an error.
pub(crate) fn parse_prediction(
    response: Value,
    want_text: bool,
    want_image: bool,
) -> Result<EmbeddingResult, EmbeddingError> {
    let mut prediction = match response {
        Value::Object(mut map) => match map.remove("predictions") {
            Some(Value::Array(items)) => match items.into_iter().next() {
                Some(Value::Object(first)) => first,
                Some(other) => {
                    return Err(EmbeddingError::Response(format!(
                        "prediction must be an object, got {other:?}"
                    )))
                }
                None => return Err(EmbeddingError::Response("`predictions` is empty".into())),
            },
            _ => {
                return Err(EmbeddingError::Response(
                    "missing `predictions` array".into(),
                ))
            }
        },
        other => {
            return Err(EmbeddingError::Response(format!(
                "response must be an object, got {other:?}"
            )))
        }
    };

    let mut take = |key: &str| -> Result<Vec<f32>, EmbeddingError> {
        prediction
            .remove(key)
            .ok_or_else(|| EmbeddingError::Response(format!("prediction missing `{key}`")))
            .and_then(parse_embedding_vector)
    };

    let text = if want_text {
        Some(take(TEXT_EMBEDDING_KEY)?)
    } else {
        None
    };
    let image = if want_image {
        Some(take(IMAGE_EMBEDDING_KEY)?)
    } else {
        None
    };

    Ok(EmbeddingResult { text, image })
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbeddingError::Response("non-finite embedding value".into())),
                other => Err(EmbeddingError::Response(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(EmbeddingError::Response(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}
