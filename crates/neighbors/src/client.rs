use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::{NeighborCandidate, NeighborQuery, NeighborSearch, SearchConfig, SearchError};

/// `findNeighbors` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindNeighborsBody<'a> {
    deployed_index_id: &'a str,
    queries: Vec<QueryBody<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    datapoint: DatapointBody<'a>,
    neighbor_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DatapointBody<'a> {
    datapoint_id: &'a str,
    feature_vector: &'a [f32],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FindNeighborsResponse {
    nearest_neighbors: Vec<NearestNeighbors>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct NearestNeighbors {
    neighbors: Vec<Neighbor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Neighbor {
    datapoint: Datapoint,
    distance: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Datapoint {
    datapoint_id: String,
}

fn find_neighbors_body(query: &NeighborQuery) -> FindNeighborsBody<'_> {
    FindNeighborsBody {
        deployed_index_id: &query.deployed_index_id,
        queries: vec![QueryBody {
            datapoint: DatapointBody {
                datapoint_id: "0",
                feature_vector: &query.vector,
            },
            neighbor_count: query.num_neighbors,
        }],
    }
}

/// Neighbors of the first (and only) query, in the order the service returned them.
pub(crate) fn parse_find_neighbors(response: Value) -> Result<Vec<NeighborCandidate>, SearchError> {
    let parsed: FindNeighborsResponse = serde_json::from_value(response)
        .map_err(|e| SearchError::Response(format!("unexpected findNeighbors shape: {e}")))?;

    let candidates = parsed
        .nearest_neighbors
        .into_iter()
        .next()
        .map(|nn| {
            nn.neighbors
                .into_iter()
                .map(|n| NeighborCandidate::new(n.datapoint.datapoint_id, n.distance))
                .collect()
        })
        .unwrap_or_default();
    Ok(candidates)
}

/// REST client for a deployed index endpoint.
#[derive(Debug, Clone)]
pub struct IndexEndpointClient {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
}

impl IndexEndpointClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.find_neighbors_url(),
            auth_header: config.auth_header.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NeighborSearch for IndexEndpointClient {
    async fn find_neighbors(
        &self,
        query: &NeighborQuery,
    ) -> Result<Vec<NeighborCandidate>, SearchError> {
        query.validate()?;

        let mut request = self
            .client
            .post(&self.url)
            .json(&find_neighbors_body(query));
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Request(format!("HTTP error {status}: {body}")));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::Response(format!("invalid JSON: {e}")))?;
        let candidates = parse_find_neighbors(value)?;
        tracing::debug!(
            deployed_index_id = %query.deployed_index_id,
            returned = candidates.len(),
            "findNeighbors completed"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_uses_camel_case_wire_names() {
        let query = NeighborQuery::new(vec![0.5, 1.5], 20, "deployed_index_id_unique");
        let body = serde_json::to_value(find_neighbors_body(&query)).unwrap();
        assert_eq!(
            body,
            json!({
                "deployedIndexId": "deployed_index_id_unique",
                "queries": [{
                    "datapoint": { "datapointId": "0", "featureVector": [0.5, 1.5] },
                    "neighborCount": 20
                }]
            })
        );
    }

    #[test]
    fn parse_keeps_service_order() {
        let response = json!({
            "nearestNeighbors": [{
                "id": "0",
                "neighbors": [
                    { "datapoint": { "datapointId": "b.jpg" }, "distance": 0.2 },
                    { "datapoint": { "datapointId": "a.jpg" }, "distance": 0.9 }
                ]
            }]
        });
        let candidates = parse_find_neighbors(response).unwrap();
        assert_eq!(
            candidates,
            vec![
                NeighborCandidate::new("b.jpg", 0.2),
                NeighborCandidate::new("a.jpg", 0.9),
            ]
        );
    }

    #[test]
    fn parse_tolerates_missing_fields() {
        assert!(parse_find_neighbors(json!({})).unwrap().is_empty());

        let response = json!({
            "nearestNeighbors": [{ "neighbors": [{ "datapoint": { "datapointId": "x" } }] }]
        });
        let candidates = parse_find_neighbors(response).unwrap();
        assert_eq!(candidates, vec![NeighborCandidate::new("x", 0.0)]);
    }

    #[test]
    fn parse_rejects_wrong_types() {
        let err = parse_find_neighbors(json!({ "nearestNeighbors": "nope" })).unwrap_err();
        assert!(matches!(err, SearchError::Response(_)));
    }

    #[test]
    fn client_requires_valid_config() {
        assert!(IndexEndpointClient::new(&SearchConfig::default()).is_err());

        let cfg = SearchConfig {
            index_endpoint: "projects/1/locations/us-central1/indexEndpoints/2".into(),
            ..SearchConfig::default()
        };
        let client = IndexEndpointClient::new(&cfg).unwrap();
        assert!(client.url().ends_with("indexEndpoints/2:findNeighbors"));
    }
}
