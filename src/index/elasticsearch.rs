//! Elasticsearch-compatible index over its REST API
//!
//! - `PUT {endpoint}/{index}/_doc/{id}` writes one document
//! - `HEAD {endpoint}/{index}` probes, `PUT {endpoint}/{index}` creates

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use super::config::SearchIndexConfig;
use super::errors::{IndexError, IndexResult};
use super::{IndexFuture, SearchIndex};
use crate::document::Fields;
use crate::observability::{Event, Logger, ObservationScope};

pub struct ElasticsearchIndex {
    client: Client,
    endpoint: Url,
    index_name: String,
}

impl ElasticsearchIndex {
    pub fn new(config: &SearchIndexConfig) -> IndexResult<Self> {
        config.validate()?;
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| IndexError::InvalidConfig(format!("endpoint: {}", e)))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            index_name: config.index_name.clone(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// `{endpoint}/{index}/{segments..}` with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> IndexResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| IndexError::InvalidConfig("endpoint cannot be a base URL".into()))?;
            path.pop_if_empty().push(&self.index_name);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn check(response: Response) -> IndexResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn index_exists(&self) -> IndexResult<bool> {
        let response = self.client.head(self.url(&[])?).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::check(response).await.map(|_| true),
        }
    }

    async fn create_index(&self) -> IndexResult<()> {
        let response = self.client.put(self.url(&[])?).send().await?;
        Self::check(response).await.map(|_| ())
    }

    async fn provision(&self) -> IndexResult<bool> {
        if self.index_exists().await? {
            Logger::info(Event::IndexExists.as_str(), &[("index", self.index_name.as_str())]);
            return Ok(false);
        }
        self.create_index().await?;
        Logger::info(Event::IndexCreated.as_str(), &[("index", self.index_name.as_str())]);
        Ok(true)
    }
}

impl SearchIndex for ElasticsearchIndex {
    fn index_document<'a>(&'a self, id: &'a str, fields: &'a Fields) -> IndexFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&["_doc", id])?;
            let response = self.client.put(url).json(fields).send().await?;
            Self::check(response).await.map(|_| ())
        })
    }

    fn ensure_index(&self) -> IndexFuture<'_, bool> {
        Box::pin(async move {
            let scope = ObservationScope::with_fields("INDEX_SETUP", &[("index", self.index_name.as_str())]);
            match self.provision().await {
                Ok(created) => {
                    scope.complete_with_fields(&[("created", if created { "true" } else { "false" })]);
                    Ok(created)
                }
                Err(e) => {
                    scope.fail(&e.to_string());
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index_for(server: &MockServer) -> ElasticsearchIndex {
        ElasticsearchIndex::new(&SearchIndexConfig {
            endpoint: server.uri(),
            index_name: "contentlets".into(),
            setup: true,
            timeout_ms: 1000,
        })
        .unwrap()
    }

    #[test]
    fn test_url_encodes_document_id() {
        let index = ElasticsearchIndex::new(&SearchIndexConfig {
            endpoint: "http://search:9200/prefix/".into(),
            ..SearchIndexConfig::default()
        })
        .unwrap();
        let url = index.url(&["_doc", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://search:9200/prefix/contentlets/_doc/a%20b%2Fc");
    }

    #[tokio::test]
    async fn test_index_document_puts_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/contentlets/_doc/X"))
            .and(body_json(json!({"title": "hello"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let fields = json!({"title": "hello"}).as_object().cloned().unwrap();
        index_for(&server).index_document("X", &fields).await.unwrap();
    }

    #[tokio::test]
    async fn test_index_document_rejects_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
            .mount(&server)
            .await;

        let err = index_for(&server)
            .index_document("X", &Fields::new())
            .await
            .unwrap_err();
        match err {
            IndexError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "mapper_parsing_exception");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ensure_index_creates_missing_index() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/contentlets"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/contentlets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(index_for(&server).ensure_index().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_index_leaves_existing_index() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/contentlets"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(!index_for(&server).ensure_index().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_index_reraises_probe_failure() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = index_for(&server).ensure_index().await.unwrap_err();
        assert!(matches!(err, IndexError::Status { status: 503, .. }));
    }
}
