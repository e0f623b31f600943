use crate::core::engine::{QueryEngine, QueryPlan};
use crate::core::predicate::join_fields;
use crate::domain::model::{FetchOutcome, FieldName, ParcelRecord, QuerySpec};
use crate::domain::ports::{ConfigProvider, ParcelSource};
use crate::utils::error::{ParcelError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    features: Option<Vec<Feature>>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    attributes: ParcelRecord,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    code: Option<i64>,
    message: Option<String>,
}

impl ServiceError {
    fn describe(&self) -> Option<String> {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => Some(format!("{} (code {})", message, code)),
            (None, Some(message)) => Some(message.clone()),
            (Some(code), None) => Some(format!("service error code {}", code)),
            (None, None) => None,
        }
    }
}

/// Client for an ArcGIS feature layer `query` endpoint.
pub struct ArcGisClient {
    client: Client,
    endpoint: String,
}

impl ArcGisClient {
    /// With `verify_tls == false` certificates are not checked at all.
    pub fn new(endpoint: impl Into<String>, verify_tls: bool) -> Result<Self> {
        let endpoint = endpoint.into();
        if !verify_tls {
            tracing::warn!("TLS certificate verification is disabled for {}", endpoint);
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_endpoint(), config.verify_tls())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL, as sent by [`ParcelSource::fetch_parcels`].
    pub fn request_url(&self, predicate: &str, fields: &[FieldName]) -> Result<Url> {
        let out_fields = join_fields(fields);
        Url::parse_with_params(&self.endpoint, query_params(predicate, &out_fields)).map_err(|e| {
            ParcelError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: self.endpoint.clone(),
                reason: format!("Invalid URL format: {}", e),
            }
        })
    }
}

/// A query resolved down to the request URL, without any network traffic.
#[derive(Debug, Clone)]
pub struct DryRun {
    pub plan: QueryPlan,
    pub url: Option<Url>,
}

impl QueryEngine<ArcGisClient> {
    pub fn dry_run(&self, spec: &QuerySpec) -> Result<DryRun> {
        let plan = self.plan(spec);
        let url = match plan.rejection {
            Some(_) => None,
            None => Some(
                self.source()
                    .request_url(&plan.predicate, &plan.requested_fields)?,
            ),
        };
        Ok(DryRun { plan, url })
    }
}

fn query_params<'a>(predicate: &'a str, out_fields: &'a str) -> [(&'static str, &'a str); 3] {
    [("where", predicate), ("outFields", out_fields), ("f", "json")]
}

#[async_trait]
impl ParcelSource for ArcGisClient {
    async fn fetch_parcels(&self, predicate: &str, fields: &[FieldName]) -> Result<FetchOutcome> {
        let out_fields = join_fields(fields);

        tracing::debug!("Making API request to: {}", self.endpoint);
        tracing::debug!("where={} outFields={}", predicate, out_fields);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query_params(predicate, &out_fields))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status != StatusCode::OK {
            return Ok(FetchOutcome::HttpFailure {
                status: status.as_u16(),
            });
        }

        // 先讀出內容再解析，解析失敗歸類為 SerializationError
        let text = response.text().await?;
        let body: QueryResponse = serde_json::from_str(&text)?;
        match body.features {
            Some(features) => {
                tracing::debug!("Received {} features", features.len());
                Ok(FetchOutcome::Features(
                    features.into_iter().map(|f| f.attributes).collect(),
                ))
            }
            None => Ok(FetchOutcome::NoFeatures {
                detail: body.error.as_ref().and_then(ServiceError::describe),
            }),
        }
    }
}
