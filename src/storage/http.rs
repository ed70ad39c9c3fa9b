//! HTTP data source speaking the resource API envelope

use crate::config::RemoteConfig;
use crate::core::entity::Resource;
use crate::core::error::{
    ConfigError, ConsoleError, ConsoleResult, FieldValidationError, ResourceError,
    TransportError, ValidationError,
};
use crate::core::query::{
    BulkDeleteRequest, BulkDeleteResult, Envelope, ListParams, Page, PaginationMeta,
};
use crate::core::service::DataSource;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;

/// Failure body rendered by the resource API
#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<FailureDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct FailureDetails {
    #[serde(default)]
    fields: Vec<FieldValidationError>,
}

/// Data source calling a remote resource API over HTTP
///
/// `base_url` is the collection endpoint, e.g. `http://localhost:3000/api/operators`.
pub struct HttpDataSource<R> {
    client: Client,
    base_url: Url,
    timeout: Duration,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpDataSource<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> HttpDataSource<R> {
    /// Build a data source for a collection endpoint
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ConsoleResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ConsoleError::Internal(format!("Failed to build HTTP client: {err}")))?;
        let raw = base_url.into();
        let invalid = |message: String| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: raw.clone(),
            message,
        };
        let base_url =
            Url::parse(raw.trim_end_matches('/')).map_err(|err| invalid(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("must be a hierarchical URL".to_string()).into());
        }
        Ok(Self {
            client,
            base_url,
            timeout,
            _resource: PhantomData,
        })
    }

    /// Build a data source for `R` under an API root, e.g. `http://localhost:3000/api`
    pub fn for_api(api_root: &str, timeout: Duration) -> ConsoleResult<Self> {
        let root = api_root.trim_end_matches('/');
        Self::new(format!("{root}/{}", R::collection_name()), timeout)
    }

    /// Build a data source for `R` from the remote settings
    pub fn from_config(config: &RemoteConfig) -> ConsoleResult<Self> {
        Self::for_api(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Collection URL with one more path segment; the segment is percent-encoded
    fn item_url(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }

    /// Send a request and decode its envelope
    ///
    /// `id` names the targeted resource so that a 404 can be reported as
    /// `ResourceError::NotFound`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> ConsoleResult<Envelope<T>> {
        let response = request.send().await.map_err(|err| self.transport_error(err))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|err| {
                TransportError::Decode {
                    message: err.to_string(),
                }
                .into()
            });
        }

        let body: FailureBody = serde_json::from_slice(&bytes).unwrap_or_default();
        tracing::debug!(url = %self.base_url, status = status.as_u16(), "resource API call failed");
        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(ResourceError::NotFound {
                resource: R::resource_name().to_string(),
                id: id.to_string(),
            }
            .into()),
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _)
                if body.details.as_ref().is_some_and(|d| !d.fields.is_empty()) =>
            {
                let fields = body.details.map(|d| d.fields).unwrap_or_default();
                Err(ValidationError::FieldErrors(fields).into())
            }
            _ => Err(TransportError::Status {
                status: status.as_u16(),
                message: body.error.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                }),
            }
            .into()),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ConsoleError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into()
        } else if err.is_decode() {
            TransportError::Decode {
                message: err.to_string(),
            }
            .into()
        } else {
            TransportError::Connection {
                url: self.base_url.to_string(),
                message: err.to_string(),
            }
            .into()
        }
    }
}

#[async_trait]
impl<R: Resource> DataSource<R> for HttpDataSource<R> {
    async fn list(&self, params: &ListParams) -> ConsoleResult<Page<R>> {
        let request = self
            .client
            .get(self.base_url.clone())
            .query(&params.to_query_pairs());
        let envelope: Envelope<Vec<R>> = self.send(request, None).await?;
        let pagination = envelope.pagination;
        let items = envelope.into_data()?;
        let pagination = pagination
            .unwrap_or_else(|| PaginationMeta::new(params.page(), params.limit(), items.len()));
        Ok(Page { items, pagination })
    }

    async fn get(&self, id: &str) -> ConsoleResult<R> {
        let request = self.client.get(self.item_url(id));
        Ok(self.send(request, Some(id)).await?.into_data()?)
    }

    async fn create(&self, form: R::Form) -> ConsoleResult<R> {
        let request = self.client.post(self.base_url.clone()).json(&form);
        Ok(self.send(request, None).await?.into_data()?)
    }

    async fn update(&self, id: &str, form: R::Form) -> ConsoleResult<R> {
        let request = self.client.put(self.item_url(id)).json(&form);
        Ok(self.send(request, Some(id)).await?.into_data()?)
    }

    async fn delete(&self, id: &str) -> ConsoleResult<()> {
        let request = self.client.delete(self.item_url(id));
        let envelope: Envelope<serde_json::Value> = self.send(request, Some(id)).await?;
        if !envelope.success {
            return Err(TransportError::Api {
                message: envelope.error.unwrap_or_else(|| "delete failed".to_string()),
            }
            .into());
        }
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[String]) -> ConsoleResult<BulkDeleteResult> {
        let request = self
            .client
            .post(self.item_url("bulk-delete"))
            .json(&BulkDeleteRequest { ids: ids.to_vec() });
        Ok(self.send(request, None).await?.into_data()?)
    }
}
