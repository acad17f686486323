use crate::error::{ApiError, ApiResult};
use crate::models::{PreviousBooking, RebookRequest, SearchRequest, SearchResponse};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use std::time::Duration;

/// Client for the marketplace backend. Cheap to clone; every network task
/// spawned by the event loop takes its own copy.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_seconds: u64, token: Option<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn require_auth(&self) -> ApiResult<()> {
        if self.token.is_none() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(())
    }

    /// Searches providers. Runs fine without a location; the backend then
    /// skips distance filtering and leaves `distance_km` unset.
    pub async fn search(&self, request: &SearchRequest) -> ApiResult<SearchResponse> {
        let resp = self
            .with_auth(self.client.post(self.url("/provider-selection/search")))
            .json(request)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<SearchResponse>().await?)
    }

    pub async fn add_favorite(&self, provider_id: &str) -> ApiResult<()> {
        self.favorite("/provider-selection/favorites/add", provider_id)
            .await
    }

    pub async fn remove_favorite(&self, provider_id: &str) -> ApiResult<()> {
        self.favorite("/provider-selection/favorites/remove", provider_id)
            .await
    }

    async fn favorite(&self, path: &str, provider_id: &str) -> ApiResult<()> {
        self.require_auth()?;
        let resp = self
            .with_auth(self.client.post(self.url(path)))
            .json(&json!({ "provider_id": provider_id }))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Most recent completed booking with the provider, if any. A missing
    /// booking is a normal outcome, not an error.
    pub async fn previous_booking(&self, provider_id: &str) -> ApiResult<Option<PreviousBooking>> {
        self.require_auth()?;
        let resp = self
            .with_auth(
                self.client
                    .get(self.url(&format!("/bookings/previous-with-provider/{}", provider_id))),
            )
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp).await?;
        Ok(resp.json::<Option<PreviousBooking>>().await?)
    }

    pub async fn quick_rebook(&self, request: &RebookRequest) -> ApiResult<()> {
        self.require_auth()?;
        let resp = self
            .with_auth(self.client.post(self.url("/provider-selection/quick-rebook")))
            .json(request)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Maps non-2xx responses to [`ApiError::Api`], pulling the backend's
/// `detail` string out of the body when one is present so it can be shown
/// verbatim.
async fn check_status(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or(body);
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}
