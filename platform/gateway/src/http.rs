use std::time::Duration;

use async_trait::async_trait;
use entity::{User, UserPatch};
use reqwest::{
    Client, RequestBuilder, Response, Url,
    header::{self, HeaderMap},
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::{GatewayError, GatewayResult, TOTAL_COUNT_HEADER, UserGateway, UserPage};

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Collection endpoint, e.g. `http://localhost:3001/usuarios`.
    pub api_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`UserGateway`] over HTTP with `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpUserGateway {
    client: Client,
    base_url: Url,
}

impl HttpUserGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let base_url = normalize_base_url(&config.api_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| GatewayError::Transport {
                operation: "build_client",
                source,
            })?;
        debug!(%base_url, "collection gateway ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn item_url(&self, id: &str) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Transport { operation, source })?;
        let status = response.status();
        if !status.is_success() {
            warn!(operation, %status, "collection rejected request");
            return Err(GatewayError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn fetch_list(&self, operation: &'static str, query: &[(&str, String)]) -> GatewayResult<Vec<User>> {
        let request = self
            .request(reqwest::Method::GET, self.base_url.clone())
            .query(query);
        let response = self.send(operation, request).await?;
        decode(operation, response).await
    }
}

#[async_trait]
impl UserGateway for HttpUserGateway {
    #[instrument(name = "gateway.list_by_sector", skip(self))]
    async fn list_by_sector(&self, sector: i64) -> GatewayResult<Vec<User>> {
        let users = self
            .fetch_list("list_by_sector", &[("sector", sector.to_string())])
            .await?;
        debug!(count = users.len(), "users fetched");
        Ok(users)
    }

    #[instrument(name = "gateway.list_by_page", skip(self))]
    async fn list_by_page(&self, sector: i64, page_size: u32, page: u32) -> GatewayResult<UserPage> {
        let operation = "list_by_page";
        let request = self
            .request(reqwest::Method::GET, self.base_url.clone())
            .query(&[
                ("sector", sector.to_string()),
                ("_limit", page_size.to_string()),
                ("_page", page.to_string()),
            ]);
        let response = self.send(operation, request).await?;
        let total_records = match parse_total_count(response.headers()) {
            Some(total) => total,
            None => {
                warn!("{TOTAL_COUNT_HEADER} header missing or not numeric; assuming 0");
                0
            }
        };
        let users: Vec<User> = decode(operation, response).await?;
        debug!(count = users.len(), total_records, "page fetched");
        Ok(UserPage {
            users,
            total_records,
        })
    }

    #[instrument(name = "gateway.list_all", skip(self))]
    async fn list_all(&self) -> GatewayResult<Vec<User>> {
        self.fetch_list("list_all", &[]).await
    }

    #[instrument(name = "gateway.create", skip(self, user), fields(id = %user.id))]
    async fn create(&self, user: &User) -> GatewayResult<User> {
        let request = self
            .request(reqwest::Method::POST, self.base_url.clone())
            .json(user);
        let response = self.send("create", request).await?;
        decode("create", response).await
    }

    #[instrument(name = "gateway.update", skip(self, patch))]
    async fn update(&self, id: &str, patch: &UserPatch) -> GatewayResult<User> {
        let request = self
            .request(reqwest::Method::PUT, self.item_url(id)?)
            .json(patch);
        let response = self.send("update", request).await?;
        decode("update", response).await
    }

    #[instrument(name = "gateway.latest", skip(self))]
    async fn latest(&self) -> GatewayResult<Option<User>> {
        let users = self
            .fetch_list(
                "latest",
                &[
                    ("_sort", "id".to_string()),
                    ("_order", "desc".to_string()),
                    ("_limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(users.into_iter().next())
    }
}

async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> GatewayResult<T> {
    let body = response
        .bytes()
        .await
        .map_err(|source| GatewayError::Transport { operation, source })?;
    serde_json::from_slice(&body).map_err(|source| GatewayError::Decode { operation, source })
}

/// Read `X-Total-Count`; `None` when absent or not a non-negative integer.
pub fn parse_total_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(TOTAL_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Accept `localhost:3001/usuarios` as well as full URLs: add a missing
/// scheme and drop trailing slashes.
fn normalize_base_url(raw: &str) -> GatewayResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(GatewayError::InvalidUrl(raw.to_string()));
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    if with_scheme != raw {
        debug!(from = raw, to = %with_scheme, "normalized collection url");
    }
    Url::parse(&with_scheme).map_err(|_| GatewayError::InvalidUrl(raw.to_string()))
}
