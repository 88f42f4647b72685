// Async HTTP client for the Netbox REST API.
//
// Base path: whatever `api_url` points at, usually `https://netbox/api/`.
// Auth: `Authorization: Token <key>` header on every request.
// Only reads are issued. Collection reads fetch a single page.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::{Device, Interface, Page, Vlan};
use crate::transport::TransportConfig;

/// Netbox error bodies look like `{"detail": "Not found."}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    detail: Option<String>,
}

/// Longest body excerpt carried in error messages.
const PREVIEW_CHARS: usize = 200;

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

// ── Client ───────────────────────────────────────────────────────────

/// Read-only client for a Netbox instance.
///
/// Holds the normalized base URL and a `reqwest::Client` with the token
/// header baked in. Constructed once per run.
pub struct NetboxClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NetboxClient {
    pub const DEVICES: &'static str = "dcim/devices/";
    pub const INTERFACES: &'static str = "dcim/interfaces/";
    pub const VLANS: &'static str = "ipam/vlans/";

    /// Page size requested by [`filter`](Self::filter) callers that don't care.
    pub const DEFAULT_LIMIT: u32 = 1000;

    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/` so relative endpoint paths join
    /// underneath it instead of replacing the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Generic reads ────────────────────────────────────────────────

    /// Fetch a single resource: `GET {base}{path}{id}`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, id: u64) -> Result<T, Error> {
        let url = self.url(&format!("{path}{id}"))?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    /// Fetch one page of a collection filtered by field equality.
    ///
    /// `criteria` become query parameters alongside `limit`. Only the
    /// `results` of the first page are returned; a `next` cursor is logged
    /// and otherwise ignored.
    pub async fn filter<T: DeserializeOwned>(
        &self,
        path: &str,
        criteria: &[(&str, String)],
        limit: u32,
    ) -> Result<Vec<T>, Error> {
        let url = self.url(path)?;
        let mut params: Vec<(&str, String)> = criteria.to_vec();
        params.push(("limit", limit.to_string()));
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(&params).send().await?;
        let page: Page<T> = Self::handle_response(resp).await?;

        if page.next.is_some() {
            warn!(
                path,
                total = page.count,
                returned = page.results.len(),
                "result set truncated at limit={limit}; further pages are not fetched"
            );
        }

        Ok(page.results)
    }

    // ── Typed reads ──────────────────────────────────────────────────

    pub async fn device(&self, id: u64) -> Result<Device, Error> {
        self.get(Self::DEVICES, id).await
    }

    /// Devices whose name equals `name` exactly.
    pub async fn devices_named(&self, name: &str) -> Result<Vec<Device>, Error> {
        self.filter(Self::DEVICES, &[("name", name.to_owned())], Self::DEFAULT_LIMIT)
            .await
    }

    pub async fn interface(&self, id: u64) -> Result<Interface, Error> {
        self.get(Self::INTERFACES, id).await
    }

    /// All interfaces belonging to one device.
    pub async fn device_interfaces(&self, device_id: u64) -> Result<Vec<Interface>, Error> {
        self.filter(
            Self::INTERFACES,
            &[("device_id", device_id.to_string())],
            Self::DEFAULT_LIMIT,
        )
        .await
    }

    /// The whole VLAN catalog.
    pub async fn vlans(&self) -> Result<Vec<Vlan>, Error> {
        self.filter(Self::VLANS, &[], Self::DEFAULT_LIMIT).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Error::InvalidToken {
                status: status.as_u16(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.detail)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw)
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}
