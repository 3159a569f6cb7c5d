//! Protocol conformance validator for generated MCP servers.
//!
//! Runs a fixed sequence of HTTP checks against a running server: the root
//! listing, one resource round trip, one tool round trip and, when an API key
//! is supplied, rejection of unauthenticated calls. Network problems become
//! failed checks; [`ConformanceValidator::validate`] itself never fails.

mod report;

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value as JsonValue, json};
use tracing::{debug, info, warn};
use url::Url;
use zeroize::Zeroizing;

use crate::core::config::ValidatorSettings;
use crate::core::{Error, Result};
use crate::generation::ir::{RESOURCE_PREFIX, TOOL_PREFIX};
use crate::server::DEFAULT_API_KEY_HEADER;

pub use report::{CheckResult, ConformanceReport};

pub const CHECK_ROOT: &str = "root";
pub const CHECK_RESOURCE: &str = "resource";
pub const CHECK_TOOL: &str = "tool";
pub const CHECK_AUTH: &str = "auth";

/// Detail of the round trips when no capability listing is available
const ROOT_FAILED: &str = "root check failed";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}/]*\}").expect("valid placeholder regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub timeout: Duration,
    /// Header carrying the API key, next to `Authorization: Bearer`
    pub api_key_header: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl From<&ValidatorSettings> for ValidatorOptions {
    fn from(settings: &ValidatorSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            api_key_header: settings.api_key_header.clone(),
        }
    }
}

/// Capability paths announced by `GET /`
#[derive(Debug, Default)]
struct Listing {
    resources: Vec<String>,
    tools: Vec<String>,
}

pub struct ConformanceValidator {
    client: Client,
    options: ValidatorOptions,
}

impl ConformanceValidator {
    pub fn new(options: ValidatorOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, options })
    }

    pub async fn validate(&self, url: &str, api_key: Option<&str>) -> ConformanceReport {
        let api_key = api_key.filter(|k| !k.is_empty()).map(|k| Zeroizing::new(k.to_string()));

        let base = match Url::parse(url) {
            Ok(base) if matches!(base.scheme(), "http" | "https") => base,
            Ok(base) => {
                let check = CheckResult::fail(CHECK_ROOT, format!("unsupported scheme `{}`", base.scheme()));
                return ConformanceReport::new(url, vec![check]);
            }
            Err(e) => {
                let check = CheckResult::fail(CHECK_ROOT, format!("invalid URL: {e}"));
                return ConformanceReport::new(url, vec![check]);
            }
        };
        let base = base.as_str().trim_end_matches('/').to_string();
        info!(url = %base, authenticated = api_key.is_some(), "Validating MCP server");

        let mut checks = Vec::new();
        let (root, listing) = self.check_root(&base, api_key.as_ref()).await;
        checks.push(root);
        match listing {
            Some(listing) => {
                checks.push(self.check_resource(&base, &listing, api_key.as_ref()).await);
                checks.push(self.check_tool(&base, &listing, api_key.as_ref()).await);
                checks.push(self.check_auth(&base, &listing, api_key.as_ref()).await);
            }
            None => {
                checks.push(CheckResult::fail(CHECK_RESOURCE, ROOT_FAILED));
                checks.push(CheckResult::fail(CHECK_TOOL, ROOT_FAILED));
                checks.push(self.check_auth(&base, &Listing::default(), api_key.as_ref()).await);
            }
        }

        for check in &checks {
            if check.passed {
                debug!(check = %check.check, skipped = check.skipped, detail = %check.detail, "Check passed");
            } else {
                warn!(check = %check.check, detail = %check.detail, "Check failed");
            }
        }
        ConformanceReport::new(base, checks)
    }

    fn authorize(&self, request: RequestBuilder, api_key: Option<&Zeroizing<String>>) -> RequestBuilder {
        match api_key {
            Some(key) => request
                .header(self.options.api_key_header.as_str(), key.as_str())
                .bearer_auth(key.as_str()),
            None => request,
        }
    }

    /// Send and decode; any transport or decoding problem becomes the detail
    async fn exchange(&self, request: RequestBuilder) -> std::result::Result<(StatusCode, JsonValue), String> {
        let response = request.send().await.map_err(|e| format!("request failed: {e}"))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| format!("reading body failed: {e}"))?;
        let body = serde_json::from_str(&text).unwrap_or(JsonValue::Null);
        Ok((status, body))
    }

    async fn check_root(&self, base: &str, api_key: Option<&Zeroizing<String>>) -> (CheckResult, Option<Listing>) {
        let request = self.authorize(self.client.get(format!("{base}/")), api_key);
        let (status, body) = match self.exchange(request).await {
            Ok(exchange) => exchange,
            Err(detail) => return (CheckResult::fail(CHECK_ROOT, detail), None),
        };
        if status != StatusCode::OK {
            return (CheckResult::fail(CHECK_ROOT, format!("GET / returned HTTP {}", status.as_u16())), None);
        }

        let strings = |pointer: &str| -> Option<Vec<String>> {
            body.pointer(pointer)?
                .as_array()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect()
        };
        let named = body.get("name").is_some_and(JsonValue::is_string)
            && body.get("version").is_some_and(JsonValue::is_string);
        match (named, strings("/capabilities/resources"), strings("/capabilities/tools")) {
            (true, Some(resources), Some(tools)) => {
                let detail = format!("{} resources, {} tools", resources.len(), tools.len());
                (CheckResult::pass(CHECK_ROOT, detail), Some(Listing { resources, tools }))
            }
            _ => (
                CheckResult::fail(
                    CHECK_ROOT,
                    "GET / must return {name, version, capabilities: {resources: [..], tools: [..]}}",
                ),
                None,
            ),
        }
    }

    async fn check_resource(&self, base: &str, listing: &Listing, api_key: Option<&Zeroizing<String>>) -> CheckResult {
        let Some(path) = listing.resources.first() else {
            return CheckResult::skip(CHECK_RESOURCE, "no resources listed");
        };
        let route = format!("{RESOURCE_PREFIX}{}", fill_placeholders(path));
        let request = self.authorize(self.client.get(format!("{base}{route}")), api_key);
        round_trip(CHECK_RESOURCE, &route, "data", self.exchange(request).await)
    }

    async fn check_tool(&self, base: &str, listing: &Listing, api_key: Option<&Zeroizing<String>>) -> CheckResult {
        let Some(path) = listing.tools.first() else {
            return CheckResult::skip(CHECK_TOOL, "no tools listed");
        };
        let route = format!("{TOOL_PREFIX}{}", fill_placeholders(path));
        let request = self.authorize(self.client.post(format!("{base}{route}")).json(&json!({})), api_key);
        round_trip(CHECK_TOOL, &route, "result", self.exchange(request).await)
    }

    async fn check_auth(&self, base: &str, listing: &Listing, api_key: Option<&Zeroizing<String>>) -> CheckResult {
        if api_key.is_none() {
            return CheckResult::skip(CHECK_AUTH, "no API key supplied");
        }
        // without credentials; unknown /mcp paths must be rejected as well
        let request = match (listing.resources.first(), listing.tools.first()) {
            (Some(path), _) => self
                .client
                .get(format!("{base}{RESOURCE_PREFIX}{}", fill_placeholders(path))),
            (None, Some(path)) => self
                .client
                .post(format!("{base}{TOOL_PREFIX}{}", fill_placeholders(path)))
                .json(&json!({})),
            (None, None) => self.client.get(format!("{base}{RESOURCE_PREFIX}")),
        };
        match self.exchange(request).await {
            Ok((StatusCode::UNAUTHORIZED, _)) => CheckResult::pass(CHECK_AUTH, "unauthenticated request rejected with 401"),
            Ok((status, _)) => CheckResult::fail(
                CHECK_AUTH,
                format!("unauthenticated request returned HTTP {}, expected 401", status.as_u16()),
            ),
            Err(detail) => CheckResult::fail(CHECK_AUTH, detail),
        }
    }
}

/// `{param}` placeholders become `1`
fn fill_placeholders(path: &str) -> String {
    PLACEHOLDER_RE.replace_all(path, "1").into_owned()
}

fn round_trip(
    check: &str,
    route: &str,
    payload_key: &str,
    exchange: std::result::Result<(StatusCode, JsonValue), String>,
) -> CheckResult {
    let (status, body) = match exchange {
        Ok(exchange) => exchange,
        Err(detail) => return CheckResult::fail(check, detail),
    };
    if status != StatusCode::OK {
        return CheckResult::fail(check, format!("{route} returned HTTP {}", status.as_u16()));
    }
    let succeeded = body.get("success").and_then(JsonValue::as_bool) == Some(true);
    let payload = body.get(payload_key);
    let id = payload.and_then(|p| p.get("id")).is_some_and(JsonValue::is_string);
    let content = payload.and_then(|p| p.get("content")).is_some_and(JsonValue::is_array);
    if succeeded && id && content {
        CheckResult::pass(check, format!("{route} answered"))
    } else {
        CheckResult::fail(
            check,
            format!("{route} must return {{success: true, {payload_key}: {{id: \"..\", content: [..]}}}}"),
        )
    }
}
