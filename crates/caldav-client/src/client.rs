//! HTTP client for CalDAV operations.
//!
//! Every operation issues exactly one request: PROPFIND/REPORT bodies come from
//! [`crate::xml`], multistatus responses go through [`crate::decode`], and PUT
//! and DELETE statuses are interpreted here. Nothing is retried or cached.

use caldav_core::MultiStatus;
use reqwest::header::{CONTENT_TYPE, ETAG, HeaderMap, HeaderValue, IF_MATCH};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Proxy, RequestBuilder, StatusCode};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::config::CalDavConfig;
use crate::decode::{decode_multistatus, decode_multistatus_if_present};
use crate::error::{CalDavError, CalDavResult};
use crate::xml;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// A response with its body fully read.
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

/// CalDAV client bound to one server and one set of credentials.
///
/// Connection parameters are fixed at construction, and all operations take
/// `&self`, so a client can be shared between tasks without locking.
#[derive(Debug, Clone)]
pub struct CalDavClient {
    client: Client,
    config: CalDavConfig,
}

impl CalDavClient {
    /// Creates a new CalDAV client with the given configuration.
    ///
    /// Only the configured proxy is used; proxy environment variables are
    /// ignored. Redirects are never followed, a 3xx is reported like any
    /// other non-2xx status.
    pub fn new(config: CalDavConfig) -> CalDavResult<Self> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent);

        builder = match config.proxy {
            Some(ref proxy) => builder.proxy(Proxy::all(proxy).map_err(|e| {
                CalDavError::Configuration(format!("invalid proxy {}: {}", proxy, e))
            })?),
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(|e| {
            CalDavError::Configuration(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    /// Returns the base URL from the configuration.
    pub fn base_url(&self) -> &str {
        self.config.url_str()
    }

    pub fn config(&self) -> &CalDavConfig {
        &self.config
    }

    /// Resolves the authenticated user's principal (PROPFIND, Depth 0).
    ///
    /// `url` may be absolute or relative to the base URL.
    pub async fn current_user_principal(&self, url: &str) -> CalDavResult<MultiStatus> {
        let url = self.config.resolve(url)?;
        let body = xml::current_user_principal_body()?;
        self.dav_query("current_user_principal", dav_method("PROPFIND")?, url, 0, body)
            .await
    }

    /// Resolves the calendar home set of a principal (PROPFIND, Depth 0).
    pub async fn calendar_home_set(&self, url: &str) -> CalDavResult<MultiStatus> {
        let url = self.config.resolve(url)?;
        let body = xml::calendar_home_set_body()?;
        self.dav_query("calendar_home_set", dav_method("PROPFIND")?, url, 0, body)
            .await
    }

    /// Lists the collections under a home set with their display name, ctag
    /// and supported components (PROPFIND, Depth 1).
    pub async fn calendar_component_set(&self, url: &str) -> CalDavResult<MultiStatus> {
        let url = self.config.resolve(url)?;
        let body = xml::calendar_component_set_body()?;
        self.dav_query("calendar_component_set", dav_method("PROPFIND")?, url, 1, body)
            .await
    }

    /// Searches the base calendar collection for VEVENTs whose `field`
    /// property matches `id` (REPORT calendar-query, Depth 1).
    pub async fn search(&self, field: &str, id: &str) -> CalDavResult<MultiStatus> {
        if field.trim().is_empty() {
            return Err(CalDavError::InvalidArgument(
                "search field must not be empty".to_string(),
            ));
        }
        let body = xml::calendar_query_body(field, id)?;
        self.dav_query("search", dav_method("REPORT")?, self.config.url.clone(), 1, body)
            .await
    }

    /// Creates or replaces the event at `path`.
    ///
    /// With `etag`, the request carries `If-Match` and the server refuses it
    /// (412) if the resource changed since that etag was read. Without it the
    /// write is unconditional.
    ///
    /// Returns the new `ETag` header exactly as sent by the server, or `None`
    /// when a successful response carries none.
    pub async fn put(
        &self,
        path: &str,
        event_body: impl Into<String>,
        etag: Option<&str>,
    ) -> CalDavResult<Option<String>> {
        let operation = "put";
        let url = self.config.resolve(path)?;
        let if_match = etag.map(if_match_value).transpose()?;
        debug!(operation, url = %url, conditional = if_match.is_some(), "Sending PUT");

        let mut request = self
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, CALENDAR_CONTENT_TYPE)
            .body(event_body.into());
        if let Some(if_match) = if_match {
            request = request.header(IF_MATCH, if_match);
        }

        let response = self.execute(operation, request).await?;
        if !response.status.is_success() {
            warn!(operation, status = %response.status, "Server rejected PUT");
            return Err(CalDavError::Mutation {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        let new_etag = response
            .headers
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if new_etag.is_none() {
            debug!(operation, status = %response.status, "PUT succeeded without an ETag");
        }
        Ok(new_etag)
    }

    /// Deletes the event at `path`, guarded by `If-Match: etag`.
    ///
    /// An empty or malformed etag is refused before anything is sent. A 2xx
    /// response with an empty body, or with a body that is not a multistatus,
    /// yields an empty [`MultiStatus`]; a multistatus body is decoded and
    /// returned, and fails with [`CalDavError::Decode`] if it is invalid.
    pub async fn delete(&self, path: &str, etag: &str) -> CalDavResult<MultiStatus> {
        let operation = "delete";
        if etag.trim().is_empty() {
            return Err(CalDavError::InvalidArgument(
                "delete requires the etag of the resource".to_string(),
            ));
        }

        let url = self.config.resolve(path)?;
        let if_match = if_match_value(etag)?;
        debug!(operation, url = %url, "Sending DELETE");

        let request = self.request(Method::DELETE, url).header(IF_MATCH, if_match);
        let response = self.execute(operation, request).await?;
        if !response.status.is_success() {
            warn!(operation, status = %response.status, "Server rejected DELETE");
            return Err(CalDavError::Mutation {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(MultiStatus::default());
        }
        match decode_multistatus_if_present(&response.body) {
            Ok(Some(multistatus)) => Ok(multistatus),
            Ok(None) => {
                warn!(
                    operation,
                    status = %response.status,
                    "Ignoring non-multistatus DELETE response body"
                );
                Ok(MultiStatus::default())
            }
            Err(e) => {
                error!(operation, error = %e, "Failed to decode multistatus response");
                Err(e)
            }
        }
    }

    /// Starts a request with basic credentials attached when configured.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match self.config.username {
            Some(ref username) => request.basic_auth(username, self.config.password.as_ref()),
            None => request,
        }
    }

    /// Sends a PROPFIND or REPORT and decodes the multistatus answer.
    async fn dav_query(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        depth: u8,
        body: String,
    ) -> CalDavResult<MultiStatus> {
        debug!(operation, method = %method, url = %url, depth, "Sending request");
        trace!(operation, body = %body, "Request body");

        let request = self
            .request(method, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .header("Depth", depth.to_string())
            .header("Prefer", "return-minimal")
            .body(body);

        let response = self.execute(operation, request).await?;
        if !response.status.is_success() {
            warn!(operation, status = %response.status, "Unexpected response status");
            return Err(CalDavError::UnexpectedStatus {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        decode_multistatus(&response.body).inspect_err(|e| {
            error!(operation, error = %e, "Failed to decode multistatus response");
        })
    }

    /// Sends the request and reads the whole body.
    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> CalDavResult<RawResponse> {
        let response = request.send().await.map_err(|e| {
            error!(operation, error = %e, "Request failed");
            CalDavError::transport(format!("{} request failed", operation), e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            error!(operation, error = %e, "Failed to read response body");
            CalDavError::transport(format!("failed to read {} response", operation), e)
        })?;

        debug!(operation, status = %status, "Received response");
        trace!(operation, body = %body, "Response body");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Checks a caller supplied etag before it goes into `If-Match`.
fn if_match_value(etag: &str) -> CalDavResult<HeaderValue> {
    HeaderValue::from_str(etag).map_err(|_| {
        CalDavError::InvalidArgument(format!("etag is not a valid header value: {:?}", etag))
    })
}

/// Builds one of the WebDAV extension methods.
fn dav_method(name: &str) -> CalDavResult<Method> {
    Method::from_bytes(name.as_bytes())
        .map_err(|_| CalDavError::Configuration(format!("invalid HTTP method: {}", name)))
}
