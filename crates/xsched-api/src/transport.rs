// Shared HTTP transport for the scheduler's GET-only protocol.
//
// Builds query strings the way the scheduler's parser expects them,
// enforces a timeout on every call, and decodes every body as JSON no
// matter which content type the server declares.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

/// Timeout applied to login round trips unless configured otherwise.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout applied to query and command round trips unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Characters left verbatim in query values.
///
/// Spaces must become `%20` (never `+`), and the scheduler splits
/// parameter lists on `,` and `|`, so those stay readable.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b',')
    .remove(b':')
    .remove(b'+')
    .remove(b'|')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode `key=value` pairs into a query string.
pub fn encode_query(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_VALUE),
                utf8_percent_encode(value, QUERY_VALUE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-call timeout for `xScheduleLogin` round trips.
    pub login_timeout: Duration,
    /// Per-call timeout for `xScheduleQuery` / `xScheduleCommand` round trips.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!("xsched/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// No client-wide timeout is set: every request carries its own.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .build()
            .map_err(Error::Transport)
    }
}

/// Thin GET-and-decode layer. No retries happen here.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The scheduler root URL (e.g. `http://192.168.1.20:8080/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{endpoint}?{encoded params}`.
    pub fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(endpoint)?;
        url.set_query(Some(&encode_query(params)));
        Ok(url)
    }

    /// Issue a GET and decode the body as JSON.
    ///
    /// `body` is sent as the raw request body when present; the scheduler
    /// reads it for commands that take free-form data.
    pub async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let url = self.endpoint_url(endpoint, params)?;
        debug!(endpoint, "GET");
        trace!(%url, "request url");

        let mut builder = self.http.get(url).timeout(timeout);
        if let Some(body) = body {
            builder = builder.body(body.to_owned());
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, timeout))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::from_reqwest(e, timeout))?;

        // The scheduler labels JSON as text/plain, so the header is ignored.
        serde_json::from_slice(&bytes).map_err(|e| {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (HTTP {status}, body preview: {preview:?})"),
                body,
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn spaces_are_percent_twenty() {
        let qs = encode_query(&[("Command", "Play specified playlist")]);
        assert_eq!(qs, "Command=Play%20specified%20playlist");
    }

    #[test]
    fn scheduler_punctuation_is_left_alone() {
        let qs = encode_query(&[("Parameters", "Xmas,Step 1|a-b_c.d:e+f~g")]);
        assert_eq!(qs, "Parameters=Xmas,Step%201|a-b_c.d:e+f~g");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let qs = encode_query(&[("Parameters", "a&b=c/d?e#f%")]);
        assert_eq!(qs, "Parameters=a%26b%3Dc%2Fd%3Fe%23f%25");
    }

    #[test]
    fn pairs_are_joined_in_order() {
        let qs = encode_query(&[("Query", "GetPlayingStatus"), ("Parameters", ""), ("Reference", "xsched")]);
        assert_eq!(qs, "Query=GetPlayingStatus&Parameters=&Reference=xsched");
    }

    #[test]
    fn endpoint_url_keeps_encoding() {
        let transport = Transport::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:8080").unwrap(),
        );
        let url = transport
            .endpoint_url("xScheduleCommand", &[("Command", "Stop all now")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/xScheduleCommand?Command=Stop%20all%20now"
        );
    }
}
