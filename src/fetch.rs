use crate::config::{RemoteConfig, RemoteMode};
use crate::model::Record;
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fetches a pre-structured batch of records from the configured remote
/// source. The payload is a JSON array of records — already shaped, so it
/// bypasses the text parser entirely and feeds the merge reconciler.
///
/// `file` and `inline` modes exist so sync flows are testable without a
/// network, mirroring the upload path's semantics exactly.
pub fn fetch_remote_records(remote: &RemoteConfig) -> Result<Vec<Record>> {
    let body = match remote.mode {
        RemoteMode::Http => fetch_http(remote)?,
        RemoteMode::File => fetch_file(remote)?,
        RemoteMode::Inline => fetch_inline(remote)?,
    };

    let records: Vec<Record> =
        serde_json::from_slice(&body).context("remote payload is not a JSON array of records")?;

    info!(records = records.len(), "remote batch fetched");
    Ok(records)
}

fn fetch_http(remote: &RemoteConfig) -> Result<Vec<u8>> {
    let endpoint = remote
        .endpoint
        .as_ref()
        .context("remote.endpoint missing for http mode")?;
    Url::parse(endpoint).with_context(|| format!("invalid remote endpoint {endpoint}"))?;

    let mut headers = HeaderMap::new();
    for (k, v) in &remote.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }
    if let Some(user_agent) = &remote.user_agent {
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(remote.timeout_secs))
        .default_headers(headers)
        .build()
        .context("failed to build reqwest client")?;

    fetch_with_retries(
        &client,
        endpoint,
        remote.retry_attempts,
        remote.retry_backoff_ms,
    )
}

fn fetch_with_retries(
    client: &Client,
    url: &str,
    retry_attempts: u8,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>> {
    let attempts = retry_attempts.max(1);

    for attempt in 1..=attempts {
        match client.get(url).send() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    if attempt == attempts {
                        bail!("request to {url} failed with status {status}");
                    }
                    warn!(%url, %status, attempt, "request failed; retrying");
                } else {
                    return Ok(resp.bytes()?.to_vec());
                }
            }
            Err(err) => {
                if attempt == attempts {
                    return Err(err).with_context(|| format!("request to {url} failed"));
                }
                warn!(%url, attempt, error = %err, "request errored; retrying");
            }
        }

        std::thread::sleep(Duration::from_millis(retry_backoff_ms));
    }

    bail!("request to {url} failed after retries")
}

fn fetch_file(remote: &RemoteConfig) -> Result<Vec<u8>> {
    let file_path = remote
        .file_path
        .as_ref()
        .context("remote.file_path missing for file mode")?;
    let bytes = std::fs::read(file_path)
        .with_context(|| format!("failed to read remote file {}", file_path.display()))?;

    info!(file = %file_path.display(), bytes = bytes.len(), "loaded file remote");
    Ok(bytes)
}

fn fetch_inline(remote: &RemoteConfig) -> Result<Vec<u8>> {
    let inline = remote
        .inline_data
        .as_ref()
        .context("remote.inline_data missing for inline mode")?;

    debug!(bytes = inline.len(), "loaded inline remote");
    Ok(inline.as_bytes().to_vec())
}
