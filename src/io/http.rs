use async_trait::async_trait;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap, RANGE};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ReadAt;
use anyhow::{Context, Result, anyhow, bail};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 10;
/// Backoff step; the n-th retry waits n steps
const RETRY_STEP: Duration = Duration::from_millis(500);

/// ZIM archive served over HTTP, read with Range requests
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Probe `url` with a HEAD request.
    ///
    /// Fails unless the server advertises byte ranges and a Content-Length.
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let resp = client
            .head(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;
        if !resp.status().is_success() {
            bail!("HEAD {} returned {}", url, resp.status());
        }

        if !accepts_byte_ranges(resp.headers()) {
            bail!("{} does not support Range requests", url);
        }
        let size = content_length(resp.headers())
            .ok_or_else(|| anyhow!("{} did not return a Content-Length", url))?;

        tracing::debug!(url = %url, size, "opened remote archive");

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Bytes received so far
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// One ranged GET starting at `start`, filling as much of `dst` as the
    /// server sends. Timeouts and connection failures are retried.
    async fn fetch_into(&self, start: u64, dst: &mut [u8]) -> Result<usize> {
        let end = start + dst.len() as u64 - 1;
        let range = format!("bytes={}-{}", start, end);

        let mut attempt = 0;
        let resp = loop {
            match self.client.get(&self.url).header(RANGE, &range).send().await {
                Ok(resp) => break resp,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt + 1 < MAX_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        range = %range,
                        attempt,
                        max = MAX_RETRIES,
                        "request failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(RETRY_STEP * attempt).await;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("GET {} ({})", self.url, range));
                }
            }
        };

        if resp.status() != StatusCode::PARTIAL_CONTENT {
            bail!("GET {} ({}) returned {}", self.url, range, resp.status());
        }

        let body = resp.bytes().await?;
        let n = body.len().min(dst.len());
        dst[..n].copy_from_slice(&body[..n]);
        self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let wanted = buf.len().min((self.size - offset) as usize);
        let mut received = 0;
        while received < wanted {
            let n = self
                .fetch_into(offset + received as u64, &mut buf[received..wanted])
                .await?;
            if n == 0 {
                break;
            }
            received += n;
        }

        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

fn accepts_byte_ranges(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("bytes"))
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
