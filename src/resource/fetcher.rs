//! Resource Fetcher
//!
//! Follows the Admin API pagination protocol: every list response is
//! `{"data": [...], "next": <url or null>}`.
//!
//! The gateway reports `next` as an absolute URL or as a path. A path starting
//! with `/` is taken relative to the gateway base address, so a base mounted
//! under a prefix (`http://edge/admin`) keeps that prefix on later pages.

use crate::error::{Error, Result};
use crate::gateway::http::HttpTransport;
use async_stream::stream;
use futures::stream::BoxStream;
use serde_json::Value;
use url::Url;

/// One decoded page of a list endpoint
#[derive(Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_url: Option<String>,
}

impl Page {
    /// Split a list response, resolving `next` against `base_url` or `current_url`
    pub fn parse(base_url: &str, current_url: &str, response: Value) -> Result<Self> {
        let Value::Object(mut body) = response else {
            return Ok(Self::default());
        };

        let items = match body.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        let next_url = match body.remove("next") {
            Some(Value::String(next)) if !next.is_empty() => Some(resolve(base_url, current_url, &next)?),
            _ => None,
        };

        Ok(Self { items, next_url })
    }
}

fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|e| Error::InvalidUrl(format!("{}: {}", input, e)))
}

fn resolve(base_url: &str, current_url: &str, next: &str) -> Result<String> {
    if next.starts_with('/') && !next.starts_with("//") {
        let base = parse_url(base_url)?;
        let prefix = base.path().trim_end_matches('/');
        let prefixed = !prefix.is_empty()
            && next
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']));

        if !prefixed {
            return Ok(format!("{}{}", base_url.trim_end_matches('/'), next));
        }
    }

    let joined = parse_url(current_url)?
        .join(next)
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", next, e)))?;
    Ok(joined.to_string())
}

/// Lazily stream every object of a list endpoint
///
/// Nothing is requested until the stream is polled, and the next page is
/// only fetched once the current one is exhausted, so dropping the stream
/// early saves the remaining requests.
pub fn paginate(
    transport: HttpTransport,
    base_url: String,
    url: String,
) -> BoxStream<'static, Result<Value>> {
    Box::pin(stream! {
        let mut next_url = Some(url);
        let mut pages = 0usize;

        while let Some(current) = next_url.take() {
            let response = match transport.get(&current).await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            pages += 1;

            let page = match Page::parse(&base_url, &current, response) {
                Ok(page) => page,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            tracing::debug!("page {} of {}: {} items", pages, current, page.items.len());

            next_url = page.next_url;
            for item in page.items {
                yield Ok(item);
            }
        }
    })
}
