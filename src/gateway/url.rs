//! URL composition helpers
//!
//! Builds gateway addresses from their parts and splits them back. Services
//! carry their upstream address both ways, so the two operations must agree:
//! `decompose(compose(..))` gives back the same parts, with a scheme-default
//! port represented as `None`.

use crate::error::{Error, Result};
use url::Url;

/// Structured form of an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    /// `None` when absent or equal to the scheme's default port
    pub port: Option<u16>,
    /// Percent-decoded path
    pub path: String,
}

fn invalid(input: &str, reason: impl std::fmt::Display) -> Error {
    Error::InvalidUrl(format!("{}: {}", input, reason))
}

/// Parse `scheme://host[:port]` into an origin URL
pub fn origin(scheme: &str, host: &str, port: Option<u16>) -> Result<Url> {
    let base = format!("{}://{}", scheme, host);
    let mut url = Url::parse(&base).map_err(|e| invalid(&base, e))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid(&base, "missing host"));
    }
    url.set_port(port)
        .map_err(|_| invalid(&base, "scheme cannot carry a port"))?;

    Ok(url)
}

/// Build an address string from its parts
pub fn compose(scheme: &str, host: &str, port: Option<u16>, path: &str) -> Result<String> {
    let mut url = origin(scheme, host, port)?;
    url.set_path(path);
    Ok(url.to_string())
}

/// Split an address string into its parts
pub fn decompose(input: &str) -> Result<UrlParts> {
    let url = Url::parse(input).map_err(|e| invalid(input, e))?;

    let host = url
        .host_str()
        .ok_or_else(|| invalid(input, "missing host"))?
        .to_string();
    let path = urlencoding::decode(url.path())
        .map_err(|e| invalid(input, e))?
        .into_owned();

    Ok(UrlParts {
        scheme: url.scheme().to_string(),
        host,
        port: url.port(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_omits_default_port() {
        assert_eq!(
            compose("http", "api", Some(80), "/foo").unwrap(),
            "http://api/foo"
        );
        assert_eq!(
            compose("https", "api", Some(443), "/").unwrap(),
            "https://api/"
        );
        assert_eq!(
            compose("http", "api", Some(8080), "/foo").unwrap(),
            "http://api:8080/foo"
        );
    }

    #[test]
    fn test_decompose_service_url() {
        let parts = decompose("http://api:8080/foo").unwrap();
        assert_eq!(
            parts,
            UrlParts {
                scheme: "http".to_string(),
                host: "api".to_string(),
                port: Some(8080),
                path: "/foo".to_string(),
            }
        );
    }

    #[test]
    fn test_decompose_without_port() {
        let parts = decompose("https://example.com").unwrap();
        assert_eq!(parts.port, None);
        assert_eq!(parts.path, "/");
    }

    #[test]
    fn test_decompose_percent_decodes_path() {
        let parts = decompose("http://api/a%20b/c").unwrap();
        assert_eq!(parts.path, "/a b/c");
    }

    #[test]
    fn test_round_trip_with_encoded_path() {
        let composed = compose("http", "api", Some(9000), "/a b").unwrap();
        assert_eq!(composed, "http://api:9000/a%20b");
        let parts = decompose(&composed).unwrap();
        assert_eq!(parts.path, "/a b");
        assert_eq!(parts.port, Some(9000));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(decompose("not a url"), Err(Error::InvalidUrl(_))));
        assert!(matches!(decompose("mailto:ops@example.com"), Err(Error::InvalidUrl(_))));
        assert!(matches!(compose("http", "", None, "/"), Err(Error::InvalidUrl(_))));
        assert!(matches!(decompose("http://api:99999/"), Err(Error::InvalidUrl(_))));
    }
}
