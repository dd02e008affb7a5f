//! Cache key fingerprinting.

use reqwest::Request;
use sha2::{Digest, Sha256};

/// Fingerprint a request for cache lookups.
///
/// The key is the SHA-256 hex digest of the method, scheme, host, port,
/// request target (path and query) and headers. Header names are
/// lower-cased and pairs are sorted, so header order never changes the key.
pub fn cache_key(request: &Request) -> String {
    let url = request.url();

    let mut hasher = Sha256::new();
    hasher.update(request.method().as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.scheme().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.host_str().unwrap_or_default().as_bytes());
    hasher.update(b"\n");
    let port = url.port_or_known_default().unwrap_or_default();
    hasher.update(port.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.path().as_bytes());
    if let Some(query) = url.query() {
        hasher.update(b"?");
        hasher.update(query.as_bytes());
    }
    hasher.update(b"\n");

    let mut headers: Vec<(String, &[u8])> = request
        .headers()
        .iter()
        .map(|(name, value)| (name.as_str().to_ascii_lowercase(), value.as_bytes()))
        .collect();
    headers.sort();
    for (name, value) in headers {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(value);
        hasher.update(b"\n");
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::{Method, Url};

    fn request(url: &str, headers: &[(&'static str, &'static str)]) -> Request {
        let mut request = Request::new(Method::GET, Url::parse(url).unwrap());
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, HeaderValue::from_static(value));
        }
        *request.headers_mut() = map;
        request
    }

    #[test]
    fn test_key_is_sha256_hex() {
        let key = cache_key(&request("https://api.fanbox.cc/post.info?postId=1", &[]));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_header_order_does_not_matter() {
        let a = request(
            "https://api.fanbox.cc/post.info?postId=1",
            &[("origin", "https://www.fanbox.cc"), ("cookie", "FANBOXSESSID=x")],
        );
        let b = request(
            "https://api.fanbox.cc/post.info?postId=1",
            &[("cookie", "FANBOXSESSID=x"), ("origin", "https://www.fanbox.cc")],
        );
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn test_key_covers_target_and_headers() {
        let base = cache_key(&request("https://api.fanbox.cc/post.info?postId=1", &[]));
        assert_ne!(
            base,
            cache_key(&request("https://api.fanbox.cc/post.info?postId=2", &[]))
        );
        assert_ne!(
            base,
            cache_key(&request("http://api.fanbox.cc/post.info?postId=1", &[]))
        );
        assert_ne!(
            base,
            cache_key(&request(
                "https://api.fanbox.cc/post.info?postId=1",
                &[("cookie", "FANBOXSESSID=y")]
            ))
        );
    }

    #[test]
    fn test_explicit_default_port_matches_implicit() {
        assert_eq!(
            cache_key(&request("https://api.fanbox.cc:443/a", &[])),
            cache_key(&request("https://api.fanbox.cc/a", &[]))
        );
    }
}
