//! URL helpers shared by the resolver, classifier and relay.

use url::Url;

/// Return the serialized origin (`scheme://host[:port]`) of a URL.
///
/// Opaque origins (`data:`, `blob:`, ...) have no usable serialization and
/// yield `None`.
pub fn origin(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

/// Parse `raw` as an absolute `http`/`https` URL.
pub fn parse_http_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_drops_path_and_query() {
        let url = Url::parse("https://Cdn.Example.com/a/b?c=d#e").unwrap();
        assert_eq!(origin(&url).as_deref(), Some("https://cdn.example.com"));
    }

    #[test]
    fn origin_keeps_non_default_port() {
        let url = Url::parse("http://127.0.0.1:8081/x").unwrap();
        assert_eq!(origin(&url).as_deref(), Some("http://127.0.0.1:8081"));
    }

    #[test]
    fn opaque_origin_is_none() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert!(origin(&url).is_none());
    }

    #[test]
    fn parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("https://host.example/v").is_some());
        assert!(parse_http_url("file:///etc/passwd").is_none());
        assert!(parse_http_url("not a url").is_none());
        assert!(parse_http_url("/relative/path").is_none());
    }
}
