use axum::http::{HeaderMap, HeaderValue, header};

const NO_CACHE: &str = "no-cache";
const ASSET_CACHE: &str = "public, max-age=3600";

/// extension, content type, cache control
const EXTENSION_HEADERS: &[(&str, &str, Option<&str>)] = &[
    ("html", "text/html; charset=utf-8", Some(NO_CACHE)),
    ("htm", "text/html; charset=utf-8", Some(NO_CACHE)),
    ("json", "application/json", Some(NO_CACHE)),
    ("xml", "application/xml", Some(NO_CACHE)),
    ("txt", "text/plain; charset=utf-8", None),
    ("css", "text/css; charset=utf-8", Some(ASSET_CACHE)),
    ("js", "text/javascript; charset=utf-8", Some(ASSET_CACHE)),
    ("mjs", "text/javascript; charset=utf-8", Some(ASSET_CACHE)),
    ("map", "application/json", Some(ASSET_CACHE)),
    ("svg", "image/svg+xml", Some(ASSET_CACHE)),
    ("png", "image/png", Some(ASSET_CACHE)),
    ("jpg", "image/jpeg", Some(ASSET_CACHE)),
    ("jpeg", "image/jpeg", Some(ASSET_CACHE)),
    ("gif", "image/gif", Some(ASSET_CACHE)),
    ("webp", "image/webp", Some(ASSET_CACHE)),
    ("ico", "image/x-icon", Some(ASSET_CACHE)),
    ("woff", "font/woff", Some(ASSET_CACHE)),
    ("woff2", "font/woff2", Some(ASSET_CACHE)),
    ("ttf", "font/ttf", Some(ASSET_CACHE)),
    ("otf", "font/otf", Some(ASSET_CACHE)),
    ("eot", "application/vnd.ms-fontobject", Some(ASSET_CACHE)),
    ("pdf", "application/pdf", None),
];

fn lookup(path: &str) -> Option<&'static (&'static str, &'static str, Option<&'static str>)> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = file_name.rsplit_once('.')?;
    EXTENSION_HEADERS
        .iter()
        .find(|(ext, _, _)| ext.eq_ignore_ascii_case(extension))
}

pub fn content_type_for(path: &str) -> Option<&'static str> {
    lookup(path).map(|(_, content_type, _)| *content_type)
}

/// Response headers for a file, chosen by its extension. Unknown
/// extensions yield an empty map.
pub fn headers_for_path(path: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some((_, content_type, cache_control)) = lookup(path) {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        if let Some(cache_control) = cache_control {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_and_css_get_their_content_types() {
        let html = headers_for_path("default/Component/foo/index.html");
        assert_eq!(html[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(html[header::CACHE_CONTROL], NO_CACHE);

        let css = headers_for_path("default/Component/foo/assets/main.css");
        assert_eq!(css[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert_eq!(css[header::CACHE_CONTROL], ASSET_CACHE);
    }

    #[test]
    fn extensions_match_case_insensitively() {
        assert_eq!(content_type_for("img/LOGO.PNG"), Some("image/png"));
    }

    #[test]
    fn unknown_or_missing_extension_has_no_headers() {
        assert!(headers_for_path("a/b/c/LICENSE").is_empty());
        assert!(headers_for_path("a/b/c/archive.tar.zst").is_empty());
        // dot in a directory name is not an extension
        assert_eq!(content_type_for("a/v1.2/README"), None);
    }
}
