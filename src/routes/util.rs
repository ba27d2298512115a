//! Shared URL/form parsing and fragment helpers for route handlers.

use std::str::FromStr;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format (from HTMX POST bodies).
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let val = parts.next().unwrap_or("");
            Some((percent_decode(key), percent_decode(val)))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. Escapes are decoded as bytes, so
/// multi-byte UTF-8 in notes and opponent names survives.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(val) => {
                        out.push(val);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Get and parse a parameter; missing or unparsable values are `None`.
pub fn get_parsed<T: FromStr>(params: &[(String, String)], key: &str) -> Option<T> {
    get_param(params, key).and_then(|v| v.trim().parse().ok())
}

/// Truthy form flag: `true`, `1`, `yes`, `on`.
pub fn get_flag(params: &[(String, String)], key: &str) -> bool {
    matches!(
        get_param(params, key).map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

pub fn html_escape(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

/// Inline error fragment swapped into the target element.
pub fn error_span(message: &str) -> String {
    format!(r#"<span class="text-red">{}</span>"#, html_escape(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_body_works() {
        let pairs = parse_form_body("id=12&to=discard&index=0");
        assert_eq!(pairs.len(), 3);
        assert_eq!(get_param(&pairs, "id"), Some("12"));
        assert_eq!(get_param(&pairs, "to"), Some("discard"));
    }

    #[test]
    fn parse_form_body_empty() {
        let pairs = parse_form_body("");
        assert!(pairs.is_empty());
    }

    #[test]
    fn percent_decode_plus_as_space() {
        assert_eq!(percent_decode("hello+world"), "hello world");
    }

    #[test]
    fn percent_decode_hex() {
        assert_eq!(percent_decode("hello%20world"), "hello world");
    }

    #[test]
    fn percent_decode_utf8_and_stray_percent() {
        assert_eq!(percent_decode("J%C3%BCrgen"), "Jürgen");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn parse_query_strips_prefix() {
        let pairs = parse_query("?foo=bar");
        assert_eq!(get_param(&pairs, "foo"), Some("bar"));
    }

    #[test]
    fn typed_params() {
        let pairs = parse_form_body("index=3&confirm=yes&bad=x");
        assert_eq!(get_parsed::<usize>(&pairs, "index"), Some(3));
        assert_eq!(get_parsed::<usize>(&pairs, "bad"), None);
        assert!(get_flag(&pairs, "confirm"));
        assert!(!get_flag(&pairs, "missing"));
    }

    #[test]
    fn error_span_escapes() {
        assert_eq!(
            error_span("no card <b>"),
            r#"<span class="text-red">no card &lt;b&gt;</span>"#
        );
    }
}
