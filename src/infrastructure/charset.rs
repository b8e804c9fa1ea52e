// Charset resolution for fetched pages
use crate::domain::error::FetchError;
use crate::domain::model::CharsetSource;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;

// <head ...> ... <meta ... charset="xxx"
static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<head(?:\s[^>]*)?>[\s\S]*?<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:\-]+)"#)
        .expect("meta charset pattern is valid")
});

/// A body decoded with its resolved charset
#[derive(Debug)]
pub struct DecodedBody {
    pub text: String,
    pub encoding: &'static Encoding,
    pub source: CharsetSource,
}

/// Extract the `charset` parameter from a `Content-Type` value.
///
/// `text/html; Charset="GBK"` yields `Some("gbk")`.
pub fn declared_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_ascii_lowercase())
        }
    })
}

/// Sniff the charset named by an HTML `<meta>` tag inside `<head>`.
///
/// The bytes are decoded provisionally as UTF-8 (lossy) before scanning, so
/// any ASCII-compatible page works regardless of its real encoding.
pub fn detect_charset(bytes: &[u8]) -> Option<String> {
    let provisional = String::from_utf8_lossy(bytes);
    META_CHARSET
        .captures(&provisional)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
}

/// Pick the encoding for a body: header charset, then meta tag, then UTF-8.
pub fn resolve_charset(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<(&'static Encoding, CharsetSource), FetchError> {
    let (label, source) = match content_type.and_then(declared_charset) {
        Some(label) => (label, CharsetSource::Header),
        None => match detect_charset(bytes) {
            Some(label) => (label, CharsetSource::Meta),
            None => return Ok((UTF_8, CharsetSource::Default)),
        },
    };

    Encoding::for_label(label.as_bytes())
        .map(|encoding| (encoding, source))
        .ok_or(FetchError::UnknownCharset(label))
}

/// Resolve the charset and re-decode the raw bytes with it.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedBody, FetchError> {
    let (encoding, source) = resolve_charset(bytes, content_type)?;
    // a BOM is stripped only when it belongs to the resolved encoding
    let (text, _had_errors) = encoding.decode_with_bom_removal(bytes);

    Ok(DecodedBody {
        text: text.into_owned(),
        encoding,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::GBK;

    fn gbk(text: &str) -> Vec<u8> {
        GBK.encode(text).0.into_owned()
    }

    #[test]
    fn test_declared_charset() {
        assert_eq!(
            declared_charset("text/html; charset=GBK"),
            Some("gbk".to_string())
        );
        assert_eq!(
            declared_charset("text/html;Charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(
            declared_charset("text/html; boundary=x; charset = 'big5'"),
            Some("big5".to_string())
        );
        assert_eq!(declared_charset("text/html"), None);
        assert_eq!(declared_charset("text/html; charset="), None);
        // a bare type is never a parameter
        assert_eq!(declared_charset("charset=gbk"), None);
    }

    #[test]
    fn test_detect_charset_meta_forms() {
        let html5 = br#"<html><head><meta charset="gb2312"><title>x</title></head></html>"#;
        assert_eq!(detect_charset(html5), Some("gb2312".to_string()));

        let http_equiv = br#"<HTML><HEAD>
<META http-equiv="Content-Type" content="text/html; charset=GBK">
</HEAD></HTML>"#;
        assert_eq!(detect_charset(http_equiv), Some("gbk".to_string()));

        let unquoted = b"<head><meta name=viewport><meta charset=utf-8></head>";
        assert_eq!(detect_charset(unquoted), Some("utf-8".to_string()));

        let head_attrs = br#"<head lang="zh"><meta charset='big5'></head>"#;
        assert_eq!(detect_charset(head_attrs), Some("big5".to_string()));
    }

    #[test]
    fn test_detect_charset_requires_head() {
        assert_eq!(detect_charset(br#"<meta charset="gbk">"#), None);
        assert_eq!(
            detect_charset(br#"<header><meta charset="gbk"></header>"#),
            None
        );
        assert_eq!(detect_charset(b"plain text"), None);
        assert_eq!(detect_charset(b""), None);
    }

    #[test]
    fn test_detect_charset_survives_non_utf8_bytes() {
        let mut page = b"<head><meta charset=\"gbk\"></head><body>".to_vec();
        page.extend(gbk("你好"));
        assert_eq!(detect_charset(&page), Some("gbk".to_string()));
    }

    #[test]
    fn test_header_beats_meta() {
        let mut page = b"<head><meta charset=\"utf-8\"></head>".to_vec();
        page.extend(gbk("中文"));

        let decoded = decode_body(&page, Some("text/html; charset=GBK")).unwrap();
        assert_eq!(decoded.source, CharsetSource::Header);
        assert_eq!(decoded.encoding, GBK);
        assert!(decoded.text.ends_with("中文"));
    }

    #[test]
    fn test_meta_used_without_header_charset() {
        let mut page = b"<head><meta charset=\"gb2312\"></head>".to_vec();
        page.extend(gbk("网页"));

        let decoded = decode_body(&page, Some("text/html")).unwrap();
        assert_eq!(decoded.source, CharsetSource::Meta);
        // WHATWG maps gb2312 to GBK
        assert_eq!(decoded.encoding, GBK);
        assert!(decoded.text.ends_with("网页"));
    }

    #[test]
    fn test_default_is_utf8() {
        let decoded = decode_body("<p>héllo</p>".as_bytes(), None).unwrap();
        assert_eq!(decoded.source, CharsetSource::Default);
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "<p>héllo</p>");
    }

    #[test]
    fn test_foreign_bom_does_not_override_header() {
        let mut page = vec![0xEF, 0xBB, 0xBF];
        page.extend(b"<p>");
        page.extend(gbk("中文"));

        let decoded = decode_body(&page, Some("text/html; charset=GBK")).unwrap();
        assert_eq!(decoded.encoding, GBK);
        assert_eq!(decoded.source, CharsetSource::Header);
        assert!(!decoded.text.starts_with('\u{FEFF}'));
        assert!(decoded.text.ends_with("<p>中文"));
    }

    #[test]
    fn test_matching_bom_is_stripped() {
        let mut page = vec![0xEF, 0xBB, 0xBF];
        page.extend("<p>ok</p>".as_bytes());

        let decoded = decode_body(&page, None).unwrap();
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "<p>ok</p>");
    }

    #[test]
    fn test_unknown_charset_is_an_error() {
        let err = decode_body(b"abc", Some("text/html; charset=x-klingon")).unwrap_err();
        assert!(matches!(err, FetchError::UnknownCharset(ref label) if label == "x-klingon"));
    }
}
