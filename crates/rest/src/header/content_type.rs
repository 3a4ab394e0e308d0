//! The `Content-Type` header with its parsed media type and charset.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::header::Header;

static MEDIA_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+/[^\s;,]+)").expect("media type pattern is valid"));

static CHARSET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"charset=([^\s;,]+)").expect("charset pattern is valid"));

/// Raised for header values without a media type, and for malformed media
/// ranges passed to [`ContentTypeHeader::matches`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidContentType {
    message: String,
}

impl InvalidContentType {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        InvalidContentType { message: message.into() }
    }
}

/// A `Content-Type` header that keeps its media type and charset parsed
/// alongside the raw value. Values are strings only, the typed integer and
/// date setters of [`Header`] are deliberately not offered here.
///
/// Every [`set`](ContentTypeHeader::set) re-parses both parts, and
/// [`change`](ContentTypeHeader::change) goes the other way, rewriting the
/// backing value from the parts.
#[derive(Debug, Clone)]
pub struct ContentTypeHeader {
    header: Header,
    media_type: String,
    charset: Option<String>,
}

impl ContentTypeHeader {
    /// Parses a raw header value like `application/json; charset=utf-8`.
    pub fn parse(value: &str) -> Result<ContentTypeHeader, InvalidContentType> {
        let Some(caps) = MEDIA_TYPE_PATTERN.captures(value) else {
            return Err(InvalidContentType::new(
                "Content-Type header needs at least one media type value.",
            ));
        };
        let media_type = caps[1].to_lowercase();
        let charset = CHARSET_PATTERN
            .captures(value)
            .map(|caps| caps[1].trim().to_lowercase());
        let mut header = Header::new("Content-Type");
        header.add(value);
        Ok(ContentTypeHeader { header, media_type, charset })
    }

    /// Replaces the value and re-parses media type and charset.
    pub fn set(&mut self, value: &str) -> Result<(), InvalidContentType> {
        *self = ContentTypeHeader::parse(value)?;
        Ok(())
    }

    /// The lowercased `type/subtype` part.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The lowercased charset parameter, if present.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// The canonical form `type/subtype` or `type/subtype; charset=...`.
    pub fn normalized(&self) -> String {
        match &self.charset {
            Some(charset) => format!("{}; charset={}", self.media_type, charset),
            None => self.media_type.clone(),
        }
    }

    /// Rewrites media type and charset, and the backing value with them.
    pub fn change(&mut self, media_type: &str, charset: Option<&str>) {
        self.media_type = media_type.trim().to_lowercase();
        self.charset = charset.filter(|charset| !charset.is_empty()).map(str::to_lowercase);
        self.header.set(&self.normalized());
    }

    /// Matches the media type against a media range like `*/*`, `text/*`,
    /// `*/plain` or `text/plain`.
    pub fn matches(&self, media_range: &str) -> Result<bool, InvalidContentType> {
        let Some((range_type, range_subtype)) = media_range.split_once('/') else {
            return Err(InvalidContentType::new(
                "Not a media range. Media ranges have a format of \"*/*\", e.g. \"text/plain\".",
            ));
        };
        if range_type != "*" && !self.media_type.starts_with(&format!("{range_type}/")) {
            return Ok(false);
        }
        if range_subtype != "*" && !self.media_type.ends_with(&format!("/{range_subtype}")) {
            return Ok(false);
        }
        Ok(true)
    }

    /// The underlying header with the raw value.
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn combined(&self) -> String {
        self.header.combined()
    }
}

impl fmt::Display for ContentTypeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_media_type_and_charset() {
        let header = ContentTypeHeader::parse("Application/JSON; charset=UTF-8").unwrap();
        assert_eq!("application/json", header.media_type());
        assert_eq!(Some("utf-8"), header.charset());
        assert_eq!("application/json; charset=utf-8", header.normalized());
    }

    #[test]
    fn parses_media_type_without_charset() {
        let header = ContentTypeHeader::parse("text/plain").unwrap();
        assert_eq!("text/plain", header.media_type());
        assert_eq!(None, header.charset());
        assert_eq!("text/plain", header.normalized());
    }

    #[test]
    fn rejects_values_without_media_type() {
        assert!(ContentTypeHeader::parse("charset=utf-8").is_err());
        assert!(ContentTypeHeader::parse("").is_err());
    }

    #[test]
    fn set_reparses_both_parts() {
        let mut header = ContentTypeHeader::parse("text/plain").unwrap();
        header.set("application/x-yaml; charset=utf-8").unwrap();
        assert_eq!("application/x-yaml", header.media_type());
        assert_eq!(Some("utf-8"), header.charset());
    }

    #[test]
    fn change_rewrites_the_backing_value() {
        let mut header = ContentTypeHeader::parse("text/plain; charset=ascii").unwrap();
        header.change("Application/XML", Some("UTF-8"));
        assert_eq!("application/xml", header.media_type());
        assert_eq!(Some("utf-8"), header.charset());
        assert_eq!("application/xml; charset=utf-8", header.combined());
        header.change("text/html", None);
        assert_eq!("text/html", header.combined());
    }

    #[test]
    fn matches_media_ranges() {
        let header = ContentTypeHeader::parse("application/json; charset=utf-8").unwrap();
        assert!(header.matches("*/*").unwrap());
        assert!(header.matches("application/*").unwrap());
        assert!(header.matches("*/json").unwrap());
        assert!(header.matches("application/json").unwrap());
        assert!(!header.matches("text/*").unwrap());
        assert!(!header.matches("application/xml").unwrap());
    }

    #[test]
    fn matches_rejects_malformed_ranges() {
        let header = ContentTypeHeader::parse("application/json").unwrap();
        assert!(header.matches("json").is_err());
    }
}
