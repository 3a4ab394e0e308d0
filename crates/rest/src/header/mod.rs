//! Typed access to HTTP headers.
//!
//! [`Header`] keeps the values of one header as an ordered list. Raw wire
//! values are split at commas and RFC 2047 decoded on the way in, and joined
//! with `, ` (re-encoding where needed) on the way out. [`Headers`] is the
//! ordered collection used by requests and responses, keyed by the
//! normalized header name.

pub mod accept;
pub mod content_type;

pub use accept::AcceptHeader;
pub use content_type::ContentTypeHeader;

use chrono::{DateTime, Utc};

use crate::codec::rfc2047;

/// Format of HTTP date header values (IMF-fixdate, always GMT).
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Normalizes a header name to its canonical dash-separated capitalization,
/// so `content-length` and `lengTH` become `Content-Length` and `Length`.
pub fn normalize_name(name: &str) -> String {
    let mut parts: Vec<&str> = name.split('-').collect();
    while parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    let mut normalized = String::new();
    for part in parts {
        let capitalized = capitalize(part);
        if !normalized.is_empty() {
            normalized.push('-');
        }
        normalized.push_str(&capitalized);
    }
    normalized
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) if !chars.as_str().is_empty() => {
            let mut capitalized: String = first.to_uppercase().collect();
            capitalized.push_str(&chars.as_str().to_lowercase());
            capitalized
        }
        _ => part.to_uppercase(),
    }
}

/// Splits a raw header value at commas. Zero-length tokens between commas
/// are dropped, the remaining tokens are trimmed.
fn split_values(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| token.trim().to_string())
}

/// A single HTTP header with a normalized name and a list of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    values: Vec<String>,
}

impl Header {
    pub fn new(name: &str) -> Self {
        Header {
            name: normalize_name(name),
            values: Vec::new(),
        }
    }

    /// Parses a raw value from the wire, splitting at commas and decoding
    /// RFC 2047 encoded words in each part.
    pub fn decode(name: &str, value: &str) -> Self {
        let mut header = Header::new(name);
        for token in split_values(value) {
            header.values.push(rfc2047::decode_header(&token));
        }
        header
    }

    /// Builds a header from an already decoded value. The value is split at
    /// commas but taken as is otherwise.
    pub fn create(name: &str, value: &str) -> Self {
        let mut header = Header::new(name);
        header.values.extend(split_values(value));
        header
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends the parts of `value`, split at commas.
    pub fn add(&mut self, value: &str) {
        self.values.extend(split_values(value));
    }

    /// Appends all values of another header.
    pub fn append(&mut self, other: Header) {
        self.values.extend(other.values);
    }

    pub fn add_int(&mut self, value: i64) {
        self.values.push(value.to_string());
    }

    pub fn add_date(&mut self, value: DateTime<Utc>) {
        self.values.push(value.format(DATE_FORMAT).to_string());
    }

    /// Replaces all values with the parts of `value`.
    pub fn set(&mut self, value: &str) {
        self.values.clear();
        self.add(value);
    }

    pub fn set_int(&mut self, value: i64) {
        self.values.clear();
        self.add_int(value);
    }

    pub fn set_date(&mut self, value: DateTime<Utc>) {
        self.values.clear();
        self.add_date(value);
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First value, if any.
    pub fn get(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values joined with `, `, without re-encoding.
    pub fn combined(&self) -> String {
        self.values.join(", ")
    }

    /// The wire representation: each value RFC 2047 encoded where needed,
    /// joined with `, `.
    pub fn encoded(&self) -> String {
        let encoded: Vec<String> = self.values.iter().map(|value| rfc2047::encode_header(value)).collect();
        encoded.join(", ")
    }

    /// First value, or the empty string.
    pub fn as_string(&self) -> &str {
        self.get().unwrap_or("")
    }

    /// First value parsed as an integer, or 0.
    pub fn as_int(&self) -> i64 {
        match self.get() {
            Some(value) => value.parse().unwrap_or(0),
            None => 0,
        }
    }

    /// First value parsed as an HTTP date.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        let value = self.get()?;
        match DateTime::parse_from_rfc2822(value) {
            Ok(date) => Some(date.with_timezone(&Utc)),
            Err(_) => None,
        }
    }
}

/// Ordered collection of headers. Lookup goes by normalized name, iteration
/// follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: Vec<Header>,
}

impl Headers {
    pub fn new() -> Self {
        Headers::default()
    }

    pub fn get(&self, name: &str) -> Option<&Header> {
        let normalized = normalize_name(name);
        self.headers.iter().find(|header| header.name == normalized)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Header> {
        let normalized = normalize_name(name);
        self.headers.iter_mut().find(|header| header.name == normalized)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends `value` to the named header, creating it if necessary.
    pub fn add(&mut self, name: &str, value: &str) {
        match self.get_mut(name) {
            Some(header) => header.add(value),
            None => self.headers.push(Header::create(name, value)),
        }
    }

    /// Replaces the named header with `value`.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.get_mut(name) {
            Some(header) => header.set(value),
            None => self.headers.push(Header::create(name, value)),
        }
    }

    pub fn add_int(&mut self, name: &str, value: i64) {
        match self.get_mut(name) {
            Some(header) => header.add_int(value),
            None => {
                let mut header = Header::new(name);
                header.add_int(value);
                self.headers.push(header);
            }
        }
    }

    pub fn add_date(&mut self, name: &str, value: DateTime<Utc>) {
        match self.get_mut(name) {
            Some(header) => header.add_date(value),
            None => {
                let mut header = Header::new(name);
                header.add_date(value);
                self.headers.push(header);
            }
        }
    }

    /// Decodes a raw wire value and merges it into the collection. Repeated
    /// headers accumulate their values in order.
    pub fn decode(&mut self, name: &str, value: &str) {
        self.insert(Header::decode(name, value));
    }

    /// Merges a prebuilt header into the collection.
    pub fn insert(&mut self, header: Header) {
        match self.get_mut(&header.name) {
            Some(existing) => existing.append(header),
            None => self.headers.push(header),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Header> {
        let normalized = normalize_name(name);
        let idx = self.headers.iter().position(|header| header.name == normalized)?;
        Some(self.headers.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("content-type"), "Content-Type");
        assert_eq!(normalize_name("lengTH"), "Length");
        assert_eq!(normalize_name("t"), "T");
        assert_eq!(normalize_name("x-forwarded-for"), "X-Forwarded-For");
    }

    #[test]
    fn create_splits_at_commas() {
        let header = Header::create("Accept-Language", "de_DE;0.5, *");
        assert_eq!(header.values(), ["de_DE;0.5", "*"]);
        assert_eq!(header.get(), Some("de_DE;0.5"));
    }

    #[test]
    fn add_appends_values() {
        let mut header = Header::create("Accept-Language", "de_DE;0.5, *");
        header.add("test1");
        assert_eq!(header.values()[2], "test1");
    }

    #[test]
    fn combined_joins_values() {
        let mut header = Header::new("Accept-Language");
        header.add("de_DE;0.5");
        header.add("fr_FR;0.3");
        header.add("*");
        assert_eq!(header.combined(), "de_DE;0.5, fr_FR;0.3, *");
    }

    #[test]
    fn decode_unpacks_encoded_words() {
        let header = Header::decode("X-Subject", "=?UTF-8?Q?=D9=8A=D9=88=D9=85?=");
        assert_eq!(header.get(), Some("يوم"));

        let header = Header::decode("X-Subject", "plain, =?UTF-8?B?SGVsbG8=?=");
        assert_eq!(header.values(), ["plain", "Hello"]);
    }

    #[test]
    fn encoded_rewraps_non_latin_values() {
        let mut header = Header::new("X-Subject");
        header.add("plain");
        header.add("يوم");
        assert_eq!(header.encoded(), "plain, =?UTF-8?Q?=D9=8A=D9=88=D9=85?=");
    }

    #[test]
    fn as_int_falls_back_to_zero() {
        let header = Header::create("Content-Length", "42");
        assert_eq!(header.as_int(), 42);
        let header = Header::create("Content-Length", "nonsense");
        assert_eq!(header.as_int(), 0);
        let header = Header::new("Content-Length");
        assert_eq!(header.as_int(), 0);
    }

    #[test]
    fn dates_round_trip_in_imf_fixdate() {
        let date = Utc.with_ymd_and_hms(1994, 11, 15, 8, 12, 31).unwrap();
        let mut header = Header::new("Date");
        header.add_date(date);
        assert_eq!(header.as_string(), "Tue, 15 Nov 1994 08:12:31 GMT");
        assert_eq!(header.as_date(), Some(date));
    }

    #[test]
    fn malformed_dates_read_as_none() {
        let header = Header::create("Date", "never o'clock");
        assert_eq!(header.as_date(), None);
    }

    #[test]
    fn collection_preserves_insertion_order() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "application/json");
        headers.add("Vary", "Accept");
        headers.add("vary", "Accept-Charset");
        let names: Vec<&str> = headers.iter().map(Header::name).collect();
        assert_eq!(names, ["Content-Type", "Vary"]);
        assert_eq!(headers.get("VARY").map(Header::combined), Some("Accept, Accept-Charset".to_string()));
    }

    #[test]
    fn decode_merges_repeated_headers() {
        let mut headers = Headers::new();
        headers.decode("accept", "text/html");
        headers.decode("Accept", "application/json;q=0.8");
        let header = headers.get("Accept").unwrap();
        assert_eq!(header.values(), ["text/html", "application/json;q=0.8"]);
    }

    #[test]
    fn set_replaces_values() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        headers.set("Content-Type", "application/json");
        assert_eq!(headers.get("Content-Type").unwrap().combined(), "application/json");
    }

    #[test]
    fn remove_drops_the_header() {
        let mut headers = Headers::new();
        headers.add("Content-Encoding", "gzip");
        assert!(headers.remove("content-encoding").is_some());
        assert!(headers.get("Content-Encoding").is_none());
        assert!(headers.remove("Content-Encoding").is_none());
    }
}
