//! `Accept`-style header values (`Accept`, `Accept-Charset`, `Accept-Encoding`).

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static VALUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^\s,;]+)").expect("accept value pattern is valid")
});

static Q_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"q=([^;,]+)").expect("quality factor pattern is valid")
});

/// Raised when a header value cannot be read as an accept list.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidAcceptHeader {
    message: String,
}

impl InvalidAcceptHeader {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        InvalidAcceptHeader { message: message.into() }
    }
}

/// One entry of an accept list: the media range or token, its quality
/// factor and its precedence. Precedence counts the wildcards in the token,
/// so `*/*` has precedence 2 and `text/html` precedence 0.
#[derive(Debug, Clone)]
pub struct Value {
    value: String,
    q: f32,
    precedence: u32,
    pattern: Regex,
}

impl Value {
    /// Parses one accept list entry like `text/html` or `utf-8; q=0.8`.
    pub fn parse(input: &str) -> Result<Value, InvalidAcceptHeader> {
        let Some(caps) = VALUE_PATTERN.captures(input) else {
            return Err(InvalidAcceptHeader::new(format!(
                "Header value cannot be parsed as an Accept header: {input}"
            )));
        };
        let value = caps[1].trim().to_string();
        let precedence = u32::try_from(value.chars().filter(|c| *c == '*').count()).unwrap_or(u32::MAX);
        let q = match Q_PATTERN.captures(input) {
            Some(caps) => match caps[1].trim().parse::<f32>() {
                Ok(q) => q.clamp(0.0, 1.0),
                Err(_) => {
                    return Err(InvalidAcceptHeader::new(format!(
                        "Unable to parse quality factor (q=...) from string: {input}"
                    )));
                }
            },
            None => 1.0,
        };
        let pattern = compile_pattern(&value)?;
        Ok(Value { value, q, precedence, pattern })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    /// Matches `input` against the token, case insensitively. A `*` in the
    /// token stands for one or more arbitrary characters.
    pub fn matches(&self, input: &str) -> bool {
        self.pattern.is_match(&input.trim().to_lowercase())
    }
}

/// The token compiles to an anchored pattern over the lowercased input,
/// with every `*` widened to `.+`.
fn compile_pattern(value: &str) -> Result<Regex, InvalidAcceptHeader> {
    let mut pattern = String::from("^");
    for c in value.to_lowercase().chars() {
        if c == '*' {
            pattern.push_str(".+");
        } else {
            pattern.push_str(&regex::escape(&c.to_string()));
        }
    }
    pattern.push('$');
    match Regex::new(&pattern) {
        Ok(pattern) => Ok(pattern),
        Err(_) => Err(InvalidAcceptHeader::new(format!(
            "Header value cannot be parsed as an Accept header: {value}"
        ))),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.q - 1.0).abs() < f32::EPSILON {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{}; q={}", self.value, self.q)
        }
    }
}

/// A parsed accept list, ordered by descending quality factor. Ties are
/// broken by ascending precedence so that the more specific token comes
/// first. Duplicate tokens keep their first occurrence.
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
    values: Vec<Value>,
}

impl AcceptHeader {
    pub fn new() -> Self {
        AcceptHeader::default()
    }

    /// Parses a complete header value into an accept list.
    pub fn parse(value: &str) -> Result<Self, InvalidAcceptHeader> {
        let mut header = AcceptHeader::new();
        header.add(value)?;
        Ok(header)
    }

    /// Adds the entries of a raw header value, splitting at commas.
    pub fn add(&mut self, value: &str) -> Result<(), InvalidAcceptHeader> {
        for token in value.split(',').filter(|token| !token.is_empty()) {
            self.insert(Value::parse(token)?);
        }
        Ok(())
    }

    /// Adds all values of an already split header.
    pub fn add_header(&mut self, header: &crate::header::Header) -> Result<(), InvalidAcceptHeader> {
        for value in header.values() {
            self.insert(Value::parse(value)?);
        }
        Ok(())
    }

    fn insert(&mut self, value: Value) {
        if self.values.contains(&value) {
            return;
        }
        self.values.push(value);
        self.values
            .sort_by(|a, b| b.q.total_cmp(&a.q).then_with(|| a.precedence.cmp(&b.precedence)));
    }

    /// All values in negotiation order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Values with a positive quality factor, in negotiation order.
    pub fn accepted(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|value| value.q > 0.0)
    }

    /// Values with a zero quality factor. These mark explicit rejections.
    pub fn rejected(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|value| value.q <= 0.0)
    }

    /// Whether `input` is acceptable: some positive-q value must match it,
    /// and no rejection of strictly lower precedence may match it too.
    pub fn accepts(&self, input: &str) -> bool {
        let mut accepted: Option<&Value> = None;
        for value in self.accepted() {
            if value.matches(input) {
                match accepted {
                    Some(current) if value.precedence >= current.precedence => {}
                    _ => accepted = Some(value),
                }
            }
        }
        let Some(accepted) = accepted else {
            return false;
        };
        !self
            .rejected()
            .any(|value| value.matches(input) && value.precedence < accepted.precedence)
    }
}

impl fmt::Display for AcceptHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(Value::to_string).collect();
        write!(f, "{}", values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_media_types_with_quality_factors() {
        let accept = AcceptHeader::parse("image/png,image/*;q=0.8,*/*;q=0.5").unwrap();
        let values = accept.values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].value(), "image/png");
        assert!((values[0].q() - 1.0).abs() < f32::EPSILON);
        assert_eq!(values[0].precedence(), 0);
        assert_eq!(values[1].value(), "image/*");
        assert!((values[1].q() - 0.8).abs() < f32::EPSILON);
        assert_eq!(values[1].precedence(), 1);
        assert_eq!(values[2].value(), "*/*");
        assert!((values[2].q() - 0.5).abs() < f32::EPSILON);
        assert_eq!(values[2].precedence(), 2);
    }

    #[test]
    fn parses_charsets_with_rejections() {
        let accept = AcceptHeader::parse("utf-8; q=1, iso-8859-1; q=0.0").unwrap();
        let values = accept.values();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value(), "utf-8");
        assert_eq!(values[1].value(), "iso-8859-1");
        assert!(values[1].q() <= 0.0);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = AcceptHeader::parse("; q=1, iso-8859-1; q=0.0").unwrap_err();
        assert!(err.to_string().starts_with("Header value cannot be parsed as an Accept header:"));

        let err = AcceptHeader::parse("utf-8; q=high").unwrap_err();
        assert!(err.to_string().starts_with("Unable to parse quality factor (q=...) from string:"));
    }

    #[test]
    fn specific_token_sorts_before_wildcard_at_equal_q() {
        let accept = AcceptHeader::parse("text/*, text/html").unwrap();
        assert_eq!(accept.values()[0].value(), "text/html");
        assert_eq!(accept.values()[1].value(), "text/*");
    }

    #[test]
    fn duplicate_tokens_keep_the_first_occurrence() {
        let accept = AcceptHeader::parse("utf-8; q=0.5, utf-8; q=1").unwrap();
        assert_eq!(accept.values().len(), 1);
        assert!((accept.values()[0].q() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn quality_factor_is_clamped() {
        let accept = AcceptHeader::parse("utf-8; q=17, latin1; q=-3").unwrap();
        assert!((accept.values()[0].q() - 1.0).abs() < f32::EPSILON);
        assert!(accept.values()[1].q() <= 0.0);
    }

    #[test]
    fn accepts_honors_explicit_rejections() {
        let accept = AcceptHeader::parse("utf-8; q=1, iso-8859-1; q=0.0").unwrap();
        assert!(accept.accepts("UTF-8"));
        assert!(!accept.accepts("ISO-8859-1"));
    }

    #[test]
    fn wildcard_rejection_spares_specific_entries() {
        let accept = AcceptHeader::parse("utf-8; q=1, iso-8859-1; q=0.3, *; q=0").unwrap();
        assert!(accept.accepts("UTF-8"));
        assert!(accept.accepts("ISO-8859-1"));
        assert!(!accept.accepts("ISO-8859-5"));
    }

    #[test]
    fn wildcard_matches_are_case_insensitive() {
        let value = Value::parse("application/*").unwrap();
        assert!(value.matches("Application/JSON"));
        assert!(value.matches(" application/yaml "));
        assert!(!value.matches("text/plain"));
        assert!(!value.matches("application/"));
    }

    #[test]
    fn display_keeps_quality_factors() {
        let accept = AcceptHeader::parse("image/png, image/*;q=0.8").unwrap();
        assert_eq!(accept.to_string(), "image/png, image/*; q=0.8");
    }
}
