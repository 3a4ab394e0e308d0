use once_cell::sync::Lazy;
use regex::Regex;

use crate::path::parameter::PathParameter;
use crate::path::segment::{percent_encode_char, Segment, VALID_CHARS};
use crate::path::{InvalidUriTemplate, UriTemplateMismatch};

pub const VARIABLE_OPEN: char = '{';
pub const VARIABLE_CLOSE: char = '}';

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-zA-Z_][a-zA-Z0-9]*$").expect("variable name pattern is valid"));

/// Matches one segment of an URI template against concrete path segments.
///
/// A template segment consists of literal text and any number of variables
/// written as `{name}`. Literal text is normalized with the same
/// percent-encoding rules as [`Segment::parse`], variables match one or more
/// characters each and capture the matched text under their name.
///
/// Two matchers are equal when their compiled patterns are equal. The variable
/// names do not take part in the comparison, `/abc-{var1}` and `/abc-{var2}`
/// address the same subtree of a router.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    pattern: Regex,
    definition: String,
    variable_names: Vec<String>,
}

impl SegmentMatcher {
    /// The matcher for the root segment `/`.
    pub fn root() -> SegmentMatcher {
        SegmentMatcher::parse("/").expect("root template is valid")
    }

    /// Parses a single segment of an URI template.
    pub fn parse(segment: &str) -> Result<SegmentMatcher, InvalidUriTemplate> {
        let raw: Vec<char> = segment.chars().collect();
        let mut pos = 0;
        let mut variables = Vec::new();
        let mut pattern = String::from('^');
        let mut literal = String::from('/');
        let mut definition = String::from('/');
        if raw.first() == Some(&'/') {
            pos += 1;
        }
        while pos < raw.len() {
            let current = raw[pos];
            if VALID_CHARS.contains(current) {
                literal.push(current);
                definition.push(current);
            } else if current == VARIABLE_OPEN {
                definition.push(current);
                pattern.push_str(&regex::escape(&literal));
                literal.clear();
                let mut variable_name = String::new();
                loop {
                    pos += 1;
                    if pos == raw.len() {
                        return Err(InvalidUriTemplate::new(format!(
                            "Unclosed path variable in URI template: {segment}"
                        )));
                    }
                    let current = raw[pos];
                    definition.push(current);
                    if current == '/' {
                        return Err(InvalidUriTemplate::new(format!(
                            "Unclosed path variable in URI template: {segment}"
                        )));
                    }
                    if current == VARIABLE_CLOSE {
                        pattern.push_str("(.+)");
                        if !VARIABLE_PATTERN.is_match(&variable_name) {
                            return Err(InvalidUriTemplate::new(format!(
                                "Invalid path variable name '{variable_name}' in URI template: {segment}"
                            )));
                        }
                        variables.push(variable_name);
                        break;
                    }
                    variable_name.push(current);
                }
            } else if current == '%'
                && pos + 2 < raw.len()
                && raw[pos + 1].is_ascii_hexdigit()
                && raw[pos + 2].is_ascii_hexdigit()
            {
                literal.push('%');
                literal.push(raw[pos + 1].to_ascii_uppercase());
                literal.push(raw[pos + 2].to_ascii_uppercase());
                definition.push('%');
                definition.push(raw[pos + 1].to_ascii_uppercase());
                definition.push(raw[pos + 2].to_ascii_uppercase());
                pos += 3;
                continue;
            } else {
                let mut encoded = String::new();
                percent_encode_char(current, &mut encoded);
                literal.push_str(&encoded);
                definition.push_str(&encoded);
            }
            pos += 1;
        }
        pattern.push_str(&regex::escape(&literal));
        pattern.push('$');
        let pattern = Regex::new(&pattern)
            .map_err(|err| InvalidUriTemplate::new(format!("Unable to compile URI template: {err}")))?;
        Ok(SegmentMatcher { pattern, definition, variable_names: variables })
    }

    /// Parses a whole URI template into one matcher per segment.
    pub fn parse_segments(input: &str) -> Result<Vec<SegmentMatcher>, InvalidUriTemplate> {
        Segment::split(input)
            .iter()
            .map(|raw| SegmentMatcher::parse(raw))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| {
                InvalidUriTemplate::new(format!("Unable to parse URI template '{input}': {err}"))
            })
    }

    /// Matches a normalized segment against this template. On a match the
    /// captured variable values are returned in declaration order.
    pub fn match_segment(
        &self,
        input: &Segment,
    ) -> Result<Vec<PathParameter>, UriTemplateMismatch> {
        let segment = input.to_string();
        let Some(captures) = self.pattern.captures(&segment) else {
            return Err(UriTemplateMismatch::new(format!(
                "Segment '{}' does not match URI template '{}'.",
                segment, self.definition
            )));
        };
        let params = self
            .variable_names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let value = captures.get(idx + 1).map_or("", |group| group.as_str());
                PathParameter::new(name, value)
            })
            .collect();
        Ok(params)
    }

    /// Matches a raw segment, normalizing it first.
    pub fn match_str(&self, input: &str) -> Result<Vec<PathParameter>, UriTemplateMismatch> {
        self.match_segment(&Segment::parse(input))
    }

    pub fn mismatch(&self, input: &Segment) -> bool {
        self.match_segment(input).is_err()
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }
}

impl PartialEq for SegmentMatcher {
    fn eq(&self, other: &SegmentMatcher) -> bool {
        self.pattern.as_str() == other.pattern.as_str()
    }
}

impl Eq for SegmentMatcher {}

impl std::fmt::Display for SegmentMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.definition)
    }
}
