use std::fmt;

/// A single query pair from the query string of a request URI.
///
/// A query has a key and an optional value. The same key may appear any
/// number of times within one query string, which is why requests keep their
/// queries as a list instead of a map. An empty value is treated as absent,
/// `?abc=` and `?abc` parse to the same query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    key: String,
    value: Option<String>,
}

impl Query {
    pub fn new(key: impl Into<String>) -> Query {
        Query { key: key.into(), value: None }
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Query {
        let value = value.into();
        let value = if value.is_empty() { None } else { Some(value) };
        Query { key: key.into(), value }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Parses a raw query string into its pairs, byte by byte. Keys end at
    /// `=` or `&`, values end at `&`. A `=` inside a value is kept verbatim.
    /// Percent-encoded triplets are decoded into raw bytes anywhere, so the
    /// separators themselves can be carried in encoded form.
    pub fn parse_query_string(input: &str) -> Vec<Query> {
        let mut queries = Vec::new();
        let raw: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut current_key: Option<String> = None;
        let mut buffer: Vec<u8> = Vec::new();
        while pos < raw.len() {
            let current = raw[pos];
            if current_key.is_none() && current == '=' {
                current_key = Some(flush(&mut buffer));
                pos += 1;
                continue;
            } else if current_key.is_none() && current == '&' {
                let key = flush(&mut buffer);
                queries.push(Query::new(key));
                pos += 1;
                continue;
            } else if current == '&' {
                let value = flush(&mut buffer);
                if let Some(key) = current_key.take() {
                    queries.push(Query::with_value(key, value));
                }
                pos += 1;
                continue;
            }

            if current == '%'
                && pos + 2 < raw.len()
                && raw[pos + 1].is_ascii_hexdigit()
                && raw[pos + 2].is_ascii_hexdigit()
            {
                let high = raw[pos + 1].to_digit(16).unwrap_or(0);
                let low = raw[pos + 2].to_digit(16).unwrap_or(0);
                buffer.push((high * 16 + low) as u8);
                pos += 3;
                continue;
            }

            let mut encoded = [0u8; 4];
            buffer.extend_from_slice(current.encode_utf8(&mut encoded).as_bytes());
            pos += 1;
        }
        if let Some(key) = current_key.take() {
            queries.push(Query::with_value(key, flush(&mut buffer)));
        } else {
            let key = flush(&mut buffer);
            if !key.is_empty() {
                queries.push(Query::new(key));
            }
        }
        queries
    }
}

fn flush(buffer: &mut Vec<u8>) -> String {
    let text = String::from_utf8_lossy(buffer).into_owned();
    buffer.clear();
    text
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_pair() {
        let queries = Query::parse_query_string("abc=xyz");
        assert_eq!(vec![Query::with_value("abc", "xyz")], queries);
        assert_eq!(Some("xyz"), queries[0].value());
    }

    #[test]
    fn parse_pair_with_empty_value() {
        let queries = Query::parse_query_string("abc=");
        assert_eq!(1, queries.len());
        assert_eq!("abc", queries[0].key());
        assert_eq!(None, queries[0].value());
    }

    #[test]
    fn parse_key_without_value() {
        let queries = Query::parse_query_string("abc");
        assert_eq!(vec![Query::new("abc")], queries);
    }

    #[test]
    fn parse_empty_string() {
        assert!(Query::parse_query_string("").is_empty());
    }

    #[test]
    fn parse_keeps_equals_sign_inside_values() {
        let queries = Query::parse_query_string("abc=xyz=");
        assert_eq!(vec![Query::with_value("abc", "xyz=")], queries);
    }

    #[test]
    fn parse_multiple_pairs() {
        let queries = Query::parse_query_string("abc=xyz&def=uvw&abc");
        assert_eq!(
            vec![
                Query::with_value("abc", "xyz"),
                Query::with_value("def", "uvw"),
                Query::new("abc"),
            ],
            queries
        );
    }

    #[test]
    fn parse_decodes_pct_encoded_bytes() {
        let queries = Query::parse_query_string("%25=x%26y");
        assert_eq!(vec![Query::with_value("%", "x&y")], queries);
    }

    #[test]
    fn parse_does_not_treat_decoded_separators_as_terminals() {
        let queries = Query::parse_query_string("abc=x%3Dy%26z");
        assert_eq!(vec![Query::with_value("abc", "x=y&z")], queries);
    }

    #[test]
    fn display_round_trips_pairs() {
        assert_eq!("abc=xyz", Query::with_value("abc", "xyz").to_string());
        assert_eq!("abc", Query::new("abc").to_string());
    }
}
