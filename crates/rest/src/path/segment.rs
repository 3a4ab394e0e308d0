use std::fmt;

/// Characters that may appear verbatim in a path segment. Everything else is
/// percent-encoded during normalization.
pub const VALID_CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~!$&'()*+,;=:@";

pub const SEPARATOR: char = '/';

/// A single, normalized segment of an URI path.
///
/// A segment always starts with the separator `/` followed by the normalized
/// segment text. Normalization keeps the characters from [`VALID_CHARS`] and
/// any well-formed percent-encoded triplet (uppercased) and percent-encodes
/// everything else from its UTF-8 representation.
///
/// Two segments are special: `/.` refers to the current hierarchy level and
/// `/..` to the level above. The bare separator `/` is the root segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    segment: String,
}

impl Segment {
    pub fn root() -> Segment {
        Segment { segment: SEPARATOR.to_string() }
    }

    pub fn current() -> Segment {
        Segment { segment: "/.".into() }
    }

    pub fn up() -> Segment {
        Segment { segment: "/..".into() }
    }

    pub fn is_root(&self) -> bool {
        self.segment == "/"
    }

    pub fn is_current(&self) -> bool {
        self.segment == "/."
    }

    pub fn is_previous(&self) -> bool {
        self.segment == "/.."
    }

    /// Parses a single raw segment into its normalized form. A leading
    /// separator is optional, the separator anywhere else in the input is
    /// percent-encoded.
    pub fn parse(segment: &str) -> Segment {
        let raw: Vec<char> = segment.chars().collect();
        let mut pos = 0;
        let mut seg = String::from(SEPARATOR);
        if raw.first() == Some(&SEPARATOR) {
            pos += 1;
        }
        while pos < raw.len() {
            let current = raw[pos];
            if VALID_CHARS.contains(current) {
                seg.push(current);
            } else if current == '%'
                && pos + 2 < raw.len()
                && raw[pos + 1].is_ascii_hexdigit()
                && raw[pos + 2].is_ascii_hexdigit()
            {
                seg.push('%');
                seg.push(raw[pos + 1].to_ascii_uppercase());
                seg.push(raw[pos + 2].to_ascii_uppercase());
                pos += 3;
                continue;
            } else {
                percent_encode_char(current, &mut seg);
            }
            pos += 1;
        }
        Segment { segment: seg }
    }

    /// Splits a path into its normalized segments.
    pub fn parse_segments(input: &str) -> Vec<Segment> {
        Scanner::new(input).map(|part| Segment::parse(&part)).collect()
    }

    /// Splits a path into its raw segment parts without normalizing them.
    pub fn split(input: &str) -> Vec<String> {
        Scanner::new(input).collect()
    }

    /// Resolves the `/.` and `/..` segments and drops redundant root segments.
    /// The result is never empty, a path that folds away completely leaves the
    /// root segment.
    pub fn normalize(segments: Vec<Segment>) -> Vec<Segment> {
        let mut normalized: Vec<Segment> = Vec::new();
        for segment in segments {
            if segment.is_current() || segment.is_root() {
                continue;
            }
            if segment.is_previous() {
                normalized.pop();
            } else {
                normalized.push(segment);
            }
        }
        if normalized.is_empty() {
            normalized.push(Segment::root());
        }
        normalized
    }

    /// Parses and normalizes a whole path into its canonical string form.
    pub fn normalize_path(path: &str) -> String {
        let segments = Segment::normalize(Segment::parse_segments(path));
        let mut normalized = String::new();
        for segment in &segments {
            normalized.push_str(&segment.segment);
        }
        normalized
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment)
    }
}

pub(crate) fn percent_encode_char(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).as_bytes() {
        out.push('%');
        out.push_str(&format!("{byte:02X}"));
    }
}

/// Splits a path into raw segments, one separator-prefixed part at a time.
///
/// The scanner keeps an explicit cursor which can be saved and restored, the
/// router uses this to rewind while descending into alternative subtrees. A
/// missing leading separator is supplied, a single trailing separator is
/// swallowed and a trailing double separator yields a final root segment.
#[derive(Debug, Clone)]
pub struct Scanner {
    input: Vec<char>,
    pos: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Scanner {
        let input = if input.starts_with(SEPARATOR) {
            input.to_owned()
        } else {
            format!("{SEPARATOR}{input}")
        };
        Scanner { input: input.chars().collect(), pos: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.pos < self.input.len() && self.input[self.pos] == SEPARATOR
    }

    /// Returns the next segment without advancing the cursor.
    pub fn look_ahead(&mut self) -> Option<Segment> {
        let old_pos = self.pos;
        let segment = self.next().map(|part| Segment::parse(&part));
        self.pos = old_pos;
        segment
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn terminate(&mut self) -> &mut Scanner {
        self.pos = self.input.len();
        self
    }

    /// The unconsumed rest of the input, starting at the cursor.
    pub fn remaining(&self) -> String {
        self.input[self.pos.min(self.input.len())..].iter().collect()
    }
}

impl Iterator for Scanner {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if !self.has_next() {
            return None;
        }
        let mut part = String::from(SEPARATOR);
        self.pos += 1;
        while self.pos < self.input.len() {
            let current = self.input[self.pos];
            if current == SEPARATOR && self.pos != self.input.len() - 1 {
                break;
            } else if current != SEPARATOR {
                part.push(current);
            } else {
                self.pos = self.input.len();
            }
            self.pos += 1;
        }
        Some(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_string() {
        assert_eq!("/", Segment::parse("").to_string());
    }

    #[test]
    fn parse_root_segment() {
        assert_eq!("/", Segment::parse("/").to_string());
    }

    #[test]
    fn parse_valid_chars_only() {
        let segment = Segment::parse(VALID_CHARS);
        assert_eq!(format!("/{VALID_CHARS}"), segment.to_string());
        let segment = Segment::parse(&format!("/{VALID_CHARS}"));
        assert_eq!(format!("/{VALID_CHARS}"), segment.to_string());
    }

    #[test]
    fn parse_some_invalid_chars() {
        let segment = Segment::parse("/abcdefg/%");
        assert_eq!("/abcdefg%2F%25", segment.to_string());
    }

    #[test]
    fn parse_with_pct_encoded() {
        let segment = Segment::parse("/abcdefg/%2F");
        assert_eq!("/abcdefg%2F%2F", segment.to_string());
        let segment = Segment::parse("/abcdefg/%2f");
        assert_eq!("/abcdefg%2F%2F", segment.to_string());
    }

    #[test]
    fn parse_multibyte_chars() {
        let segment = Segment::parse("/f%C3%BCr");
        assert_eq!("/f%C3%BCr", segment.to_string());
        let segment = Segment::parse("/für");
        assert_eq!("/f%C3%BCr", segment.to_string());
    }

    #[test]
    fn split_empty_string() {
        let segments = Segment::parse_segments("");
        assert_eq!(vec![Segment::root()], segments);
    }

    #[test]
    fn split_root_path() {
        let segments = Segment::parse_segments("/");
        assert_eq!(vec![Segment::root()], segments);
    }

    #[test]
    fn split_absolute_path() {
        for path in ["/abc/def/", "/abc/def"] {
            let segments = Segment::parse_segments(path);
            assert_eq!(vec![Segment::parse("abc"), Segment::parse("def")], segments);
        }
    }

    #[test]
    fn split_relative_path() {
        for path in ["abc/def/", "abc/def"] {
            let segments = Segment::parse_segments(path);
            assert_eq!(vec![Segment::parse("abc"), Segment::parse("def")], segments);
        }
    }

    #[test]
    fn split_leading_double_slash() {
        let segments = Segment::parse_segments("//abc/def");
        assert_eq!(
            vec![Segment::root(), Segment::parse("abc"), Segment::parse("def")],
            segments
        );
    }

    #[test]
    fn split_inner_double_slash() {
        let segments = Segment::parse_segments("/abc//def");
        assert_eq!(
            vec![Segment::parse("abc"), Segment::root(), Segment::parse("def")],
            segments
        );
    }

    #[test]
    fn split_trailing_double_slash() {
        let segments = Segment::parse_segments("/abc/def//");
        assert_eq!(
            vec![Segment::parse("abc"), Segment::parse("def"), Segment::root()],
            segments
        );
    }

    #[test]
    fn normalization_folds_dot_segments() {
        let segments = Segment::parse_segments("/abc/./defg/../");
        assert_eq!(
            vec![
                Segment::parse("abc"),
                Segment::current(),
                Segment::parse("defg"),
                Segment::up(),
            ],
            segments
        );
        let segments = Segment::normalize(segments);
        assert_eq!(vec![Segment::parse("abc")], segments);
    }

    #[test]
    fn normalization_folds_root_segments() {
        assert_eq!("/abc/def", Segment::normalize_path("//abc///def"));
        assert_eq!("/", Segment::normalize_path("//"));
    }

    #[test]
    fn normalization_of_exhausted_path_leaves_root() {
        assert_eq!("/", Segment::normalize_path("/abc/.."));
        assert_eq!("/", Segment::normalize_path("/abc/../../.."));
        assert_eq!("/", Segment::normalize_path(""));
    }

    #[test]
    fn normalize_path_keeps_plain_paths() {
        assert_eq!("/abc/def", Segment::normalize_path("/abc/def"));
        assert_eq!("/abc/cde", Segment::normalize_path("/abc/123/../0ab/../cde"));
    }

    #[test]
    fn scanner_with_single_segment() {
        let mut scanner = Scanner::new("/abcdefg");
        assert!(scanner.has_next());
        assert_eq!(Some("/abcdefg".to_owned()), scanner.next());
        assert!(!scanner.has_next());
    }

    #[test]
    fn scanner_with_multiple_segments() {
        let mut scanner = Scanner::new("/abcdefg/hijklmn/opqrstuv");
        assert_eq!(Some("/abcdefg".to_owned()), scanner.next());
        assert_eq!(Some("/hijklmn".to_owned()), scanner.next());
        assert_eq!(Some("/opqrstuv".to_owned()), scanner.next());
        assert!(!scanner.has_next());
        assert_eq!(None, scanner.next());
    }

    #[test]
    fn scanner_with_root_segment() {
        let mut scanner = Scanner::new("/");
        assert!(scanner.has_next());
        assert_eq!(Some("/".to_owned()), scanner.next());
        assert!(!scanner.has_next());
    }

    #[test]
    fn scanner_with_trailing_double_slash() {
        let mut scanner = Scanner::new("/abcdefg//");
        assert_eq!(Some("/abcdefg".to_owned()), scanner.next());
        assert_eq!(Some("/".to_owned()), scanner.next());
        assert!(!scanner.has_next());
    }

    #[test]
    fn scanner_rewinds_to_saved_position() {
        let mut scanner = Scanner::new("/abc/def");
        assert_eq!(Some("/abc".to_owned()), scanner.next());
        let saved = scanner.pos();
        assert_eq!(Some("/def".to_owned()), scanner.next());
        scanner.set_pos(saved);
        assert_eq!(Some("/def".to_owned()), scanner.next());
    }

    #[test]
    fn scanner_look_ahead_keeps_position() {
        let mut scanner = Scanner::new("/abc/def");
        assert_eq!(Some(Segment::parse("abc")), scanner.look_ahead());
        assert_eq!(Some("/abc".to_owned()), scanner.next());
    }

    #[test]
    fn scanner_remaining_returns_unconsumed_input() {
        let mut scanner = Scanner::new("/abc/def");
        scanner.next();
        assert_eq!("/def", scanner.remaining());
        scanner.terminate();
        assert_eq!("", scanner.remaining());
        assert!(!scanner.has_next());
    }
}
