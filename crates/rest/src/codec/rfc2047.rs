//! MIME encoded-word codec for non-ASCII header values (RFC 2047).
//!
//! Header values travel as ISO-8859-1 on the wire. Values outside that
//! range are carried as encoded words of the form `=?charset?enc?payload?=`
//! where `enc` is `B` (base64) or `Q` (quoted-printable). Decoding is
//! forgiving: any token that does not parse as an encoded word is passed
//! through verbatim.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

/// Delimiters around which header values are split for decoding. The
/// delimiters themselves are preserved in the output.
const DECODE_DELIMITERS: &str = " \t";

/// Delimiters around which header values are split for encoding. Kept
/// outside the encoded words so that structured values stay structured.
const ENCODE_DELIMITERS: &str = "\t ,;:-/=+#*";

/// Decodes all RFC 2047 encoded words contained in a header value.
///
/// The input is split into tokens at whitespace. Tokens that look like
/// encoded words are decoded, everything else is copied unchanged. Tokens
/// with an unsupported charset or encoding, or with undecodable payloads,
/// are copied unchanged as well.
pub fn decode_header(input: &str) -> String {
    let mut decoded = String::new();
    for token in tokenize(input, DECODE_DELIMITERS) {
        decoded.push_str(&decode_word(&token));
    }
    decoded
}

/// Encodes a header value into a mix of plain tokens and RFC 2047 encoded
/// words.
///
/// The input is split at common structural delimiters. Tokens that fit
/// into ISO-8859-1 are copied verbatim, all others become UTF-8 quoted
/// printable encoded words.
pub fn encode_header(input: &str) -> String {
    let mut encoded = String::new();
    for token in tokenize(input, ENCODE_DELIMITERS) {
        if token.chars().all(|c| (c as u32) <= 0xFF) {
            encoded.push_str(&token);
        } else {
            encoded.push_str(&encode_word(&token));
        }
    }
    encoded
}

/// Splits `input` into tokens, keeping each delimiter as a token of its own.
fn tokenize(input: &str, delimiters: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in input.chars() {
        if delimiters.contains(c) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Decodes a single token. Returns the token verbatim unless it is a
/// well-formed encoded word in a supported charset and encoding.
fn decode_word(token: &str) -> String {
    if token.len() < 4 || !token.starts_with("=?") || !token.ends_with("?=") {
        return token.to_string();
    }
    let inner = &token[2..token.len() - 2];
    let parts: Vec<&str> = inner.splitn(3, '?').collect();
    if parts.len() != 3 {
        return token.to_string();
    }
    let (charset, encoding, payload) = (parts[0], parts[1], parts[2]);
    let bytes = match encoding.to_ascii_uppercase().as_str() {
        "B" => match BASE64.decode(payload) {
            Ok(bytes) => bytes,
            Err(_) => return token.to_string(),
        },
        "Q" => match decode_quoted(payload) {
            Some(bytes) => bytes,
            None => return token.to_string(),
        },
        _ => return token.to_string(),
    };
    match decode_charset(charset, &bytes) {
        Some(decoded) => decoded,
        None => {
            debug!("Skipping decoding of header token \"{}\": unsupported charset \"{}\".", token, charset);
            token.to_string()
        }
    }
}

/// Decodes the quoted printable payload of an encoded word into raw bytes.
fn decode_quoted(payload: &str) -> Option<Vec<u8>> {
    let raw: Vec<char> = payload.chars().collect();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut pos = 0;
    while pos < raw.len() {
        match raw[pos] {
            '_' => {
                bytes.push(b' ');
                pos += 1;
            }
            '=' => {
                if pos + 2 >= raw.len() {
                    return None;
                }
                let high = raw[pos + 1].to_digit(16)?;
                let low = raw[pos + 2].to_digit(16)?;
                bytes.push((high * 16 + low) as u8);
                pos += 3;
            }
            c => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                pos += 1;
            }
        }
    }
    Some(bytes)
}

/// Interprets `bytes` in the given charset. Only the charsets that appear
/// in practice on header values are supported.
fn decode_charset(charset: &str, bytes: &[u8]) -> Option<String> {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => String::from_utf8(bytes.to_vec()).ok(),
        "us-ascii" | "ascii" => {
            if bytes.is_ascii() {
                String::from_utf8(bytes.to_vec()).ok()
            } else {
                None
            }
        }
        // ISO-8859-1 maps bytes to the first 256 code points one to one.
        "iso-8859-1" | "iso8859-1" | "latin1" => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        _ => None,
    }
}

/// Encodes a single token as a UTF-8 quoted printable encoded word.
fn encode_word(token: &str) -> String {
    let mut word = String::from("=?UTF-8?Q?");
    for &byte in token.as_bytes() {
        if byte == b' ' {
            word.push('_');
        } else if is_printable(byte) {
            word.push(char::from(byte));
        } else {
            word.push_str(&format!("={byte:02X}"));
        }
    }
    word.push_str("?=");
    word
}

/// Printable characters that may appear verbatim inside a quoted printable
/// encoded word. `=`, `?` and `_` carry meaning there and must be escaped.
fn is_printable(byte: u8) -> bool {
    (0x21..=0x7E).contains(&byte) && byte != b'=' && byte != b'?' && byte != b'_'
}
