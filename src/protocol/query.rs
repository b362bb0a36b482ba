//! Query string decoding
//!
//! Parses a raw CGI query string into an ordered sequence of key/value
//! pairs. Decoding is total: it accepts arbitrary bytes, never fails, and
//! leaves malformed percent-escapes in place as literal text.

/// Ordered key/value pairs decoded from a query string.
///
/// Duplicate keys are permitted and order is preserved. Handlers that only
/// honor the first occurrence of a key use [`QueryParams::first`]; handlers
/// that consume every occurrence use [`QueryParams::all`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses a raw query string into decoded pairs.
    ///
    /// Records are separated by `&`; each record is split on its first `=`,
    /// and a record without `=` yields an empty value. Empty records (from
    /// leading, trailing, or doubled `&`) are dropped. Key and value are
    /// percent-decoded independently; decoded bytes that are not valid
    /// UTF-8 are replaced lossily.
    pub fn parse(raw: &[u8]) -> QueryParams {
        let mut pairs = Vec::new();
        for record in raw.split(|&b| b == b'&') {
            if record.is_empty() {
                continue;
            }
            let (key, value) = match record.iter().position(|&b| b == b'=') {
                Some(i) => (&record[..i], &record[i + 1..]),
                None => (record, &record[record.len()..]),
            };
            pairs.push((
                into_string(decode_component(key)),
                into_string(decode_component(value)),
            ));
        }
        QueryParams { pairs }
    }

    /// Returns the value of the first occurrence of `key`, if any.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `key`, in query order.
    pub fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when no pairs were decoded at all.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All decoded pairs in query order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

fn into_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Percent-decodes one key or value half of a query record.
///
/// `+` decodes to space and `%XX` with two hex digits decodes to the
/// corresponding byte. A `%` with missing or non-hex digits is passed
/// through literally together with the bytes it examined, so the output is
/// never shorter than the well-formed decoding would be.
fn decode_component(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (raw.get(i + 1).copied(), raw.get(i + 2).copied()) {
                (Some(hi), Some(lo)) => match (hex_value(hi), hex_value(lo)) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                    }
                    (Some(_), None) => {
                        // Second digit invalid: keep all three bytes literal.
                        out.extend_from_slice(&[b'%', raw[i + 1], raw[i + 2]]);
                        i += 3;
                    }
                    (None, _) => {
                        // First digit invalid: keep the escape and that byte.
                        out.extend_from_slice(&[b'%', raw[i + 1]]);
                        i += 2;
                    }
                },
                (Some(only), None) => {
                    out.extend_from_slice(&[b'%', only]);
                    i += 2;
                }
                (None, _) => {
                    // Trailing percent.
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
