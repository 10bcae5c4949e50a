//! Helpers for scraping vendor console output.

use std::collections::BTreeMap;

/// Drop every ASCII control character except newline, plus anything outside
/// printable ASCII. Carriage returns, bells, and cursor junk go away.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|&c| (' '..='~').contains(&c) || c == '\n')
        .collect()
}

/// Parse `key <sep> value` lines.
///
/// The separator is the first `sep` outside parentheses, so labels such as
/// `Up time (Days hh:mm:ss): 2 days, 3:04:05` split after the closing
/// parenthesis. Lines without a separator or with an empty key are skipped;
/// later duplicates overwrite earlier ones.
pub fn parse_key_value(text: &str, sep: char) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();

    for line in text.lines() {
        let mut depth = 0i32;
        let split = line.char_indices().find_map(|(i, c)| {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ if c == sep && depth == 0 => return Some(i),
                _ => {}
            }
            None
        });

        let Some(at) = split else { continue };
        let key = line[..at].trim();
        let value = line[at + sep.len_utf8()..].trim();
        if !key.is_empty() {
            pairs.insert(key.to_owned(), value.to_owned());
        }
    }

    pairs
}
