use crate::models::{Algorithm, ChecksumResult};

/// Pulls the first hash out of user-supplied text. Accepted line shapes:
/// - single hex line
/// - "filename <hash>"
/// - "hash  filename"
pub fn parse_first_hash_from_text(s: &str) -> Option<String> {
    for line in s.lines() {
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = t.split_whitespace().collect();
        if tokens.len() == 1 {
            return Some(tokens[0].to_string());
        }
        // CRC32 values are short, so any hex token of 8+ chars counts
        for &tok in &tokens {
            let tok = tok.trim_start_matches('*');
            if tok.len() >= 8 && tok.chars().all(|c| c.is_ascii_hexdigit()) {
                return Some(tok.to_string());
            }
        }
    }
    None
}

/// Returns the first algorithm whose digest equals `expected`, ignoring case.
/// CRC32 is printed without padding, so leading zeros in `expected` are ignored for it.
pub fn find_match(result: &ChecksumResult, expected: &str) -> Option<Algorithm> {
    let expected = expected.trim();
    if expected.is_empty() {
        return None;
    }
    result.iter().find_map(|(algorithm, hex)| {
        let matched = match algorithm {
            Algorithm::Crc32 => {
                let trimmed = expected.trim_start_matches('0');
                let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
                trimmed.eq_ignore_ascii_case(hex)
            }
            _ => expected.eq_ignore_ascii_case(hex),
        };
        matched.then_some(algorithm)
    })
}
