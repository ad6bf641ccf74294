//! Canonicalization of noisy scraped text.

use unicode_normalization::UnicodeNormalization;

/// Clean a scraped string into a canonical form.
///
/// Compatibility-normalizes (NFKC), folds typographic quote and prime
/// variants to their ASCII equivalents, drops control characters, collapses
/// every run of whitespace (non-breaking included) to a single space, and
/// trims surrounding whitespace plus literal quote characters.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw
        .nfkc()
        .map(fold_quote)
        .filter(|c| !c.is_control())
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut last_space = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }

    out.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

fn fold_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{00B4}' | '`' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
        _ => c,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn folds_typographic_quotes() {
        assert_eq!(normalize("\u{201C}Hello\u{2019}s   Caf\u{00E9}\u{201D}"), "Hello's Café");
    }

    #[test]
    fn collapses_exotic_whitespace() {
        assert_eq!(normalize("a\u{00A0}\u{2003} b\t\nc"), "a b c");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(normalize("ab\u{0000}c\u{009F}d"), "abcd");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "\u{201C}Hello\u{2019}s   Caf\u{00E9}\u{201D}",
            "  ''nested quotes''  ",
            "plain",
            "",
            "\u{FB01}ne print", // ligature, NFKC-expanded
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \u{00A0}\t "), "");
        assert_eq!(normalize("\"\""), "");
    }
}
