use unicode_normalization::UnicodeNormalization;

fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Trim whitespace and byte-order marks from both ends. Stray BOMs show up
/// where two exports were concatenated.
pub fn trim_text(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// NFD-decompose and drop C0 control characters and combining diacritics.
/// Case and surrounding whitespace are left alone.
pub fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| *c >= '\u{20}' && !is_diacritic(*c))
        .collect()
}

/// Folded, trimmed, lowercased form used to compare headers and tokens.
pub fn fold_key(value: &str) -> String {
    trim_text(&fold(value)).to_lowercase()
}

/// `"Anillo Solitario Ñandú"` -> `"anillo-solitario-nandu"`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.nfd().filter(|c| !is_diacritic(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
