//! Product name normalization.
//!
//! Names reach the backend from users, from the vision service and from the
//! stored catalog, each spelled its own way ("Le Lait", "laits", "lait").
//! [`normalize`] maps them to one comparison key. The key is never shown to users.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Leading articles removed from names, longest first so that "de la " wins over "de ".
const ARTICLES: &[&str] = &[
    "de la ", "de l'", "les ", "des ", "une ", "le ", "la ", "un ", "du ", "de ", "l'", "d'",
];

/// Trailing characters treated as a plural mark.
const PLURAL_SUFFIXES: &[char] = &['s', 'x'];

/// Tokens this short are never depluralized ("pas", "riz" stay as they are).
const MIN_PLURAL_TOKEN_LEN: usize = 4;

/// Canonicalizes a product name into its comparison key.
///
/// Lowercases, strips diacritics, drops leading articles, removes a naive plural
/// mark from each word and cleans punctuation and whitespace. Blank input gives
/// an empty string.
///
/// The pass is repeated until the text stops changing, so the result is a fixed
/// point: `normalize(&normalize(x)) == normalize(x)` for every input.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut current = normalize_pass(name);
    loop {
        let next = normalize_pass(&current);
        // Every pass after the first only removes characters.
        if next == current || next.len() >= current.len() {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let unaccented = strip_diacritics(&lowered);
    let without_articles = strip_articles(&unaccented);
    let singular = depluralize(without_articles);
    clean_characters(&singular)
}

fn strip_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect()
}

fn strip_articles(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        match ARTICLES.iter().find_map(|article| text.strip_prefix(article)) {
            Some(rest) if !rest.trim().is_empty() => text = rest,
            _ => return text,
        }
    }
}

fn depluralize(text: &str) -> String {
    text.split_whitespace()
        .map(depluralize_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn depluralize_token(token: &str) -> &str {
    let mut chars = token.chars().rev();
    let (Some(last), Some(before_last)) = (chars.next(), chars.next()) else {
        return token;
    };

    let is_plural = PLURAL_SUFFIXES.contains(&last)
        && before_last != last
        && token.chars().count() >= MIN_PLURAL_TOKEN_LEN;

    if is_plural {
        &token[..token.len() - last.len_utf8()]
    } else {
        token
    }
}

fn clean_characters(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
