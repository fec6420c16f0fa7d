//! Name normalization and URI minting
//!
//! `normalize` is the only identity test used across datasets: the linker,
//! the translation merger and the augmenter all compare entities through it,
//! and every entity URI is minted through `to_uri_token`. Keep both pure.
//!
//! Matching is approximate. Names that differ beyond parentheticals, accents,
//! case and spacing do not match, and two distinct names can mint the same
//! token (e.g. `"Mr. Mime"` and `"Mr Mime"`). Collisions are not detected.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::graph::Term;
use super::vocab::Namespace;

/// Width national indices are padded to
pub const NDEX_WIDTH: usize = 4;

static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// Remove every `(...)` group together with the whitespace before it
pub fn strip_parenthetical(name: &str) -> String {
    PARENTHETICAL.replace_all(name, "").into_owned()
}

/// Fold accented Latin letters to their ASCII base
pub fn fold_diacritics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' => out.push_str("ss"),
            'ẞ' => out.push_str("SS"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'þ' => out.push_str("th"),
            'Þ' => out.push_str("TH"),
            _ => out.push(c),
        }
    }
    out
}

/// Comparison key for a display name
///
/// Drops parentheticals, lowercases, folds diacritics and collapses whitespace.
///
/// ```
/// use dexgraph::ontology::normalize::normalize;
///
/// assert_eq!(normalize("Mr. Mime (Pokémon)"), normalize("mr. mime"));
/// assert_eq!(normalize("Pokémon"), "pokemon");
/// ```
pub fn normalize(name: &str) -> String {
    let folded = fold_diacritics(&strip_parenthetical(name).to_lowercase());
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// URI-safe token for a display name
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`; case is preserved.
pub fn to_uri_token(name: &str) -> String {
    let folded = fold_diacritics(strip_parenthetical(name).trim());
    folded
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Mint the entity URI for `name` in `namespace`
pub fn mint(namespace: Namespace, name: &str) -> Term {
    namespace.term(&to_uri_token(name))
}

/// Left-pad a numeric identifier with zeros
pub fn zero_pad(id: &str, width: usize) -> String {
    let id = id.trim();
    let id = id.strip_prefix('#').unwrap_or(id);
    format!("{id:0>width$}")
}

/// Last path segment of an IRI with underscores read as spaces
///
/// Percent-encoded segments are decoded. Anything after a `(` is dropped so
/// `Bulbasaur_(Pokémon)` and `Bulbasaur` name the same resource.
pub fn resource_name(iri: &str) -> String {
    let segment = match url::Url::parse(iri) {
        Ok(parsed) => {
            let fragment = parsed.fragment().filter(|f| !f.is_empty());
            let path_last = parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty());
            fragment
                .or(path_last)
                .map(percent_decode)
                .unwrap_or_default()
        }
        Err(_) => iri
            .rsplit(['/', '#'])
            .next()
            .map(percent_decode)
            .unwrap_or_default(),
    };
    let base = segment.split('(').next().unwrap_or_default();
    base.replace('_', " ").trim().to_string()
}

fn percent_decode(s: &str) -> String {
    let query = format!("x={}", s.replace('+', "%2B").replace('&', "%26"));
    url::form_urlencoded::parse(query.as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| s.to_string())
}
