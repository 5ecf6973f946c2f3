//! Sort-friendly artist names.

/// Leading articles, longest first so "the " wins over "a ".
const LEADING_ARTICLES: [&str; 3] = ["the ", "an ", "a "];

/// Trims `name` and drops one leading English article, case-insensitively.
///
/// `"The Beatles"` sorts as `"Beatles"`, `"A Tribe"` as `"Tribe"`.
pub fn sortable_name(name: &str) -> &str {
    let trimmed = name.trim();
    for article in LEADING_ARTICLES {
        let starts_with_article = trimmed
            .get(..article.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(article));
        if starts_with_article {
            return trimmed[article.len()..].trim();
        }
    }
    trimmed
}

/// Upper-cased first character of the sortable name, if any.
///
/// Leading digits and punctuation are kept as they are: `"10cc"` files
/// under `'1'`.
pub fn alpha_bucket(name: &str) -> Option<char> {
    sortable_name(name)
        .chars()
        .next()
        .map(|c| c.to_uppercase().next().unwrap_or(c))
}
