//! URL slugs for categories, products and variants.

use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("static slug pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern is valid"));

/// Turn a display name into a URL slug.
///
/// Lowercases, strips everything but ASCII letters, digits, whitespace and
/// hyphens, then joins whitespace runs with a single hyphen.
///
/// ```
/// use bewear_core::slugify;
///
/// assert_eq!(slugify("Jackets & Hoodies"), "jackets-hoodies");
/// assert_eq!(slugify("Nike Vomero Sneakers-Black"), "nike-vomero-sneakers-black");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    WHITESPACE.replace_all(stripped.trim(), "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Backpack"), "backpack");
        assert_eq!(slugify("High Sock"), "high-sock");
    }

    #[test]
    fn test_slugify_strips_symbols() {
        assert_eq!(slugify("T-Shirts"), "t-shirts");
        assert_eq!(slugify("ACG T-Shirt!"), "acg-t-shirt");
        assert_eq!(slugify("Jackets & Hoodies"), "jackets-hoodies");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("  Nike   Club\tPants  "), "nike-club-pants");
    }
}
