//! Merchant name normalization
//!
//! Maps a raw bank display name to the key transactions are grouped by.

use std::sync::OnceLock;

use regex::Regex;

/// Legal-entity suffixes, matched as whole ASCII words
fn entity_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?-u:\b)(?:inc|llc|ltd|co)(?-u:\b)").expect("valid regex"))
}

fn non_letter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z\s]").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Normalize a merchant display name into a grouping key
///
/// Lower-cases, drops `inc`/`llc`/`ltd`/`co` words, turns everything that is
/// not `a-z` into a separator, and collapses whitespace. An empty result means
/// the name carries no usable merchant text.
///
/// ```
/// use finpulse_core::normalize::normalize_merchant;
///
/// assert_eq!(normalize_merchant("Spotify Inc."), "spotify");
/// assert_eq!(normalize_merchant("NETFLIX.COM"), "netflix com");
/// assert_eq!(normalize_merchant("#1234"), "");
/// ```
pub fn normalize_merchant(name: &str) -> String {
    let lower = name.to_lowercase();
    let without_suffix = entity_suffix_re().replace_all(&lower, "");
    let letters_only = non_letter_re().replace_all(&without_suffix, " ");
    whitespace_re()
        .replace_all(&letters_only, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_suffixes_removed() {
        assert_eq!(normalize_merchant("Spotify Inc"), "spotify");
        assert_eq!(normalize_merchant("SPOTIFY LLC"), "spotify");
        assert_eq!(normalize_merchant("Acme Ltd."), "acme");
        assert_eq!(normalize_merchant("Water Co"), "water");
    }

    #[test]
    fn test_suffix_inside_word_kept() {
        // "co" in "costco", "inc" in "incense"
        assert_eq!(normalize_merchant("COSTCO WHOLESALE"), "costco wholesale");
        assert_eq!(normalize_merchant("Incense Shop"), "incense shop");
        assert_eq!(normalize_merchant("Taco Bell"), "taco bell");
    }

    #[test]
    fn test_punctuation_and_digits_become_separators() {
        assert_eq!(normalize_merchant("NETFLIX.COM"), "netflix com");
        assert_eq!(normalize_merchant("AMZN Mktp US*2K4"), "amzn mktp us k");
        assert_eq!(normalize_merchant("  Hulu   #882  "), "hulu");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_merchant("Apple\t\tMusic\n"), "apple music");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(normalize_merchant(""), "");
        assert_eq!(normalize_merchant("1234-5678"), "");
        assert_eq!(normalize_merchant("Inc. LLC"), "");
    }

    #[test]
    fn test_non_ascii_letters_stripped() {
        assert_eq!(normalize_merchant("Café Rouge"), "caf rouge");
    }

    #[test]
    fn test_deterministic() {
        let a = normalize_merchant("Gym Membership CO #12");
        let b = normalize_merchant("Gym Membership CO #12");
        assert_eq!(a, b);
        assert_eq!(a, "gym membership");
    }
}
