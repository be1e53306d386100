//! Deterministic résumé text cleaning.
//!
//! Rules run in a fixed order; later rules consume residue left by earlier ones:
//! 1. `http…` runs plus trailing whitespace → one space
//! 2. `RT` / `cc` → space
//! 3. `#hashtag` → removed
//! 4. `@mention` → two spaces
//! 5. ASCII punctuation → space
//! 6. non-ASCII → space
//! 7. whitespace runs → one space
//!
//! Leading and trailing spaces are kept; callers trim for display if they want.

use std::sync::LazyLock;

use regex::Regex;

// Whitespace here also covers the information separators U+001C..U+001F,
// which Unicode `White_Space` (and so `\s`) leaves out.
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http[^\s\x1c-\x1f]+[\s\x1c-\x1f]*").unwrap());
static RETWEET_CC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"RT|cc").unwrap());
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[^\s\x1c-\x1f]+").unwrap());
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[^\s\x1c-\x1f]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\x1c-\x1f]+").unwrap());

pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

pub fn normalize(text: &str) -> String {
    let text = URL.replace_all(text, " ");
    let text = RETWEET_CC.replace_all(&text, " ");
    let text = HASHTAG.replace_all(&text, "");
    let text = MENTION.replace_all(&text, "  ");
    let text = replace_chars(&text, |c| PUNCTUATION.contains(c));
    let text = replace_chars(&text, |c| !c.is_ascii());
    WHITESPACE.replace_all(&text, " ").into_owned()
}

fn replace_chars(text: &str, matches: impl Fn(char) -> bool) -> String {
    text.chars()
        .map(|c| if matches(c) { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_contact_line() {
        let cleaned = normalize("Contact me at http://foo.com or @jane #hire RT!");
        assert_eq!(cleaned, "Contact me at or ");
        assert_eq!(cleaned.trim(), "Contact me at or");
    }

    #[test]
    fn test_url_swallows_trailing_whitespace() {
        assert_eq!(normalize("see https://x.io/a?b=1\n\n\tnext"), "see next");
        assert_eq!(normalize("www.portfolio.dev"), "www portfolio dev");
    }

    #[test]
    fn test_bare_http_without_suffix_survives() {
        // `http\S+` needs at least one character after the scheme prefix
        assert_eq!(normalize("http only"), "http only");
    }

    #[test]
    fn test_rt_and_cc_replaced_anywhere() {
        assert_eq!(normalize("RT great post cc team"), " great post team");
        assert_eq!(normalize("Accounting"), "A ounting");
        assert_eq!(normalize("ART"), "A ");
    }

    #[test]
    fn test_hashtag_removed_without_space() {
        assert_eq!(normalize("skills#rust #go done"), "skills done");
    }

    #[test]
    fn test_mention_and_email() {
        assert_eq!(normalize("ping @jane_doe now"), "ping now");
        assert_eq!(normalize("jane@example.com"), "jane ");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize("C++/Java, SQL; (5 yrs)"), "C Java SQL 5 yrs ");
        assert_eq!(normalize(r#"a\b"c'd`e"#), "a b c d e");
    }

    #[test]
    fn test_non_ascii_becomes_space() {
        assert_eq!(normalize("Zoë • Python – ML"), "Zo Python ML");
    }

    #[test]
    fn test_whitespace_collapsed_not_trimmed() {
        assert_eq!(normalize("  Java\r\n\r\n  Developer  "), " Java Developer ");
    }

    #[test]
    fn test_information_separators_are_whitespace() {
        assert_eq!(normalize("Java\x1c\x1dDeveloper"), "Java Developer");
        assert_eq!(normalize("#hire\x1fJava"), " Java");
        assert_eq!(normalize("@jane\x1eSQL"), " SQL");
        assert_eq!(normalize("see http://x.io\x1f\x1fnext"), "see next");
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize(""), "");
    }

    fn is_space(c: char) -> bool {
        c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
    }

    fn assert_clean(output: &str) {
        assert!(output.is_ascii(), "non-ascii in {output:?}");
        assert!(
            !output.chars().any(|c| PUNCTUATION.contains(c)),
            "punctuation in {output:?}"
        );
        let chars: Vec<char> = output.chars().collect();
        assert!(
            !chars
                .windows(2)
                .any(|w| is_space(w[0]) && is_space(w[1])),
            "consecutive whitespace in {output:?}"
        );
    }

    proptest! {
        #[test]
        fn prop_idempotent(input in any::<String>()) {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_output_is_clean(input in any::<String>()) {
            assert_clean(&normalize(&input));
        }

        #[test]
        fn prop_noise_tokens_removed(prefix in "[a-zA-Z ]{0,20}", suffix in "[a-zA-Z ]{0,20}") {
            let input = format!("{prefix} http://example.com {suffix} #tag123 @user1 {prefix}");
            let output = normalize(&input);
            prop_assert!(!output.contains("http://example.com"));
            prop_assert!(!output.contains("#tag123"));
            prop_assert!(!output.contains("@user1"));
        }
    }
}
