//! Contact placeholder injection and detection.
//!
//! The generative service is told never to emit bracketed placeholders, but
//! it still does. `inject_contact_data` substitutes real values where the
//! user supplied them and strips what it cannot fill (including the dangling
//! `|` separators that removal leaves behind); `find_missing_contact_fields`
//! reports which placeholder families survive in a document.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactData {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
}

static NAME_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[Full Name\]|\[Name\]").unwrap());
static PHONE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[Phone Number\]|\[Phone\]|\[Mobile Number\]").unwrap());
static EMAIL_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[Email Address\]|\[Email\]").unwrap());
static LOCATION_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[Location\]|\[City, Country\]|\[City\]").unwrap());
static LINKEDIN_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[LinkedIn Profile\]|\[LinkedIn[^\]]*\]").unwrap());

static LEADING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]\s*\|\s*").unwrap());
static TRAILING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\s*\[[^\]]+\]").unwrap());
static LEFTOVER_CONTACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[(Phone|Email|Location|LinkedIn)[^\]]*\]").unwrap());
static DOUBLE_PIPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|\s*\|").unwrap());
static EDGE_PIPE_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*\|\s*").unwrap());
static EDGE_PIPE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)\s*\|\s*$").unwrap());

/// Replaces known placeholders with supplied contact values, then strips
/// whatever placeholders remain along with their pipe separators.
pub fn inject_contact_data(markup: &str, data: &ContactData) -> String {
    let mut injected = markup.to_string();

    let substitutions: [(&Regex, &Option<String>); 5] = [
        (&NAME_PLACEHOLDER, &data.name),
        (&PHONE_PLACEHOLDER, &data.phone),
        (&EMAIL_PLACEHOLDER, &data.email),
        (&LOCATION_PLACEHOLDER, &data.location),
        (&LINKEDIN_PLACEHOLDER, &data.linkedin),
    ];

    for (pattern, value) in substitutions {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            // NoExpand: user-supplied values are literal, not capture templates.
            injected = pattern
                .replace_all(&injected, regex::NoExpand(value))
                .into_owned();
        }
    }

    // Unfilled placeholders go away entirely, separators first so we do not
    // leave "| |" behind.
    injected = LEADING_SEPARATOR.replace_all(&injected, "").into_owned();
    injected = TRAILING_SEPARATOR.replace_all(&injected, "").into_owned();
    injected = LEFTOVER_CONTACT.replace_all(&injected, "").into_owned();
    injected = DOUBLE_PIPE.replace_all(&injected, "|").into_owned();
    injected = EDGE_PIPE_START.replace_all(&injected, "").into_owned();
    injected = EDGE_PIPE_END.replace_all(&injected, "").into_owned();

    injected
}

static STRIP_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static DETECTORS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("name", Regex::new(r"(?i)\[Full Name\]|\[Name\]").unwrap()),
        (
            "phone",
            Regex::new(r"(?i)\[Phone[^\]]*\]|\[Mobile[^\]]*\]|\+263\s*000|0780000000").unwrap(),
        ),
        (
            "email",
            Regex::new(r"(?i)\[Email[^\]]*\]|@email\.com|example@").unwrap(),
        ),
        (
            "location",
            Regex::new(r"(?i)\[Location\]|\[City[^\]]*\]").unwrap(),
        ),
        (
            "linkedin",
            Regex::new(r"(?i)\[LinkedIn[^\]]*\]|linkedin\.com/in/\[username\]").unwrap(),
        ),
    ]
});

/// Returns the contact fields for which placeholder patterns are still
/// present in the document text. Empty means the document is placeholder
/// free.
pub fn find_missing_contact_fields(markup: &str) -> Vec<&'static str> {
    let text = STRIP_TAGS.replace_all(markup, " ");
    DETECTORS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text))
        .map(|(field, _)| *field)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_contact() -> ContactData {
        ContactData {
            name: Some("Jane Doe".to_string()),
            phone: Some("+263 77 123 4567".to_string()),
            email: Some("jane@doe.dev".to_string()),
            location: Some("Harare, Zimbabwe".to_string()),
            linkedin: Some("linkedin.com/in/janedoe".to_string()),
        }
    }

    #[test]
    fn test_placeholders_replaced_with_real_values() {
        let markup = "<h1>[Full Name]</h1><p>[Phone Number] | [Email Address]</p>";
        let out = inject_contact_data(markup, &full_contact());
        assert!(out.contains("Jane Doe"));
        assert!(out.contains("+263 77 123 4567"));
        assert!(out.contains("jane@doe.dev"));
        assert!(!out.contains('['));
    }

    #[test]
    fn test_unfilled_placeholder_and_separator_removed() {
        let markup = "<p>Jane Doe | [Phone Number] | jane@doe.dev</p>";
        let out = inject_contact_data(markup, &ContactData::default());
        assert!(!out.contains("[Phone"), "got: {out}");
        assert!(!out.contains("| |"), "no double separators: {out}");
    }

    #[test]
    fn test_isolated_placeholder_removed() {
        let out = inject_contact_data("<p>[LinkedIn Profile]</p>", &ContactData::default());
        assert!(!out.contains('['));
    }

    #[test]
    fn test_real_content_untouched() {
        let markup = "<p>Reduced costs by 40% [LOW_METRICS]</p>";
        let out = inject_contact_data(markup, &full_contact());
        // Non-contact bracket markers are not this module's business.
        assert_eq!(out, markup);
    }

    #[test]
    fn test_missing_fields_detected() {
        let markup = "<p>[Full Name] — call [Phone Number] or example@placeholder.dev</p>";
        let missing = find_missing_contact_fields(markup);
        assert!(missing.contains(&"name"));
        assert!(missing.contains(&"phone"));
        assert!(missing.contains(&"email"));
        assert!(!missing.contains(&"location"));
    }

    #[test]
    fn test_clean_document_has_no_missing_fields() {
        let markup = "<p>Jane Doe | +263 77 123 4567 | jane@doe.dev</p>";
        assert!(find_missing_contact_fields(markup).is_empty());
    }
}
