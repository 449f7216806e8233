use std::sync::LazyLock;

use regex::Regex;

/// Whole-string labels that are page chrome rather than content.
static UI_CHROME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:location|categories?|filters?|business unit|company|save|view job|apply now|apply|\d+ results?|home|remote)$",
    )
    .expect("valid UI chrome pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static LOCATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^location:\s*").expect("valid prefix pattern"));

pub(crate) fn is_ui_chrome(text: &str) -> bool {
    UI_CHROME.is_match(text.trim())
}

/// Clean raw element text. Returns an empty string when the text is UI chrome.
///
/// Whitespace runs collapse to one space, any leading `Location:` labels are
/// dropped, and the chrome check runs on both the raw and the cleaned text so
/// that `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() || is_ui_chrome(raw) {
        return String::new();
    }

    let mut text = WHITESPACE.replace_all(raw, " ").trim().to_string();
    while LOCATION_PREFIX.is_match(&text) {
        text = LOCATION_PREFIX.replace(&text, "").trim().to_string();
    }

    if is_ui_chrome(&text) {
        return String::new();
    }
    text
}
