use std::sync::LazyLock;

use regex::Regex;

use crate::extract::normalize::is_ui_chrome;

const MIN_TITLE_CHARS: usize = 3;

static TITLE_CHROME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:filters?|location|categories?|save|apply|view|company|results?|home)$")
        .expect("valid title chrome pattern")
});

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid pattern"));

// Case-sensitive: "VA", "DC", "NYC".
static STATE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,3}$").expect("valid pattern"));

/// Heuristic check that a normalized string reads like a job title rather than
/// page chrome. Favors rejecting noise over keeping very short real titles.
pub fn is_plausible_title(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.chars().count() < MIN_TITLE_CHARS {
        return false;
    }

    if TITLE_CHROME.is_match(candidate)
        || is_ui_chrome(candidate)
        || NUMERIC.is_match(candidate)
        || STATE_CODE.is_match(candidate)
    {
        return false;
    }

    candidate
        .split_whitespace()
        .any(|word| word.chars().count() > 2)
}
