use std::fmt;

/// A declarative rule for finding elements under a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Plain CSS selector.
    Css(&'static str),
    /// Elements matching `outer` that contain at least one `inner` descendant.
    Has {
        outer: &'static str,
        inner: &'static str,
    },
}

impl Locator {
    pub const fn css(selector: &'static str) -> Self {
        Locator::Css(selector)
    }

    pub const fn has(outer: &'static str, inner: &'static str) -> Self {
        Locator::Has { outer, inner }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => f.write_str(selector),
            Locator::Has { outer, inner } => write!(f, "{outer}:has({inner})"),
        }
    }
}

/// An ordered list of locators. Earlier entries are more specific; the first
/// one that matches anything wins and later entries are never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cascade {
    name: &'static str,
    locators: &'static [Locator],
}

impl Cascade {
    pub const fn new(name: &'static str, locators: &'static [Locator]) -> Self {
        Cascade { name, locators }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn locators(&self) -> &'static [Locator] {
        self.locators
    }
}

/// Cards tried on pages with no known ATS, most specific first.
pub const FALLBACK_JOB_SELECTORS: Cascade = Cascade::new(
    "fallback-cards",
    &[
        Locator::css("a[href*='/job']:not([class*='filter'])"),
        Locator::css("a[href*='/career']:not([class*='filter'])"),
        Locator::css("div[class*='job-card']"),
        Locator::css("li[class*='job-item']"),
        Locator::css("article[class*='job']"),
        Locator::css("div.opening"),
        Locator::css("[data-job-id]"),
        Locator::css("div[class*='posting']"),
        Locator::has("tbody tr", "a"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_css_syntax() {
        assert_eq!(Locator::css("div.opening").to_string(), "div.opening");
        assert_eq!(Locator::has("tbody tr", "a").to_string(), "tbody tr:has(a)");
    }

    #[test]
    fn fallback_cascade_keeps_declared_order() {
        let locators = FALLBACK_JOB_SELECTORS.locators();
        assert_eq!(locators.first(), Some(&Locator::css("a[href*='/job']:not([class*='filter'])")));
        assert_eq!(locators.last(), Some(&Locator::has("tbody tr", "a")));
    }
}
