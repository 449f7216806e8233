//! Minimal robots.txt evaluation.
//!
//! Groups are selected by user-agent (a named group beats `*`), rules of the
//! selected groups are merged, and the longest matching pattern decides. Allow
//! wins a tie. Patterns support `*` and a trailing `$`.

use regex::Regex;
use url::Url;

#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    pattern: String,
    matcher: Regex,
}

#[derive(Debug, Clone, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// Parsed robots.txt.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    groups: Vec<Group>,
}

impl RobotsRules {
    pub fn parse(text: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        // A user-agent line after rules starts a new group.
        let mut open_for_agents = false;

        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "user-agent" => {
                    if !open_for_agents {
                        groups.push(Group::default());
                        open_for_agents = true;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.agents.push(value.to_ascii_lowercase());
                    }
                }
                key @ ("allow" | "disallow") => {
                    open_for_agents = false;
                    // Empty Disallow allows everything; nothing to record.
                    if value.is_empty() {
                        continue;
                    }
                    let Some(group) = groups.last_mut() else {
                        continue;
                    };
                    if let Some(rule) = compile_rule(key == "allow", value) {
                        group.rules.push(rule);
                    }
                }
                _ => {}
            }
        }

        RobotsRules { groups }
    }

    /// Whether `agent` may fetch `path` (path plus optional query).
    pub fn is_allowed(&self, agent: &str, path: &str) -> bool {
        let agent = agent.to_ascii_lowercase();
        let named: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| {
                g.agents
                    .iter()
                    .any(|a| a != "*" && !a.is_empty() && agent.contains(a.as_str()))
            })
            .collect();
        let selected = if named.is_empty() {
            self.groups
                .iter()
                .filter(|g| g.agents.iter().any(|a| a == "*"))
                .collect()
        } else {
            named
        };

        let mut verdict: Option<(usize, bool)> = None;
        for rule in selected.iter().flat_map(|g| g.rules.iter()) {
            if !rule.matcher.is_match(path) {
                continue;
            }
            let len = rule.pattern.len();
            verdict = match verdict {
                Some((best, allow)) if best > len || (best == len && allow) => Some((best, allow)),
                _ => Some((len, rule.allow)),
            };
        }
        verdict.is_none_or(|(_, allow)| allow)
    }

    /// Evaluate a full URL: its path and query are what robots rules see.
    pub fn allows_url(&self, agent: &str, url: &Url) -> bool {
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        self.is_allowed(agent, &path)
    }
}

/// `scheme://host[:port]/robots.txt` for the site serving `url`.
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

fn compile_rule(allow: bool, pattern: &str) -> Option<Rule> {
    let (body, anchored) = match pattern.strip_suffix('$') {
        Some(body) => (body, true),
        None => (pattern, false),
    };
    let mut source = String::from("^");
    source.push_str(
        &body
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*"),
    );
    if anchored {
        source.push('$');
    }
    let matcher = Regex::new(&source).ok()?;
    Some(Rule {
        allow,
        pattern: pattern.to_string(),
        matcher,
    })
}
