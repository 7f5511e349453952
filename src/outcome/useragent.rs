use once_cell::sync::Lazy;
use regex::Regex;

struct BrowserRule {
    family: &'static str,
    pattern: Regex,
}

// First match wins; more specific browsers must precede the engines they embed.
const RULE_PATTERNS: &[(&str, &str)] = &[
    ("Edge Mobile", r"(?:EdgA|EdgiOS)/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Edge", r"Edge?/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Samsung Internet", r"SamsungBrowser/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Opera", r"(?:OPR|OPT|OPiOS)/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Chrome Mobile iOS", r"CriOS/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Firefox iOS", r"FxiOS/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Firefox Mobile", r"(?:Mobile|Tablet);.+Firefox/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Firefox", r"Firefox/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Chrome Mobile WebView", r"; wv\).+Chrome/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Chrome Mobile", r"Chrome/(\d+)(?:\.(\d+))?(?:\.(\d+))?.* Mobile"),
    ("Chrome", r"Chrome/(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    ("Mobile Safari", r"(?:iPhone|iPad|iPod).+Version/(\d+)(?:\.(\d+))?(?:\.(\d+))?.* Mobile/"),
    ("Safari", r"Version/(\d+)(?:\.(\d+))?(?:\.(\d+))?.* Safari/"),
];

static BROWSER_RULES: Lazy<Vec<BrowserRule>> = Lazy::new(|| {
    RULE_PATTERNS
        .iter()
        .filter_map(|&(family, pattern)| match Regex::new(pattern) {
            Ok(pattern) => Some(BrowserRule { family, pattern }),
            Err(e) => {
                tracing::error!("Invalid User-Agent rule {}: {}", family, e);
                None
            }
        })
        .collect()
});

/// `"{family} {major[.minor[.patch]]}"` for a browser user agent.
pub fn browser_version(user_agent: &str) -> Option<String> {
    BROWSER_RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(user_agent)?;
        let version: Vec<&str> = (1..=3)
            .filter_map(|i| caps.get(i).map(|m| m.as_str()))
            .collect();
        Some(format!("{} {}", rule.family, version.join(".")))
    })
}
