//! User agent classification into OS family, browser family and bot flag.
//!
//! Rules are evaluated against the uppercased user agent in a fixed order and
//! the first match wins. Word boundaries keep tokens like `IOS` from matching
//! inside `BIOS`.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{BrowserFamily, ClientDescriptor, OsFamily};

// OS rules, checked in priority order
static OS_RULES: LazyLock<Vec<(OsFamily, Regex)>> = LazyLock::new(|| {
    vec![
        (OsFamily::Windows, Regex::new(r"\bWINDOWS\b").unwrap()),
        (OsFamily::Android, Regex::new(r"\bANDROID\b").unwrap()),
        (OsFamily::Ios, Regex::new(r"\b(IPHONE|IPAD)\b").unwrap()),
        (OsFamily::Macos, Regex::new(r"\bMAC OS\b").unwrap()),
        (OsFamily::Linux, Regex::new(r"\bLINUX\b").unwrap()),
    ]
});

// Browser rules, checked in priority order. Chrome-based Edge and Opera also
// carry a CHROME/ product token, so they classify as CHROME.
static BROWSER_RULES: LazyLock<Vec<(BrowserFamily, Regex)>> = LazyLock::new(|| {
    vec![
        (BrowserFamily::Chrome, Regex::new(r"\bCHROME/").unwrap()),
        (BrowserFamily::Firefox, Regex::new(r"\bFIREFOX/").unwrap()),
        (BrowserFamily::Edge, Regex::new(r"\bEDG/").unwrap()),
        (BrowserFamily::Opera, Regex::new(r"\bOPR/").unwrap()),
        (BrowserFamily::Safari, Regex::new(r"\bMOBILE/").unwrap()),
        (BrowserFamily::Ie, Regex::new(r"\bIEMOBILE/").unwrap()),
    ]
});

// Any word ending in BOT: GOOGLEBOT, BINGBOT, YANDEXBOT.
static RE_BOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"BOT\b").unwrap());

static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]*)\)").unwrap());

/// Classify a raw user agent string. Never fails; unmatched labels are
/// `Unknown`.
pub fn classify(raw: &str) -> ClientDescriptor {
    let upper = raw.to_uppercase();

    let os = first_match(&OS_RULES, &upper).unwrap_or(OsFamily::Unknown);
    let browser = first_match(&BROWSER_RULES, &upper).unwrap_or(BrowserFamily::Unknown);
    let is_bot = RE_BOT.is_match(&upper);
    let crawler = if is_bot { crawler_name(raw) } else { None };

    ClientDescriptor {
        os,
        browser,
        is_bot,
        crawler,
    }
}

fn first_match<T: Copy>(rules: &[(T, Regex)], upper: &str) -> Option<T> {
    rules
        .iter()
        .find(|(_, re)| re.is_match(upper))
        .map(|(label, _)| *label)
}

/// Extract a crawler product name such as `Googlebot` from a user agent.
///
/// Looks at the `;`-separated fragments of the first parenthesized comment
/// first, then at the whitespace-separated products of the whole string.
pub fn crawler_name(raw: &str) -> Option<String> {
    let from_comment = RE_COMMENT.captures(raw).and_then(|caps| {
        caps.get(1)
            .map(|m| m.as_str())
            .and_then(|comment| find_bot_product(comment.split(';')))
    });

    from_comment.or_else(|| find_bot_product(raw.split_whitespace()))
}

fn find_bot_product<'a>(fragments: impl Iterator<Item = &'a str>) -> Option<String> {
    fragments
        .map(str::trim)
        .filter(|f| !f.starts_with('+') && !f.contains("://"))
        .find(|f| RE_BOT.is_match(&f.to_uppercase()))
        .map(|f| {
            let name = f.split('/').next().unwrap_or(f);
            name.trim_matches(|c: char| c == '(' || c == ')').to_string()
        })
        .filter(|name| !name.is_empty())
}
