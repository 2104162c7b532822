//! Turns hashed output filenames into stable wildcard names so the same
//! logical asset can be matched across builds.
//!
//! Strategy:
//!   1. For every hash placeholder in the bundler's filename template, use the
//!      literal characters around it as anchors and replace the hash between
//!      them in the real filename with `*`
//!   2. `-legacy-<hash>` bundles (Vite legacy plugin) get a dedicated pattern
//!   3. Anything still untouched falls back to replacing a hex run of 8+ chars

use std::sync::LazyLock;

use regex::Regex;

/// Characters a hash may be rendered with: hex, base64 and base64url.
const HASH_CHARS: &str = "[A-Za-z0-9+/=_-]+";

static HASH_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:hash|contenthash|fullhash|chunkhash)(?::\d+)?\]").unwrap()
});

static LEGACY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(.*-legacy-){HASH_CHARS}(.*)$")).unwrap());

static HEX_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-f0-9]{8,}").unwrap());

/// Normalize `path` using the bundler's filename `format`, e.g.
/// `("test.D4lWaVuy.js", "[name].[hash].js")` → `"test.*.js"`.
#[must_use]
pub fn normalize_path(path: &str, format: &str) -> String {
    let mut normalized = path.to_string();

    for token in HASH_TOKEN_RE.find_iter(format) {
        let leading = delimiter(format[..token.start()].chars().last());
        let trailing = delimiter(format[token.end()..].chars().next());

        let pattern = format!(
            "({}){HASH_CHARS}({})",
            regex::escape(&leading),
            regex::escape(&trailing)
        );
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        normalized = re.replacen(&normalized, 1, "${1}*${2}").into_owned();
    }

    if normalized == path && path.contains("legacy") {
        normalized = LEGACY_RE.replacen(path, 1, "${1}*${2}").into_owned();
    }

    if normalized == path {
        normalized = HEX_RUN_RE.replacen(path, 1, "*").into_owned();
    }

    normalized
}

/// A neighbouring template character usable as an anchor. Brackets belong
/// to adjacent placeholders and are not literal text in the filename.
fn delimiter(c: Option<char>) -> String {
    match c {
        Some('[' | ']') | None => String::new(),
        Some(c) => c.to_string(),
    }
}
