//! Reduces the payload of a `<script type="math/tex">` element to a bare
//! expression and tells display math from inline math.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Formula;

static COMMENT_WRAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(?:<!--.*?-->\s*)*(.*?)(?:\s*<!--.*?-->\s*)*\s*$").expect("valid regex")
});

static BRACED_EXPONENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\^\{(\d+)\}").expect("valid regex"));

/// Literal replacements, applied in order. Longer commands come before their
/// prefixes so `\leq` does not turn into `<=q`.
const TEX_SUBSTITUTIONS: &[(&str, &str)] = &[
    (r"\cdot", "*"),
    (r"\times", "x"),
    (r"\ldots", "..."),
    (r"\leq", "<="),
    (r"\geq", ">="),
    (r"\le", "<="),
    (r"\ge", ">="),
    (r"\;", " "),
];

/// Strip the math delimiters from `raw`.
///
/// The first matching rule wins: `$$..$$` and `\[..\]` are display math,
/// `\(..\)` and `$..$` inline. Anything else loses surrounding HTML comments
/// and counts as inline. An empty expression means "emit nothing".
pub fn normalize_tex(raw: &str) -> Formula {
    let s = raw.trim();
    let (expression, display) = if let Some(inner) = strip_wrapped(s, "$$", "$$", 4) {
        (inner, true)
    } else if let Some(inner) = strip_wrapped(s, r"\[", r"\]", 4) {
        (inner, true)
    } else if let Some(inner) = strip_wrapped(s, r"\(", r"\)", 4) {
        (inner, false)
    } else if let Some(inner) = strip_wrapped(s, "$", "$", 2) {
        (inner, false)
    } else {
        let unwrapped = COMMENT_WRAP_RE.replace(s, "$1");
        (unwrapped.trim().to_string(), false)
    };
    Formula {
        expression,
        display,
    }
}

fn strip_wrapped(s: &str, open: &str, close: &str, min_len: usize) -> Option<String> {
    if s.len() <= min_len {
        return None;
    }
    let inner = s.strip_prefix(open)?.strip_suffix(close)?;
    Some(inner.trim().to_string())
}

/// Plain-text cosmetics for inline output: `^{12}` becomes `^12` and a few
/// common commands become ASCII.
pub fn simplify_tex(expression: &str) -> String {
    let mut out = BRACED_EXPONENT_RE.replace_all(expression, "^$1").into_owned();
    for (from, to) in TEX_SUBSTITUTIONS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}
