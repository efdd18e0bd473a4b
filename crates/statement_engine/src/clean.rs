//! Removes word-processor debris from extracted text and evens out blank lines.
//!
//! Statements are often pasted from an office suite, which leaves style sheets
//! and conditional comments behind as text. Those are removed first, then line
//! junk is dropped and the paragraph structure normalised.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

// Office paste dumps: font/style definition blocks and `<!--[if gte mso 9]>` sections.
static VENDOR_COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?is)<!--\s*/\*\s*(?:font|style|list)\s+definitions.*?-->",
        r"|<!--\[if[^\]]*\]>.*?<!\[endif\]-->",
    ))
    .expect("valid regex")
});

static HTML_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static JUNK_LINE_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        // Stray serialisation words.
        r"(?i)^(?:none|html)$",
        // Bare tag fragments and dangling comment delimiters.
        r"^(?:<[^<>]*>\s*)+$",
        r"^(?:<!--|-->)",
        // CSS comments.
        r"^/\*",
        r"\*/$",
        // CSS rules: `selector {`, `selector {prop: value}` and lone braces.
        r"^[^{}$]*\{\s*(?:[\w\-]+\s*:[^{}]*)?\}?$",
        r"^[{}]+$",
        // Declarations left over from multi-line rules. Vendor keys always
        // count; common keys only with a `;` or `}` terminator.
        r"(?i)^(?:mso-[\w\-]+|panose-\d)\s*:[^{}]*;?\s*\}?$",
        concat!(
            r"(?i)^(?:margin|padding|font|text|line|size|color|background|border|layout",
            r"|tab-stops|width|height)[\w\-]*\s*:(?:[^{};.]|\d\.\d)*(?:;\s*\}?|\})$",
        ),
        r"(?i)^@(?:page|font-face|list)\b",
        r"(?i)font-family|font definitions|style definitions",
    ])
    .expect("valid regex set")
});

const SECTION_HEADINGS: &[&str] = &[
    "problem",
    "problem statement",
    "statement",
    "input",
    "input format",
    "output",
    "output format",
    "example",
    "examples",
    "sample",
    "samples",
    "note",
    "notes",
    "time limit",
    "memory limit",
    "условие",
    "условие задачи",
    "входные данные",
    "формат входных данных",
    "выходные данные",
    "формат выходных данных",
    "пример",
    "примеры",
    "примечание",
    "примечания",
    "ограничение времени",
    "ограничение памяти",
];

/// Run the full cleaning pass over raw extractor output.
pub fn clean_text(raw: &str) -> String {
    let without_comments = strip_comments(raw);
    let lines: Vec<&str> = without_comments
        .lines()
        .map(str::trim)
        .filter(|line| line.is_empty() || !is_junk_line(line))
        .collect();

    let lines = collapse_blank_runs(lines);
    let lines = trim_leading_blanks(lines);
    let mut lines = space_headings(lines);
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn strip_comments(text: &str) -> String {
    let text = VENDOR_COMMENT_RE.replace_all(text, "");
    HTML_COMMENT_RE.replace_all(&text, "").into_owned()
}

pub fn is_junk_line(line: &str) -> bool {
    JUNK_LINE_SET.is_match(line.trim())
}

pub fn is_section_heading(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    SECTION_HEADINGS.contains(&lowered.as_str())
}

fn collapse_blank_runs(lines: Vec<&str>) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    out
}

fn trim_leading_blanks(lines: Vec<&str>) -> Vec<&str> {
    lines.into_iter().skip_while(|line| line.is_empty()).collect()
}

/// Exactly one blank line around every heading. No blank is added before a
/// heading that opens the document.
fn space_headings(lines: Vec<&str>) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 8);
    let mut after_heading = false;
    for line in lines {
        if line.is_empty() {
            if !after_heading {
                out.push(line);
            }
            continue;
        }
        if is_section_heading(line) {
            if out.last().is_some_and(|prev| !prev.is_empty()) {
                out.push("");
            }
            out.push(line);
            out.push("");
            after_heading = true;
            continue;
        }
        after_heading = false;
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn junk_lines_comments_and_blank_runs_are_removed() {
        let raw = "html\nNone\nFirst line\n\n\n\nSecond <!-- hidden\nremark --> line\n";
        assert_eq!(clean_text(raw), "First line\n\nSecond  line");
    }

    #[test]
    fn office_style_dump_is_removed() {
        let raw = "<!-- /* Font Definitions */ @font-face {font-family:\"Cambria Math\";} -->\n\
                   p.MsoNormal, li.MsoNormal {margin:0cm;\n\
                   font-size:12.0pt;}\n\
                   @page WordSection1\n\
                   {\n\
                   }\n\
                   /* Style Definitions */\n\
                   Find the sum of {a, b} pairs.";
        assert_eq!(clean_text(raw), "Find the sum of {a, b} pairs.");
    }

    #[test]
    fn words_starting_with_none_are_kept() {
        assert_eq!(clean_text("None of the numbers repeat."), "None of the numbers repeat.");
    }

    #[test]
    fn math_lines_with_braces_are_kept() {
        assert_eq!(clean_text("$a_{i} \\le 10^{9}$"), "$a_{i} \\le 10^{9}$");
    }

    #[test]
    fn headings_get_one_blank_line_each_side() {
        let raw = "\n\nTitle\nInput\nThe first line holds n.\n\nOutput\n\n\nPrint the answer.\n\n";
        assert_eq!(
            clean_text(raw),
            "Title\n\nInput\n\nThe first line holds n.\n\nOutput\n\nPrint the answer."
        );
    }

    #[test]
    fn russian_headings_are_recognised() {
        assert!(is_section_heading("Входные данные"));
        assert!(is_section_heading("ПРИМЕРЫ"));
        assert!(!is_section_heading("Input consists of one line"));
    }

    #[test]
    fn prose_starting_with_a_property_name_is_kept() {
        let raw = "Size: the grid is n by m.\nColor: each cell is black or white.\n\
                   Text: the second line holds the string s.\nWidth: 1 <= w <= 10^5";
        assert_eq!(clean_text(raw), raw);
    }

    #[test]
    fn terminated_declarations_are_dropped() {
        for line in [
            "margin:0cm;",
            "font-size:12.0pt;}",
            "color: #333 }",
            "mso-fareast-font-family:Calibri",
            "panose-1:2 4 5 3 5 4 6 3 2 4;",
        ] {
            assert!(is_junk_line(line), "{line:?} should be junk");
        }
    }

    #[test]
    fn leading_heading_gets_no_blank_before_it() {
        assert_eq!(clean_text("Examples\n1 2\n"), "Examples\n\n1 2");
    }
}
