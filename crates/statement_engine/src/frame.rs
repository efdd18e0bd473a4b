//! Picks the frame that holds the statement, if the page embeds one.
//!
//! The judge wraps statements in a shell page and serves the text from a
//! frame. Frames are ranked:
//!
//! 1. an `id` (or `name`) of the form `aid<digits>pid<digits>`, taken at once;
//! 2. the first frame whose `src` mentions `text-pack`;
//! 3. the first frame of any kind.
//!
//! Only one level is followed; a frame inside the chosen frame is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static FRAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("iframe, frame").expect("valid selector"));

static PROBLEM_FRAME_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^aid\d+pid\d+$").expect("valid regex"));

const TEXT_PACK_MARKER: &str = "text-pack";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrameMatch {
    FirstFrame,
    TextPack,
    ProblemId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameChoice {
    pub url: Url,
    pub reason: FrameMatch,
}

/// Scan `document` for frames and return the best one, resolved against `base`.
pub fn select_frame(document: &Html, base: &Url) -> Option<FrameChoice> {
    let mut best: Option<FrameChoice> = None;

    for frame in document.select(&FRAME_SELECTOR) {
        let Some(url) = frame_url(frame, base) else {
            continue;
        };

        if is_problem_frame(frame) {
            return Some(FrameChoice {
                url,
                reason: FrameMatch::ProblemId,
            });
        }

        let reason = if frame_src(frame).is_some_and(|src| src.contains(TEXT_PACK_MARKER)) {
            FrameMatch::TextPack
        } else {
            FrameMatch::FirstFrame
        };

        // Strictly greater keeps the first-seen frame within a rank.
        if best.as_ref().map_or(true, |current| reason > current.reason) {
            best = Some(FrameChoice { url, reason });
        }
    }

    best
}

fn frame_src<'a>(frame: ElementRef<'a>) -> Option<&'a str> {
    frame
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
}

fn frame_url(frame: ElementRef<'_>, base: &Url) -> Option<Url> {
    frame_src(frame).and_then(|src| base.join(src).ok())
}

fn is_problem_frame(frame: ElementRef<'_>) -> bool {
    ["id", "name"]
        .iter()
        .filter_map(|attr| frame.value().attr(attr))
        .any(|ident| PROBLEM_FRAME_ID_RE.is_match(ident.trim()))
}
