use std::path::PathBuf;

use ego_tree::NodeRef;
use harvest_logging::{harvest_trace, harvest_warn};
use scraper::node::Node;
use scraper::{ElementRef, Html};
use url::Url;

use crate::math::{normalize_tex, simplify_tex};
use crate::{Asset, ImageMode};

const DEFAULT_IMAGE_EXTENSION: &str = ".png";
const INLINE_IMAGE_PLACEHOLDER: &str = "[IMAGE]";

/// Per-run state threaded through the DOM walk.
///
/// The image counter lives here rather than in a global so that two runs never
/// share numbering; it only ever grows within one context.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    base_url: Url,
    asset_dir: Option<PathBuf>,
    image_counter: u32,
    assets: Vec<Asset>,
}

impl ExtractionContext {
    /// `asset_dir` of `None` disables downloads; markers then name bare files.
    pub fn new(base_url: Url, asset_dir: Option<PathBuf>) -> Self {
        Self {
            base_url,
            asset_dir,
            image_counter: 0,
            assets: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Number of images numbered so far.
    pub fn image_count(&self) -> u32 {
        self.image_counter
    }

    /// Assets queued for download, in document order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.assets
    }

    fn next_sequence(&mut self) -> u32 {
        self.image_counter += 1;
        self.image_counter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub image_mode: ImageMode,
    pub tex_substitutions: bool,
}

/// Walks a parsed page depth-first and renders it as loosely formatted text.
///
/// The output still carries authoring junk and irregular blank lines; it is
/// meant to go through [`crate::clean_text`] and [`crate::wrap_lines`].
#[derive(Debug, Clone)]
pub struct TextExtractor {
    options: ExtractOptions,
}

impl TextExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn extract(&self, document: &Html, ctx: &mut ExtractionContext) -> String {
        let mut out = TextBuffer::default();
        self.visit_node(document.tree.root(), ctx, &mut out);
        out.into_text()
    }

    fn visit_node(
        &self,
        node: NodeRef<'_, Node>,
        ctx: &mut ExtractionContext,
        out: &mut TextBuffer,
    ) {
        match node.value() {
            Node::Text(text) => out.append_text(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, ctx, out);
                }
            }
            Node::Document | Node::Fragment => {
                for child in node.children() {
                    self.visit_node(child, ctx, out);
                }
            }
            _ => {}
        }
    }

    fn visit_element(
        &self,
        element: ElementRef<'_>,
        ctx: &mut ExtractionContext,
        out: &mut TextBuffer,
    ) {
        let tag = element.value().name().to_ascii_lowercase();
        match tag.as_str() {
            "p" | "div" | "section" | "article" => {
                self.visit_children(element, ctx, out);
                out.paragraph_break();
            }
            "br" => out.line_break(),
            "ul" | "ol" => self.handle_list(element, ctx, out),
            "img" => self.handle_image(element, ctx, out),
            "script" => {
                if is_math_script(element) {
                    self.handle_math(element, out);
                }
            }
            "style" => handle_raw_text(element, out),
            _ => self.visit_children(element, ctx, out),
        }
    }

    fn visit_children(
        &self,
        element: ElementRef<'_>,
        ctx: &mut ExtractionContext,
        out: &mut TextBuffer,
    ) {
        for child in element.children() {
            self.visit_node(child, ctx, out);
        }
    }

    fn handle_list(
        &self,
        list: ElementRef<'_>,
        ctx: &mut ExtractionContext,
        out: &mut TextBuffer,
    ) {
        let items = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name().eq_ignore_ascii_case("li"));
        for item in items {
            out.ensure_newline();
            out.push_str("- ");
            self.visit_children(item, ctx, out);
            out.ensure_newline();
        }
    }

    fn handle_image(
        &self,
        element: ElementRef<'_>,
        ctx: &mut ExtractionContext,
        out: &mut TextBuffer,
    ) {
        let alt = element
            .value()
            .attr("alt")
            .map(str::trim)
            .filter(|alt| !alt.is_empty());

        match self.options.image_mode {
            ImageMode::Inline => out.push_str(alt.unwrap_or(INLINE_IMAGE_PLACEHOLDER)),
            ImageMode::Files => {
                let Some(src) = element
                    .value()
                    .attr("src")
                    .map(str::trim)
                    .filter(|src| !src.is_empty())
                else {
                    return;
                };
                let source_url = match ctx.base_url.join(src) {
                    Ok(url) => url,
                    Err(err) => {
                        harvest_warn!("Skipping image with unresolvable src {:?}: {}", src, err);
                        return;
                    }
                };

                let sequence = ctx.next_sequence();
                let extension = asset_extension(&source_url);
                let filename = asset_filename(sequence, &extension);
                let saved_path = match ctx.asset_dir.as_ref() {
                    Some(dir) => dir.join(&filename),
                    None => PathBuf::from(&filename),
                };
                harvest_trace!("Image {} -> {:?}", source_url, saved_path);

                out.ensure_newline();
                out.push_str(&format!("[IMAGE: {}]\n", saved_path.display()));
                if let Some(alt) = alt {
                    out.push_str(&format!("Alt: {alt}\n"));
                }

                if ctx.asset_dir.is_some() {
                    ctx.assets.push(Asset {
                        sequence,
                        source_url,
                        saved_path,
                        extension,
                    });
                }
            }
        }
    }

    fn handle_math(&self, element: ElementRef<'_>, out: &mut TextBuffer) {
        let raw: String = element.text().collect();
        let formula = normalize_tex(raw.trim());
        let expression = if self.options.tex_substitutions {
            simplify_tex(&formula.expression)
        } else {
            formula.expression
        };
        if expression.is_empty() {
            return;
        }
        // MathJax marks display formulas in the type instead of with delimiters.
        if formula.display || is_display_script(element) {
            out.ensure_newline();
            out.push_str(&format!("$${expression}$$\n"));
        } else {
            out.push_str(&format!("${expression}$"));
        }
    }
}

/// Style sheet text keeps its own line breaks and never shares a line with
/// statement text, so the cleaner sees one rule per line.
fn handle_raw_text(element: ElementRef<'_>, out: &mut TextBuffer) {
    let raw: String = element.text().collect();
    out.ensure_newline();
    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        out.append_text(line);
        out.line_break();
    }
}

fn is_math_script(element: ElementRef<'_>) -> bool {
    element
        .value()
        .attr("type")
        .is_some_and(|ty| ty.to_ascii_lowercase().contains("math"))
}

fn is_display_script(element: ElementRef<'_>) -> bool {
    element
        .value()
        .attr("type")
        .is_some_and(|ty| ty.to_ascii_lowercase().contains("mode=display"))
}

/// Extension of the last path segment, dot included; `.png` when absent or odd.
pub fn asset_extension(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

pub fn asset_filename(sequence: u32, extension: &str) -> String {
    format!("formula_{sequence:03}{extension}")
}

#[derive(Debug, Default)]
struct TextBuffer {
    builder: String,
    last_char: Option<char>,
}

impl TextBuffer {
    fn into_text(self) -> String {
        self.builder
    }

    /// Collapse whitespace runs to one space; none at the start of a line.
    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char, None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn push_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.push_char(ch);
        }
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        self.push_char('\n');
    }

    fn ensure_newline(&mut self) {
        self.trim_trailing_spaces();
        if self.builder.is_empty() || self.last_char == Some('\n') {
            return;
        }
        self.push_char('\n');
    }

    fn paragraph_break(&mut self) {
        self.trim_trailing_spaces();
        if self.builder.is_empty() {
            return;
        }
        while !self.builder.ends_with("\n\n") {
            self.push_char('\n');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.builder.trim_end_matches(' ').len();
        if trimmed != self.builder.len() {
            self.builder.truncate(trimmed);
            self.last_char = self.builder.chars().next_back();
        }
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }
}
