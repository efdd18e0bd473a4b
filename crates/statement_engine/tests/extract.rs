use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use scraper::Html;
use statement_engine::{
    clean_text, ExtractOptions, ExtractionContext, ImageMode, TextExtractor,
};
use url::Url;

const BASE: &str = "http://judge.example/cs/text-pack/17/";

fn context(asset_dir: Option<&Path>) -> ExtractionContext {
    ExtractionContext::new(Url::parse(BASE).unwrap(), asset_dir.map(Path::to_path_buf))
}

fn extractor(image_mode: ImageMode, tex_substitutions: bool) -> TextExtractor {
    TextExtractor::new(ExtractOptions {
        image_mode,
        tex_substitutions,
    })
}

fn extract_with(html: &str, extractor: &TextExtractor, ctx: &mut ExtractionContext) -> String {
    extractor.extract(&Html::parse_document(html), ctx)
}

fn inline(html: &str) -> String {
    extract_with(html, &extractor(ImageMode::Inline, false), &mut context(None))
}

#[test]
fn blocks_and_line_breaks_shape_paragraphs() {
    let raw = inline("<p>First   paragraph\n here</p><div>Second<br>line</div><span>tail</span>");
    assert_eq!(raw, "First paragraph here\n\nSecond\nline\n\ntail");
}

#[test]
fn list_items_are_prefixed_and_other_children_ignored() {
    let raw = inline("<ul><li>one</li> stray <li>two <b>bold</b></li></ul><ol><li>first</li></ol>");
    assert_eq!(raw, "- one\n- two bold\n- first\n");
}

#[test]
fn inline_images_use_alt_or_placeholder() {
    assert_eq!(inline(r#"<img src="a.png" alt="">"#), "[IMAGE]");
    assert_eq!(inline(r#"<img src="a.png">"#), "[IMAGE]");
    assert_eq!(inline(r#"<img src="a.png" alt="diagram">"#), "diagram");
    assert_eq!(
        inline(r#"<p>See <img src="t.gif" alt="the tree"> below</p>"#),
        "See the tree below\n\n"
    );
}

#[test]
fn file_mode_numbers_images_and_keeps_extensions() {
    let dir = PathBuf::from("out").join("images");
    let mut ctx = context(Some(dir.as_path()));
    let html = r#"
        <img src="pics/f1.png" alt="first">
        <img src="http://cdn.example/f2.svg">
        <img src="/render?tex=x">
    "#;
    let raw = extract_with(html, &extractor(ImageMode::Files, false), &mut ctx);

    let names: Vec<String> = ctx
        .assets()
        .iter()
        .map(|a| a.saved_path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["formula_001.png", "formula_002.svg", "formula_003.png"]);
    assert_eq!(ctx.image_count(), 3);

    let sources: Vec<&str> = ctx.assets().iter().map(|a| a.source_url.as_str()).collect();
    assert_eq!(
        sources,
        vec![
            "http://judge.example/cs/text-pack/17/pics/f1.png",
            "http://cdn.example/f2.svg",
            "http://judge.example/render?tex=x",
        ]
    );

    let first = dir.join("formula_001.png");
    let second = dir.join("formula_002.svg");
    assert!(raw.contains(&format!("[IMAGE: {}]\nAlt: first\n", first.display())));
    assert!(raw.contains(&format!("[IMAGE: {}]\n", second.display())));
    assert_eq!(raw.matches("Alt:").count(), 1);
}

#[test]
fn file_mode_without_asset_dir_only_emits_markers() {
    let mut ctx = context(None);
    let raw = extract_with(
        r#"<p>Look: <img src="a.jpg" alt=" a graph "></p>"#,
        &extractor(ImageMode::Files, false),
        &mut ctx,
    );
    assert_eq!(raw, "Look:\n[IMAGE: formula_001.jpg]\nAlt: a graph\n\n");
    assert!(ctx.assets().is_empty());
    assert_eq!(ctx.image_count(), 1);
}

#[test]
fn images_without_src_are_skipped_in_file_mode() {
    let mut ctx = context(Some(Path::new("imgs")));
    let raw = extract_with(
        r#"<img alt="nothing"><img src="b.png">"#,
        &extractor(ImageMode::Files, false),
        &mut ctx,
    );
    assert_eq!(ctx.image_count(), 1);
    assert!(raw.contains("formula_001.png"));
    assert!(!raw.contains("nothing"));
}

#[test]
fn image_counter_keeps_growing_across_documents() {
    let mut ctx = context(Some(Path::new("imgs")));
    let ex = extractor(ImageMode::Files, false);
    extract_with(r#"<img src="a.png">"#, &ex, &mut ctx);
    extract_with(r#"<img src="b.gif">"#, &ex, &mut ctx);
    let sequences: Vec<u32> = ctx.assets().iter().map(|a| a.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(ctx.assets()[1].extension, ".gif");
}

#[test]
fn math_scripts_become_dollar_formulas() {
    let html = r#"<p>Let <script type="math/tex">n</script> be given.</p>
<script type="math/tex">$$\sum a_i$$</script>
<script type="MATH/TEX; mode=display">x+y</script>
<script type="math/tex"></script>
<script type="math/tex"><!-- --></script>
<script>var ignored = 1;</script>"#;
    let raw = inline(html);
    assert_eq!(clean_text(&raw), "Let $n$ be given.\n\n$$\\sum a_i$$\n$$x+y$$");
}

#[test]
fn tex_cosmetics_apply_only_when_enabled() {
    let html = r#"<p><script type="math/tex">1 \le n \le 10^{5}</script></p>"#;
    let plain = extract_with(html, &extractor(ImageMode::Inline, false), &mut context(None));
    let simple = extract_with(html, &extractor(ImageMode::Inline, true), &mut context(None));
    assert_eq!(plain, "$1 \\le n \\le 10^{5}$\n\n");
    assert_eq!(simple, "$1 <= n <= 10^5$\n\n");
}

#[test]
fn non_breaking_spaces_collapse_like_whitespace() {
    assert_eq!(inline("<p>a\u{a0}\u{a0} b</p>"), "a b\n\n");
}

#[test]
fn head_style_sheet_never_reaches_the_statement() {
    let html = "<html><head><style type=\"text/css\">\n\
                p.MsoNormal { margin: 0cm; }\n\
                td { padding: 2px; }\n\
                </style></head><body><p>Find the sum.</p></body></html>";
    assert_eq!(clean_text(&inline(html)), "Find the sum.");
}

#[test]
fn office_style_sheet_with_multi_line_rules_is_dropped() {
    let html = "<html><head><style>\n<!--\n\
                /* Font Definitions */\n\
                @font-face\n{font-family:\"Cambria Math\";\npanose-1:2 4 5 3 5 4 6 3 2 4;}\n\
                p.MsoNormal, li.MsoNormal\n{margin:0cm;\nfont-size:12.0pt;}\n\
                @page WordSection1\n{size:595.3pt 841.9pt;}\n\
                -->\n</style></head>\
                <body><p>Size: the grid is n by m.</p><p>Color: each cell is black or white.</p></body></html>";
    assert_eq!(
        clean_text(&inline(html)),
        "Size: the grid is n by m.\n\nColor: each cell is black or white."
    );
}
