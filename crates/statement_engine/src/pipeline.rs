use std::path::{Path, PathBuf};

use harvest_logging::harvest_info;
use url::Url;

use crate::asset::{download_assets, AssetFetcher};
use crate::clean::clean_text;
use crate::extract::{ExtractOptions, ExtractionContext, TextExtractor};
use crate::fetch::Fetcher;
use crate::frame::{select_frame, FrameMatch};
use crate::loader::{DocumentLoader, Page};
use crate::persist::OutputLayout;
use crate::wrap::{wrap_lines, DEFAULT_WRAP_WIDTH};
use crate::{Asset, HarvestError, ImageMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOptions {
    pub wrap_width: usize,
    pub image_mode: ImageMode,
    pub tex_substitutions: bool,
}

impl HarvestOptions {
    /// Statement directory with numbered image files; TeX left as written.
    pub fn files() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            image_mode: ImageMode::Files,
            tex_substitutions: false,
        }
    }

    /// A single string: alt text for images, ASCII-fied TeX.
    pub fn inline() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            image_mode: ImageMode::Inline,
            tex_substitutions: true,
        }
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            image_mode: self.image_mode,
            tex_substitutions: self.tex_substitutions,
        }
    }
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::inline()
    }
}

/// The page whose content becomes the statement.
#[derive(Debug)]
pub struct ContentPage {
    pub page: Page,
    /// Set when the content came from a frame of the requested page.
    pub frame: Option<FrameMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedStatement {
    pub statement_path: PathBuf,
    pub text: String,
    pub content_url: Url,
    pub frame: Option<FrameMatch>,
    pub assets: Vec<Asset>,
    pub assets_saved: usize,
}

/// URL in, cleaned and wrapped statement out.
///
/// Every network call is awaited before the next one starts.
pub struct StatementPipeline<'a> {
    pages: &'a dyn Fetcher,
    assets: &'a dyn AssetFetcher,
    options: HarvestOptions,
}

impl<'a> StatementPipeline<'a> {
    pub fn new(
        pages: &'a dyn Fetcher,
        assets: &'a dyn AssetFetcher,
        options: HarvestOptions,
    ) -> Self {
        Self {
            pages,
            assets,
            options,
        }
    }

    pub fn options(&self) -> &HarvestOptions {
        &self.options
    }

    /// Load `url` and, if it embeds a statement frame, the frame's page instead.
    pub async fn resolve_content(&self, url: &Url) -> Result<ContentPage, HarvestError> {
        let loader = DocumentLoader::new(self.pages);
        let page = loader.load(url).await?;

        let Some(choice) = select_frame(&page.document, &page.url) else {
            harvest_info!("No frame in {}, using the page itself", url);
            return Ok(ContentPage { page, frame: None });
        };

        harvest_info!("Following {:?} frame {} of {}", choice.reason, choice.url, url);
        drop(page);
        let frame_page = loader.load(&choice.url).await?;
        Ok(ContentPage {
            page: frame_page,
            frame: Some(choice.reason),
        })
    }

    /// Statement text only; nothing is written or downloaded.
    pub async fn fetch_text(&self, url: &str) -> Result<String, HarvestError> {
        let url = parse_url(url)?;
        let content = self.resolve_content(&url).await?;
        let mut ctx = ExtractionContext::new(content.page.url.clone(), None);
        Ok(self.render(&content.page, &mut ctx))
    }

    /// Write `<out_dir>/statement.txt` and try to save every image under
    /// `<out_dir>/images/`.
    pub async fn save_statement(
        &self,
        url: &str,
        out_dir: &Path,
    ) -> Result<SavedStatement, HarvestError> {
        let url = parse_url(url)?;
        let layout = OutputLayout::new(out_dir);
        layout.prepare()?;

        let content = self.resolve_content(&url).await?;
        let mut ctx = ExtractionContext::new(content.page.url.clone(), Some(layout.images_dir()));
        let text = self.render(&content.page, &mut ctx);
        let content_url = content.page.url.clone();
        let frame = content.frame;
        drop(content);

        let assets = ctx.into_assets();
        let assets_saved = download_assets(self.assets, &assets).await;
        let statement_path = layout.write_statement(&text)?;
        harvest_info!(
            "Statement from {} saved to {:?} ({}/{} images)",
            content_url,
            statement_path,
            assets_saved,
            assets.len()
        );

        Ok(SavedStatement {
            statement_path,
            text,
            content_url,
            frame,
            assets,
            assets_saved,
        })
    }

    fn render(&self, page: &Page, ctx: &mut ExtractionContext) -> String {
        let extractor = TextExtractor::new(self.options.extract_options());
        let raw = extractor.extract(&page.document, ctx);
        let cleaned = clean_text(&raw);
        wrap_lines(&cleaned, self.options.wrap_width)
    }
}

fn parse_url(url: &str) -> Result<Url, HarvestError> {
    Url::parse(url.trim()).map_err(|err| HarvestError::InvalidUrl {
        url: url.to_string(),
        message: err.to_string(),
    })
}
