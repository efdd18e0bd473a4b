//! Statement engine: turns a judge's problem page into a plain-text statement.
mod asset;
mod clean;
mod decode;
mod extract;
mod fetch;
mod frame;
mod loader;
mod math;
mod persist;
mod pipeline;
mod session;
mod types;
mod wrap;

pub use asset::{download_assets, AssetFetcher};
pub use clean::{clean_text, is_junk_line, is_section_heading};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use extract::{
    asset_extension, asset_filename, ExtractOptions, ExtractionContext, TextExtractor,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use frame::{select_frame, FrameChoice, FrameMatch};
pub use loader::{DocumentLoader, Page};
pub use math::{normalize_tex, simplify_tex};
pub use persist::{
    ensure_output_dir, OutputLayout, PersistError, IMAGES_DIRNAME, STATEMENT_FILENAME,
};
pub use pipeline::{ContentPage, HarvestOptions, SavedStatement, StatementPipeline};
pub use session::{build_client, load_cookie_file, parse_cookie_lines, SessionError};
pub use types::{
    Asset, FailureKind, FetchError, FetchMetadata, FetchOutput, Formula, HarvestError, ImageMode,
};
pub use wrap::{wrap_lines, DEFAULT_WRAP_WIDTH};
