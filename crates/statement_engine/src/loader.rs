use harvest_logging::harvest_debug;
use scraper::Html;
use url::Url;

use crate::decode::decode_page;
use crate::fetch::Fetcher;
use crate::HarvestError;

/// A fetched and parsed page together with the URL relative links resolve against.
#[derive(Debug)]
pub struct Page {
    pub document: Html,
    pub url: Url,
    pub encoding: String,
}

/// Fetches a URL and parses it into a DOM. Both steps are fatal on failure.
pub struct DocumentLoader<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> DocumentLoader<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    pub async fn load(&self, url: &Url) -> Result<Page, HarvestError> {
        let output = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| HarvestError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let decoded = decode_page(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|source| HarvestError::Decode {
                url: url.to_string(),
                source,
            })?;
        harvest_debug!(
            "Parsed {} ({} bytes, {})",
            url,
            output.metadata.byte_len,
            decoded.encoding_label
        );

        Ok(Page {
            document: Html::parse_document(&decoded.html),
            url: url.clone(),
            encoding: decoded.encoding_label,
        })
    }
}
