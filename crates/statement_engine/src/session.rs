//! The authenticated-session boundary.
//!
//! Logging in happens elsewhere; what reaches this crate is a cookie file with
//! one `name<TAB>value` pair per line. The cookies are loaded into a jar that
//! backs the single `reqwest::Client` shared by every request of a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use harvest_logging::{harvest_debug, harvest_info};
use reqwest::cookie::Jar;
use thiserror::Error;
use url::Url;

use crate::fetch::FetchSettings;
use crate::{FailureKind, FetchError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read cookie file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cookie file {0:?} holds no cookies")]
    Empty(PathBuf),
}

/// Parses `name<TAB>value` lines. Blank and malformed lines are skipped.
pub fn parse_cookie_lines(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split_once('\t'))
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Loads a cookie file into a jar scoped to `site` with path `/`.
pub fn load_cookie_file(path: &Path, site: &Url) -> Result<Arc<Jar>, SessionError> {
    let content = fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cookies = parse_cookie_lines(&content);
    if cookies.is_empty() {
        return Err(SessionError::Empty(path.to_path_buf()));
    }

    let jar = Jar::default();
    for (name, value) in &cookies {
        jar.add_cookie_str(&format!("{name}={value}; Path=/"), site);
        harvest_debug!("Loaded cookie {} for {}", name, site);
    }
    harvest_info!("Loaded {} session cookies from {:?}", cookies.len(), path);
    Ok(Arc::new(jar))
}

/// Builds the shared client. Without a jar the client still keeps cookies the
/// site sets during the run.
pub fn build_client(
    settings: &FetchSettings,
    jar: Option<Arc<Jar>>,
) -> Result<reqwest::Client, FetchError> {
    let builder = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .user_agent(settings.user_agent.clone());

    let builder = match jar {
        Some(jar) => builder.cookie_provider(jar),
        None => builder.cookie_store(true),
    };

    builder
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}
