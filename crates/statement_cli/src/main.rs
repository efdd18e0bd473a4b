//! Command-line front end: fetch one problem statement and print or save it.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use harvest_logging::{harvest_error, harvest_info, LogDestination};
use log::LevelFilter;
use statement_engine::{
    build_client, load_cookie_file, FetchSettings, HarvestOptions, ReqwestFetcher,
    StatementPipeline, DEFAULT_WRAP_WIDTH,
};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "statement")]
#[command(about = "Convert a contest problem page into a plain-text statement")]
struct Args {
    /// Problem page URL
    url: String,

    /// Write statement.txt and images/ into this directory instead of printing
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Maximum line width in characters
    #[arg(short = 'w', long = "width", default_value_t = DEFAULT_WRAP_WIDTH)]
    width: usize,

    /// Session cookie file, one `name<TAB>value` per line
    #[arg(long = "cookies")]
    cookies: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout")]
    timeout: Option<u64>,

    /// Turn TeX into plain ASCII (`\le` becomes `<=`)
    #[arg(long = "tex", overrides_with = "no_tex")]
    tex: bool,

    /// Keep TeX exactly as written
    #[arg(long = "no-tex", overrides_with = "tex")]
    no_tex: bool,

    /// Also write the log to this file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn tex_override(&self) -> Option<bool> {
        if self.tex {
            Some(true)
        } else if self.no_tex {
            Some(false)
        } else {
            None
        }
    }

    fn harvest_options(&self) -> HarvestOptions {
        let mut options = if self.out.is_some() {
            HarvestOptions::files()
        } else {
            HarvestOptions::inline()
        };
        options.wrap_width = self.width;
        if let Some(tex) = self.tex_override() {
            options.tex_substitutions = tex;
        }
        options
    }

    fn fetch_settings(&self) -> FetchSettings {
        let mut settings = FetchSettings::default();
        if let Some(secs) = self.timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
        settings
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    harvest_logging::initialize(args.log_destination(), args.log_level());

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            harvest_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let url = Url::parse(args.url.trim()).with_context(|| format!("invalid URL {:?}", args.url))?;
    let settings = args.fetch_settings();

    let jar = match &args.cookies {
        Some(path) => {
            let site = url.join("/").context("cannot derive site root")?;
            Some(load_cookie_file(path, &site)?)
        }
        None => None,
    };
    let client = build_client(&settings, jar).context("failed to build HTTP client")?;
    let fetcher = ReqwestFetcher::new(client, settings);
    let pipeline = StatementPipeline::new(&fetcher, &fetcher, args.harvest_options());

    match &args.out {
        Some(out_dir) => {
            let saved = pipeline
                .save_statement(url.as_str(), out_dir)
                .await
                .with_context(|| format!("failed to save statement from {url}"))?;
            harvest_info!(
                "Saved {:?} with {} of {} images",
                saved.statement_path,
                saved.assets_saved,
                saved.assets.len()
            );
            if saved.assets_saved < saved.assets.len() {
                eprintln!(
                    "warning: {} of {} images could not be downloaded",
                    saved.assets.len() - saved.assets_saved,
                    saved.assets.len()
                );
            }
            println!("{}", saved.statement_path.display());
        }
        None => {
            let text = pipeline
                .fetch_text(url.as_str())
                .await
                .with_context(|| format!("failed to fetch statement from {url}"))?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{text}").context("failed to write to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("statement").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn printing_mode_is_the_default() {
        let args = parse(&["http://judge.example/p/1"]);
        let options = args.harvest_options();
        assert_eq!(options, HarvestOptions::inline());
        assert_eq!(args.log_level(), LevelFilter::Warn);
        assert_eq!(args.log_destination(), LogDestination::Terminal);
    }

    #[test]
    fn out_dir_selects_file_mode() {
        let args = parse(&["http://judge.example/p/1", "--out", "A", "--width", "80"]);
        let options = args.harvest_options();
        assert_eq!(options.image_mode, statement_engine::ImageMode::Files);
        assert!(!options.tex_substitutions);
        assert_eq!(options.wrap_width, 80);
    }

    #[test]
    fn tex_flags_override_the_preset() {
        let on = parse(&["u", "--out", "A", "--tex"]).harvest_options();
        assert!(on.tex_substitutions);
        let off = parse(&["u", "--no-tex"]).harvest_options();
        assert!(!off.tex_substitutions);
        let last_wins = parse(&["u", "--no-tex", "--tex"]);
        assert_eq!(last_wins.tex_override(), Some(true));
    }

    #[test]
    fn verbosity_and_log_file() {
        let args = parse(&["u", "-vv", "--log-file", "run.log"]);
        assert_eq!(args.log_level(), LevelFilter::Debug);
        assert_eq!(
            args.log_destination(),
            LogDestination::Both(PathBuf::from("run.log"))
        );
    }

    #[test]
    fn timeout_replaces_request_timeout_only() {
        let settings = parse(&["u", "--timeout", "3"]).fetch_settings();
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.connect_timeout, FetchSettings::default().connect_timeout);
    }

    #[test]
    fn url_is_required() {
        assert!(Args::try_parse_from(["statement"]).is_err());
    }
}
