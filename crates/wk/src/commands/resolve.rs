//! `wk resolve` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use wk_config::{CliSettings, Config};
use wk_links::{PageId, Paths, RenderContext, Resolution, Warning, canonicalize, resolve};

use super::page_id;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Link target as written in wiki markup, e.g. `doc:forms#validation`.
    link: String,

    /// Page the link appears on, as `book:lang:path` (default: homepage).
    #[arg(long)]
    page: Option<String>,

    /// Path to configuration file (default: auto-discover wiki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site domain (overrides config).
    #[arg(long, env = "WK_DOMAIN")]
    domain: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved link with its final URL.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    resolution: Resolution,
    url: String,
    warnings: Vec<Warning>,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page id is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            domain: self.domain,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let current = page_id(self.page.as_deref(), &config, "")?;
        tracing::debug!(page = %current, config = ?config.config_path, "Resolving link");

        output.highlight(&format!("{} on {current}", self.link));
        let outcome = resolve_link(&self.link, current, config.paths);

        match &outcome.resolution {
            Resolution::External(_) => output.info("external"),
            Resolution::Internal(id) => output.info(&format!("internal {id}")),
        }
        for warning in &outcome.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        writeln!(io::stdout().lock(), "{}", outcome.url)?;
        Ok(())
    }
}

fn resolve_link(link: &str, current: PageId, paths: Paths) -> Outcome {
    let domain = paths.domain.clone();
    let mut ctx = RenderContext::new(current, paths);
    let resolution = resolve(link, &mut ctx);

    let url = match &resolution {
        Resolution::External(url) => url.clone(),
        Resolution::Internal(id) => canonicalize(id, &ctx.current, &domain),
    };

    Outcome {
        resolution,
        url,
        warnings: ctx.warnings,
    }
}
