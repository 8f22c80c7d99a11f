//! `wk render` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use wk_config::{CliSettings, Config};
use wk_renderer::{Convertor, Page};

use super::page_id;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Wiki source file to render.
    file: PathBuf,

    /// Page identity as `book:lang:path` (default: file name in the configured book).
    #[arg(long)]
    page: Option<String>,

    /// Path to configuration file (default: auto-discover wiki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site domain (overrides config).
    #[arg(long, env = "WK_DOMAIN")]
    domain: Option<String>,

    /// Attachment directory on disk (overrides config).
    #[arg(long)]
    file_media_path: Option<PathBuf>,

    /// HTML length above which a table of contents is added (overrides config).
    #[arg(long)]
    toc_threshold: Option<usize>,

    /// Print the rendered page with its metadata as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose output (show render summaries).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file can't be read or
    /// output can't be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let json = self.json;

        let page = self.render()?;

        for warning in &page.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let mut stdout = io::stdout().lock();
        if json {
            serde_json::to_writer_pretty(&mut stdout, &page)?;
            writeln!(stdout)?;
        } else {
            writeln!(stdout, "{}", page.html)?;
        }

        Ok(())
    }

    fn render(self) -> Result<Page, CliError> {
        let cli_settings = CliSettings {
            domain: self.domain,
            file_media_path: self.file_media_path,
            toc_threshold: self.toc_threshold,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let stem = self
            .file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = page_id(self.page.as_deref(), &config, &stem)?;
        let text = std::fs::read_to_string(&self.file)?;
        tracing::debug!(
            page = %id,
            file = %self.file.display(),
            config = ?config.config_path,
            "Rendering file"
        );

        let convertor =
            Convertor::new(config.paths).with_toc_threshold(config.render.toc_threshold);
        Ok(convertor.parse(id, &text))
    }
}
