//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod resolve;

pub(crate) use render::RenderArgs;
pub(crate) use resolve::ResolveArgs;

use wk_config::Config;
use wk_links::PageId;

use crate::error::CliError;

/// Page id from `--page`, or a page in the configured default book and
/// language.
fn page_id(page: Option<&str>, config: &Config, fallback_path: &str) -> Result<PageId, CliError> {
    match page {
        Some(page) => Ok(page.parse()?),
        None => Ok(config.render.page_id(fallback_path)),
    }
}
