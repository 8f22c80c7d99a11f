//! Page directives (`{{name: args}}`).
//!
//! Directives are removed from the markup before parsing and set page-level
//! options:
//!
//! | directive | effect |
//! |---|---|
//! | `nofollow` | `rel="nofollow"` on absolute links, `{{nofollow: no}}` turns it off |
//! | `title` | page title |
//! | `lang` | translation of this page, e.g. `{{lang: cs:uvod}}` |
//! | `tags` | comma-separated tags |
//! | `toc` | `no`, `title` or any other value to force the table of contents |
//! | `sidebar` | `no` hides the sidebar |
//! | `theme` | page theme; `homepage` also starts headings at `<h2>` |
//! | `maintitle` | main title |

mod fence;
mod parser;

use std::collections::BTreeMap;

use wk_links::{RenderContext, Resolution, Warning, resolve};

use crate::toc::TocMode;

pub(crate) use parser::{Directive, extract};

/// Page options collected from directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageMeta {
    pub(crate) nofollow: bool,
    pub(crate) title: Option<String>,
    pub(crate) main_title: Option<String>,
    pub(crate) langs: BTreeMap<String, String>,
    pub(crate) tags: Vec<String>,
    pub(crate) toc: TocMode,
    pub(crate) sidebar: bool,
    pub(crate) theme: Option<String>,
    /// Output level of a level-1 heading.
    pub(crate) heading_top: u8,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            nofollow: false,
            title: None,
            main_title: None,
            langs: BTreeMap::new(),
            tags: Vec::new(),
            toc: TocMode::Auto,
            sidebar: true,
            theme: None,
            heading_top: 1,
        }
    }
}

impl PageMeta {
    /// Apply a directive. Unknown directives are reported as warnings.
    pub(crate) fn apply(&mut self, directive: &Directive, ctx: &mut RenderContext) {
        let raw = directive.raw.as_str();

        match directive.name.as_str() {
            "nofollow" => self.nofollow = directive.first_arg() != Some("no"),
            "title" => self.title = Some(raw.to_owned()),
            "lang" => {
                if let Some(link) = directive.first_arg()
                    && let Resolution::Internal(id) = resolve(link, ctx)
                {
                    self.langs.insert(id.lang, id.path);
                }
            }
            "tags" => self.tags.extend(
                directive
                    .args
                    .iter()
                    .filter(|tag| !tag.is_empty())
                    .cloned(),
            ),
            "toc" => {
                if let Some(mode) = TocMode::from_directive(raw) {
                    self.toc = mode;
                }
            }
            "sidebar" => self.sidebar = raw != "no",
            "theme" => {
                if raw == "homepage" {
                    self.heading_top = 2;
                }
                self.theme = Some(raw.to_owned());
            }
            "maintitle" => self.main_title = Some(raw.to_owned()),
            name => ctx.warn(Warning::UnknownDirective {
                name: name.to_owned(),
            }),
        }
    }
}
