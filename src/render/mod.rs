pub mod command;
pub mod layout;
pub mod native;

use crate::config::Config;
use anyhow::{anyhow, Result};
use std::path::Path;

pub use command::CommandRenderer;
pub use native::NativeRenderer;

/// Everything a backend may draw from. `html` is the finished page; `markdown`
/// is its source, for backends that lay text out themselves.
#[derive(Debug, Clone, Copy)]
pub struct PageSource<'a> {
    pub title: &'a str,
    pub markdown: &'a str,
    pub html: &'a str,
    pub generated_on: &'a str,
}

pub trait PdfRenderer {
    fn name(&self) -> &'static str;
    fn render(&self, page: &PageSource<'_>, out: &Path) -> Result<()>;
}

impl<R: PdfRenderer + ?Sized> PdfRenderer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&self, page: &PageSource<'_>, out: &Path) -> Result<()> {
        (**self).render(page, out)
    }
}

pub fn from_config(cfg: &Config) -> Result<Box<dyn PdfRenderer>> {
    match cfg.pdf.backend.as_str() {
        "native" => Ok(Box::new(NativeRenderer::new())),
        "command" => Ok(Box::new(CommandRenderer::new(cfg)?)),
        other => Err(anyhow!("unknown pdf.backend: {other}")),
    }
}
