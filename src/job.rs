use crate::config::Config;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One source document to render: where it comes from, where its renditions go,
/// and the title printed in the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentJob {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub title: String,
}

impl DocumentJob {
    pub fn new(input: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, title: &str) -> Self {
        Self {
            input: input.into(),
            out_dir: out_dir.into(),
            title: title.to_string(),
        }
    }

    pub fn stem(&self) -> Result<&str> {
        self.input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("input has no usable file stem: {}", self.input.display()))
    }

    pub fn html_path(&self) -> Result<PathBuf> {
        Ok(self.out_dir.join(format!("{}.html", self.stem()?)))
    }

    pub fn pdf_path(&self) -> Result<PathBuf> {
        Ok(self.out_dir.join(format!("{}.pdf", self.stem()?)))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.input.is_file() {
            return Err(anyhow!("input does not exist: {}", self.input.display()));
        }
        if let Some(ext) = self.input.extension().and_then(|s| s.to_str()) {
            if !ext.eq_ignore_ascii_case("md") && !ext.eq_ignore_ascii_case("markdown") {
                return Err(anyhow!("input is not Markdown: {}", self.input.display()));
            }
        }
        self.stem()?;
        Ok(())
    }
}

/// The two documents this tool publishes, privacy policy first.
pub fn legal_documents(cfg: &Config) -> Vec<DocumentJob> {
    let docs = Path::new(&cfg.paths.docs_dir);
    let out = PathBuf::from(&cfg.paths.out_dir);
    vec![
        DocumentJob::new(docs.join("privacy-policy.md"), &out, "Privacy Policy"),
        DocumentJob::new(docs.join("terms-of-service.md"), &out, "Terms of Service"),
    ]
}
