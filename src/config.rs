use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub pdf: Pdf,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub docs_dir: String,
    pub out_dir: String,
    pub work_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            docs_dir: "docs".into(),
            out_dir: "docs/legal-pdfs".into(),
            work_dir: ".legal-docs".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_html: bool,
    pub write_manifest: bool,
    pub manifest_filename: String,
    pub print_listing: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_html: true,
            write_manifest: false,
            manifest_filename: "manifest.json".into(),
            print_listing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Pdf {
    /// `native` (printpdf) or `command` (external HTML renderer).
    pub backend: String,
    pub command: String,
    /// `{output}` is replaced with the PDF path; the HTML arrives on stdin.
    pub args: Vec<String>,
    pub timeout_seconds: u64,
}
impl Default for Pdf {
    fn default() -> Self {
        Self {
            backend: "native".into(),
            command: "weasyprint".into(),
            args: vec!["-".into(), "{output}".into()],
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
