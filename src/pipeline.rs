use crate::{
    config::Config,
    job::DocumentJob,
    markdown,
    render::{PageSource, PdfRenderer},
    template,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

pub struct Pipeline<R: PdfRenderer> {
    cfg: Config,
    renderer: R,
}

#[derive(Debug, Clone)]
pub struct JobOutput {
    pub title: String,
    pub html: String,
    /// `None` when `output.write_html` is off.
    pub html_path: Option<PathBuf>,
    pub pdf_path: PathBuf,
}

/// Per-job notifications from `run_all`.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started(&'a DocumentJob),
    Finished(&'a JobOutput),
}

impl<R: PdfRenderer> Pipeline<R> {
    pub fn new(cfg: &Config, renderer: R) -> Self {
        Self {
            cfg: cfg.clone(),
            renderer,
        }
    }

    /// Fails on the first job whose input is missing, before anything is written.
    pub fn validate_all(&self, jobs: &[DocumentJob]) -> Result<()> {
        for job in jobs {
            job.validate()?;
        }
        Ok(())
    }

    /// Validates every input, then renders the jobs in order. Stops at the first failure.
    pub fn run_all(
        &self,
        jobs: &[DocumentJob],
        generated_on: &str,
        mut progress: impl FnMut(Progress<'_>),
    ) -> Result<Vec<JobOutput>> {
        self.validate_all(jobs)?;
        let mut outputs = Vec::with_capacity(jobs.len());
        for job in jobs {
            progress(Progress::Started(job));
            let out = self.run_job(job, generated_on)?;
            progress(Progress::Finished(&out));
            outputs.push(out);
        }
        Ok(outputs)
    }

    pub fn run_job(&self, job: &DocumentJob, generated_on: &str) -> Result<JobOutput> {
        let started = Instant::now();
        job.validate()?;

        let source = std::fs::read_to_string(&job.input)
            .with_context(|| format!("reading markdown: {}", job.input.display()))?;
        let body = markdown::to_html(&source);
        let html = template::render_page(&job.title, &body, generated_on);
        debug!(
            "converted {} ({} bytes markdown -> {} bytes html)",
            job.input.display(),
            source.len(),
            html.len()
        );

        ensure_dir(&job.out_dir)?;

        let html_path = if self.cfg.output.write_html {
            let path = job.html_path()?;
            std::fs::write(&path, &html)
                .with_context(|| format!("writing html: {}", path.display()))?;
            Some(path)
        } else {
            None
        };

        let pdf_path = job.pdf_path()?;
        let page = PageSource {
            title: &job.title,
            markdown: &source,
            html: &html,
            generated_on,
        };
        self.renderer
            .render(&page, &pdf_path)
            .with_context(|| format!("rendering pdf: {}", pdf_path.display()))?;

        let pdf_bytes = std::fs::metadata(&pdf_path)
            .with_context(|| format!("stat pdf: {}", pdf_path.display()))?
            .len();
        if pdf_bytes == 0 {
            return Err(anyhow!("rendered pdf is empty: {}", pdf_path.display()));
        }

        info!(
            "rendered title={:?} backend={} pdf_bytes={} elapsed_ms={}",
            job.title,
            self.renderer.name(),
            pdf_bytes,
            started.elapsed().as_millis()
        );

        Ok(JobOutput {
            title: job.title.clone(),
            html,
            html_path,
            pdf_path,
        })
    }
}
