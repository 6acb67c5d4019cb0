use super::{PageSource, PdfRenderer};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Hands the finished HTML page to an external renderer on stdin.
///
/// The default configuration runs `weasyprint - <pdf>`, which honours the
/// page template's `@page` rules.
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandRenderer {
    pub fn new(cfg: &Config) -> Result<Self> {
        let raw = cfg.pdf.command.trim();
        if raw.is_empty() {
            return Err(anyhow!("pdf.command is empty while pdf.backend = \"command\""));
        }
        if !cfg.pdf.args.iter().any(|a| a.contains(OUTPUT_PLACEHOLDER)) {
            warn!(
                "pdf.args has no {} placeholder; the renderer must find the path itself",
                OUTPUT_PLACEHOLDER
            );
        }
        let timeout = (cfg.pdf.timeout_seconds > 0)
            .then(|| Duration::from_secs(cfg.pdf.timeout_seconds));
        Ok(Self {
            program: expand_tilde(raw),
            args: cfg.pdf.args.clone(),
            timeout,
        })
    }

    fn command_for(&self, out: &Path) -> Command {
        let out = out.display().to_string();
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            cmd.arg(arg.replace(OUTPUT_PLACEHOLDER, &out));
        }
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

impl PdfRenderer for CommandRenderer {
    fn name(&self) -> &'static str {
        "command"
    }

    fn render(&self, page: &PageSource<'_>, out: &Path) -> Result<()> {
        debug!(
            "pdf command {} timeout={:?}",
            self.program.display(),
            self.timeout
        );
        let mut child = self
            .command_for(out)
            .spawn()
            .with_context(|| format!("spawning pdf renderer: {}", self.program.display()))?;

        // The page is fed from its own thread so a renderer that stops reading
        // stdin is still bounded by the timeout.
        let pipes = Pipes::start(&mut child, page.html.to_owned());

        let output = wait_with_timeout(&mut child, pipes, self.timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "pdf renderer failed ({}): {}\n{}",
                output.status,
                self.program.display(),
                stderr.trim()
            ));
        }
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("pdf renderer stderr: {}", stderr.trim());
        }

        let written = std::fs::metadata(out)
            .with_context(|| format!("pdf renderer did not write {}", out.display()))?;
        if written.len() == 0 {
            return Err(anyhow!("pdf renderer wrote an empty file: {}", out.display()));
        }
        Ok(())
    }
}

struct Pipes {
    stdin: std::thread::JoinHandle<Result<()>>,
    stdout: std::thread::JoinHandle<Result<Vec<u8>>>,
    stderr: std::thread::JoinHandle<Result<Vec<u8>>>,
}

impl Pipes {
    fn start(child: &mut Child, html: String) -> Self {
        let stdin_writer = child.stdin.take();
        let stdout_reader = child.stdout.take();
        let stderr_reader = child.stderr.take();

        let stdin = std::thread::spawn(move || -> Result<()> {
            let Some(mut input) = stdin_writer else {
                return Ok(());
            };
            // A renderer that exits without reading is reported by its exit status.
            match input.write_all(html.as_bytes()).and_then(|()| input.flush()) {
                Err(err) if err.kind() != ErrorKind::BrokenPipe => {
                    Err(err).with_context(|| "writing HTML to pdf renderer")
                }
                _ => Ok(()),
            }
        });

        let stdout = std::thread::spawn(move || -> Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout_reader {
                out.read_to_end(&mut buf).with_context(|| "read stdout")?;
            }
            Ok(buf)
        });

        let stderr = std::thread::spawn(move || -> Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr_reader {
                err.read_to_end(&mut buf).with_context(|| "read stderr")?;
            }
            Ok(buf)
        });

        Self {
            stdin,
            stdout,
            stderr,
        }
    }

    fn join(self) -> Result<(Vec<u8>, Vec<u8>)> {
        self.stdin
            .join()
            .map_err(|_| anyhow!("stdin writer thread panicked"))??;
        let stdout = self
            .stdout
            .join()
            .map_err(|_| anyhow!("stdout reader thread panicked"))??;
        let stderr = self
            .stderr
            .join()
            .map_err(|_| anyhow!("stderr reader thread panicked"))??;
        Ok((stdout, stderr))
    }

    /// The stdin writer is left detached: it ends on its own once the pipe closes.
    fn stderr_after_kill(self) -> Vec<u8> {
        match self.stderr.join() {
            Ok(Ok(buf)) => buf,
            _ => Vec::new(),
        }
    }
}

fn wait_with_timeout(
    child: &mut Child,
    pipes: Pipes,
    timeout: Option<Duration>,
) -> Result<Output> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            let (stdout, stderr) = pipes.join()?;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if let Some(timeout) = timeout {
            if start.elapsed() > timeout {
                warn!("pdf renderer timed out after {:?}", timeout);
                let _ = child.kill();
                child.wait().with_context(|| "wait after kill")?;
                let stderr = pipes.stderr_after_kill();
                return Err(anyhow!(
                    "pdf renderer exceeded timeout ({:?}); stderr: {}",
                    timeout,
                    String::from_utf8_lossy(&stderr)
                ));
            }
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
