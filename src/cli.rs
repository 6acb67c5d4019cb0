use crate::{
    config::Config,
    job::legal_documents,
    pipeline::{Pipeline, Progress},
    render,
    report::{self, Manifest},
    util::{ensure_dir, generated_on_now},
};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "legal-docs.toml";

#[derive(Parser, Debug)]
#[command(name = "legal-docs")]
#[command(about = "Render the privacy policy and terms of service to HTML and PDF")]
pub struct Args {
    /// Path to config TOML. If omitted, uses ./legal-docs.toml if present, else defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Errors are logged here, while the log file writer is still alive.
pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            let _guard = init_logging(&args, &Config::default(), None)?;
            error!("{:#}", err);
            return Err(err);
        }
    };
    let log_path = resolve_log_path(&cfg);
    // No subscriber exists yet, so stderr is the only place this can go.
    let _guard = init_logging(&args, &cfg, log_path.as_deref())
        .inspect_err(|err| eprintln!("{:#}", err))?;
    run(&cfg).inspect_err(|err| error!("{:#}", err))
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(&default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.work_dir).join("legal-docs.log"))
}

fn run(cfg: &Config) -> Result<()> {
    println!("🔄 Generating legal documents...");

    let jobs = legal_documents(cfg);
    let renderer = render::from_config(cfg)?;
    info!("pdf backend={}", renderer.name());
    let pipeline = Pipeline::new(cfg, renderer);

    let out_dir = PathBuf::from(&cfg.paths.out_dir);
    let generated_on = generated_on_now();
    // Nothing is written unless every source document is present.
    let outputs = pipeline.run_all(&jobs, &generated_on, |event| match event {
        Progress::Started(job) => println!("📄 Processing {}...", job.title),
        Progress::Finished(out) => {
            if let Some(html_path) = &out.html_path {
                println!("✅ Created: {}", html_path.display());
            }
            println!("✅ Created: {}", out.pdf_path.display());
        }
    })?;

    if cfg.output.write_manifest {
        let path = out_dir.join(&cfg.output.manifest_filename);
        Manifest::build(&outputs, &generated_on)?.write(&path)?;
        info!("manifest written to {}", path.display());
    }

    println!("\n🎉 All legal documents generated successfully!");
    println!("📁 Output directory: {}", out_dir.display());

    if cfg.output.print_listing {
        println!("\n📋 Generated files:");
        for entry in report::list_output_dir(&out_dir)? {
            println!("   {}", report::format_entry(&entry));
        }
    }

    Ok(())
}
