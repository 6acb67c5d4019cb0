use legal_docs::{
    config::Config,
    job::{legal_documents, DocumentJob},
    pipeline::{Pipeline, Progress},
    render::NativeRenderer,
};
use std::path::Path;

const STAMP: &str = "Sat Oct 17 09:05:01 UTC 2026";

fn write_md(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn pipeline() -> Pipeline<NativeRenderer> {
    Pipeline::new(&Config::default(), NativeRenderer::new())
}

#[test]
fn writes_html_and_pdf_named_after_stem() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_md(
        tmp.path(),
        "privacy-policy.md",
        "# Privacy Policy\n\nWe collect as little as we can.\n",
    );
    let out_dir = tmp.path().join("legal-pdfs");
    let job = DocumentJob::new(&input, &out_dir, "Privacy Policy");

    let out = pipeline().run_job(&job, STAMP).unwrap();

    let html_path = out_dir.join("privacy-policy.html");
    let pdf_path = out_dir.join("privacy-policy.pdf");
    assert_eq!(out.html_path.as_deref(), Some(html_path.as_path()));
    assert_eq!(out.pdf_path, pdf_path);

    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("<p>We collect as little as we can.</p>"));
    assert!(html.contains(STAMP));

    let pdf = std::fs::read(&pdf_path).unwrap();
    assert!(!pdf.is_empty());
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn rerun_overwrites_with_identical_html() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_md(tmp.path(), "terms-of-service.md", "# Terms\n\n1. One\n2. Two\n");
    let job = DocumentJob::new(&input, tmp.path().join("out"), "Terms of Service");
    let p = pipeline();

    let first = p.run_job(&job, STAMP).unwrap();
    let on_disk_first = std::fs::read_to_string(job.html_path().unwrap()).unwrap();
    let second = p.run_job(&job, STAMP).unwrap();
    let on_disk_second = std::fs::read_to_string(job.html_path().unwrap()).unwrap();

    assert_eq!(first.html, second.html);
    assert_eq!(on_disk_first, on_disk_second);
    assert!(std::fs::metadata(job.pdf_path().unwrap()).unwrap().len() > 0);
}

#[test]
fn only_timestamp_differs_between_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_md(tmp.path(), "doc.md", "Text.\n");
    let job = DocumentJob::new(&input, tmp.path().join("out"), "Doc");
    let p = pipeline();

    let a = p.run_job(&job, "Mon Jan  5 10:00:00 UTC 2026").unwrap().html;
    let b = p.run_job(&job, "Tue Jan  6 10:00:00 UTC 2026").unwrap().html;
    assert_ne!(a, b);
    assert_eq!(
        a.replace("Mon Jan  5 10:00:00 UTC 2026", "T"),
        b.replace("Tue Jan  6 10:00:00 UTC 2026", "T")
    );
}

#[test]
fn missing_input_fails_before_any_output() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("out");
    let job = DocumentJob::new(tmp.path().join("nope.md"), &out_dir, "Nope");

    let err = pipeline().run_job(&job, STAMP).unwrap_err();
    assert!(format!("{err:#}").contains("does not exist"));
    assert!(!out_dir.exists());
}

#[test]
fn run_all_writes_nothing_when_second_input_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.paths.docs_dir = tmp.path().join("docs").display().to_string();
    cfg.paths.out_dir = tmp.path().join("docs/legal-pdfs").display().to_string();
    std::fs::create_dir_all(tmp.path().join("docs")).unwrap();
    write_md(&tmp.path().join("docs"), "privacy-policy.md", "# Privacy\n");

    let jobs = legal_documents(&cfg);
    let err = Pipeline::new(&cfg, NativeRenderer::new())
        .run_all(&jobs, STAMP, |_| panic!("no job should start"))
        .unwrap_err();

    assert!(format!("{err:#}").contains("terms-of-service.md"));
    assert!(!tmp.path().join("docs/legal-pdfs").exists());
}

#[test]
fn run_all_renders_both_documents_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    write_md(&docs, "privacy-policy.md", "## What we collect\n\n- Email\n- Language pairs\n");
    write_md(&docs, "terms-of-service.md", "## Acceptance\n\nBy using the app you agree.\n");

    let mut cfg = Config::default();
    cfg.paths.docs_dir = docs.display().to_string();
    cfg.paths.out_dir = docs.join("legal-pdfs").display().to_string();

    let mut events = Vec::new();
    let outputs = Pipeline::new(&cfg, NativeRenderer::new())
        .run_all(&legal_documents(&cfg), STAMP, |event| {
            events.push(match event {
                Progress::Started(job) => format!("start {}", job.title),
                Progress::Finished(out) => format!("done {}", out.title),
            })
        })
        .unwrap();

    assert_eq!(
        events,
        vec![
            "start Privacy Policy",
            "done Privacy Policy",
            "start Terms of Service",
            "done Terms of Service",
        ]
    );
    let titles: Vec<&str> = outputs.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, vec!["Privacy Policy", "Terms of Service"]);
    for name in [
        "privacy-policy.html",
        "privacy-policy.pdf",
        "terms-of-service.html",
        "terms-of-service.pdf",
    ] {
        assert!(docs.join("legal-pdfs").join(name).is_file(), "missing {name}");
    }
}

#[test]
fn html_can_be_switched_off() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_md(tmp.path(), "doc.md", "Text.\n");
    let mut cfg = Config::default();
    cfg.output.write_html = false;
    let job = DocumentJob::new(&input, tmp.path().join("out"), "Doc");

    let out = Pipeline::new(&cfg, NativeRenderer::new())
        .run_job(&job, STAMP)
        .unwrap();

    assert!(out.html_path.is_none());
    assert!(!tmp.path().join("out/doc.html").exists());
    assert!(tmp.path().join("out/doc.pdf").is_file());
}
