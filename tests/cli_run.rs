use std::path::Path;
use std::process::{Command, Output};

fn legal_docs(dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_legal-docs"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_docs(dir: &Path, names: &[&str]) {
    let docs = dir.join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    for name in names {
        std::fs::write(docs.join(name), "# Heading\n\nSome terms.\n").unwrap();
    }
}

#[test]
fn renders_both_documents_and_lists_them() {
    let tmp = tempfile::tempdir().unwrap();
    write_docs(tmp.path(), &["privacy-policy.md", "terms-of-service.md"]);

    let out = legal_docs(tmp.path());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stdout: {stdout}");

    let out_dir = tmp.path().join("docs/legal-pdfs");
    let mut names: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "privacy-policy.html",
            "privacy-policy.pdf",
            "terms-of-service.html",
            "terms-of-service.pdf",
        ]
    );

    assert!(stdout.contains("📄 Processing Privacy Policy..."));
    assert!(stdout.contains("📄 Processing Terms of Service..."));
    assert!(stdout.contains("🎉 All legal documents generated successfully!"));
    let listing = stdout.split("📋 Generated files:").nth(1).unwrap();
    let listed: Vec<&str> = listing
        .lines()
        .filter_map(|l| l.trim().split(" (").next())
        .filter(|n| !n.is_empty())
        .collect();
    assert_eq!(listed, names);
}

#[test]
fn missing_input_exits_one_without_output_dir() {
    let tmp = tempfile::tempdir().unwrap();
    write_docs(tmp.path(), &["privacy-policy.md"]);

    let out = legal_docs(tmp.path());

    assert_eq!(out.status.code(), Some(1));
    assert!(!tmp.path().join("docs/legal-pdfs").exists());
}

#[test]
fn failure_reaches_the_log_file() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("legal-docs.toml"),
        "[logging]\nwrite_to_file = true\nfile_path = \"run.log\"\n",
    )
    .unwrap();

    let out = legal_docs(tmp.path());

    assert_eq!(out.status.code(), Some(1));
    let log = std::fs::read_to_string(tmp.path().join("run.log")).unwrap();
    assert!(log.contains("ERROR"), "log: {log}");
    assert!(log.contains("privacy-policy.md"), "log: {log}");
}
