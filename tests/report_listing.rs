use legal_docs::report::{format_entry, list_output_dir, FileEntry};

#[test]
fn formats_size_in_kb_with_one_decimal() {
    let e = FileEntry {
        name: "privacy-policy.pdf".into(),
        bytes: 2560,
    };
    assert_eq!(format_entry(&e), "privacy-policy.pdf (2.5 KB)");

    let tiny = FileEntry {
        name: "a.html".into(),
        bytes: 0,
    };
    assert_eq!(format_entry(&tiny), "a.html (0.0 KB)");
}

#[test]
fn lists_files_sorted_and_skips_dirs() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("terms-of-service.pdf"), vec![0u8; 2048]).unwrap();
    std::fs::write(tmp.path().join("privacy-policy.html"), b"<html></html>").unwrap();
    std::fs::create_dir(tmp.path().join("nested")).unwrap();

    let entries = list_output_dir(tmp.path()).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["privacy-policy.html", "terms-of-service.pdf"]);
    assert_eq!(entries[1].bytes, 2048);
}

#[test]
fn manifest_hashes_each_rendition() {
    use legal_docs::{pipeline::JobOutput, report::Manifest, util::sha256_hex};

    let tmp = tempfile::tempdir().unwrap();
    let html = tmp.path().join("privacy-policy.html");
    let pdf = tmp.path().join("privacy-policy.pdf");
    std::fs::write(&html, b"<html></html>").unwrap();
    std::fs::write(&pdf, b"%PDF-1.3 fake").unwrap();

    let outputs = vec![JobOutput {
        title: "Privacy Policy".into(),
        html: "<html></html>".into(),
        html_path: Some(html),
        pdf_path: pdf,
    }];
    let manifest = Manifest::build(&outputs, "now").unwrap();

    let doc = &manifest.documents[0];
    assert_eq!(doc.title, "Privacy Policy");
    let files: Vec<&str> = doc.renditions.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["privacy-policy.html", "privacy-policy.pdf"]);
    assert_eq!(doc.renditions[0].sha256, sha256_hex(b"<html></html>"));
    assert_eq!(doc.renditions[1].bytes, 13);

    let path = tmp.path().join("manifest.json");
    manifest.write(&path).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["generated_on"], "now");
}
