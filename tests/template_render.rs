use legal_docs::template::{render_page, COPYRIGHT, TAGLINE};

#[test]
fn wraps_body_with_header_and_footer() {
    let page = render_page("Privacy Policy", "<p>Body text</p>", "Sat Oct 17 09:05:01 UTC 2026");

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Privacy Policy</title>"));
    assert!(page.contains("<h1>Privacy Policy</h1>"));
    assert!(page.contains(TAGLINE));
    assert!(page.contains("<p>Body text</p>"));
    assert!(page.contains(COPYRIGHT));
    assert!(page.contains("Generated on: Sat Oct 17 09:05:01 UTC 2026"));
    assert!(page.contains("counter(page)"));
    assert!(page.contains("size: A4;"));

    let header = page.find("class=\"header\"").unwrap();
    let body = page.find("<p>Body text</p>").unwrap();
    let footer = page.find("class=\"footer\"").unwrap();
    assert!(header < body && body < footer);
}

#[test]
fn same_inputs_same_page() {
    let a = render_page("Terms of Service", "<p>x</p>", "then");
    let b = render_page("Terms of Service", "<p>x</p>", "then");
    assert_eq!(a, b);
    assert_ne!(a, render_page("Terms of Service", "<p>x</p>", "later"));
}

#[test]
fn title_is_escaped() {
    let page = render_page("Terms & <Conditions>", "", "now");
    assert!(page.contains("<title>Terms &amp; &lt;Conditions&gt;</title>"));
    assert!(!page.contains("<Conditions>"));
}
