//! The fixed page every rendition is wrapped in.

pub const TAGLINE: &str = "ParrotSpeak - AI-Powered Translation Platform";
pub const COPYRIGHT: &str = "© 2025 ParrotSpeak. All rights reserved.";

pub const STYLESHEET: &str = r#"
            @page {
                size: A4;
                margin: 1in;
                @bottom-center {
                    content: "Page " counter(page) " of " counter(pages);
                    font-size: 10px;
                    color: #666;
                }
            }
            body {
                font-family: 'Times New Roman', serif;
                font-size: 11px;
                line-height: 1.6;
                color: #333;
                max-width: none;
            }
            h1 {
                color: #2c3e50;
                font-size: 18px;
                margin-bottom: 20px;
                padding-bottom: 10px;
                border-bottom: 2px solid #3498db;
                text-align: center;
            }
            h2 {
                color: #34495e;
                font-size: 14px;
                margin-top: 25px;
                margin-bottom: 10px;
                page-break-after: avoid;
            }
            h3 {
                color: #7f8c8d;
                font-size: 12px;
                margin-top: 15px;
                margin-bottom: 8px;
            }
            p {
                margin-bottom: 10px;
                text-align: justify;
            }
            ul, ol {
                margin-left: 20px;
                margin-bottom: 10px;
            }
            li {
                margin-bottom: 4px;
            }
            .header {
                text-align: center;
                margin-bottom: 30px;
            }
            .footer {
                margin-top: 30px;
                padding-top: 20px;
                border-top: 1px solid #ccc;
                text-align: center;
                font-size: 10px;
                color: #666;
            }
"#;

/// Wrap converted body HTML in the styled page.
///
/// Pure in all three arguments; the caller owns the clock.
pub fn render_page(title: &str, body_html: &str, generated_on: &str) -> String {
    let title = escape_html(title);
    let generated_on = escape_html(generated_on);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <meta charset="utf-8">
    <style>{STYLESHEET}    </style>
</head>
<body>
    <div class="header">
        <h1>{title}</h1>
        <p><strong>{TAGLINE}</strong></p>
    </div>
{body_html}
    <div class="footer">
        <p>{COPYRIGHT}</p>
        <p>Generated on: {generated_on}</p>
    </div>
</body>
</html>
"#
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
