use super::{
    layout::{self, Color, DrawOp, Face, LaidOutPage, PAGE_HEIGHT_MM, PAGE_WIDTH_MM},
    PageSource, PdfRenderer,
};
use anyhow::{anyhow, Context, Result};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Rgb,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Renders with printpdf and the standard Times/Courier fonts, so no external
/// tools or font files are needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRenderer;

impl NativeRenderer {
    pub fn new() -> Self {
        Self
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let add = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| anyhow!("loading built-in font: {e:?}"))
        };
        Ok(Self {
            regular: add(BuiltinFont::TimesRoman)?,
            bold: add(BuiltinFont::TimesBold)?,
            italic: add(BuiltinFont::TimesItalic)?,
            bold_italic: add(BuiltinFont::TimesBoldItalic)?,
            mono: add(BuiltinFont::Courier)?,
        })
    }

    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::BoldItalic => &self.bold_italic,
            Face::Mono => &self.mono,
        }
    }
}

fn pdf_color(c: Color) -> printpdf::Color {
    printpdf::Color::Rgb(Rgb::new(
        f32::from(c.r) / 255.0,
        f32::from(c.g) / 255.0,
        f32::from(c.b) / 255.0,
        None,
    ))
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, page: &LaidOutPage) {
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size_pt,
                face,
                color,
                text,
            } => {
                layer.set_fill_color(pdf_color(*color));
                layer.use_text(text.as_str(), *size_pt, Mm(*x), Mm(*y), fonts.get(*face));
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness_pt,
                color,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*thickness_pt);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1), Mm(*y)), false),
                        (Point::new(Mm(*x2), Mm(*y)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

impl PdfRenderer for NativeRenderer {
    fn name(&self) -> &'static str {
        "native"
    }

    fn render(&self, page: &PageSource<'_>, out: &Path) -> Result<()> {
        let pages = layout::layout_document(page.title, page.markdown, page.generated_on);
        debug!("laid out {} page(s) for {}", pages.len(), out.display());

        let (doc, first_page, first_layer) =
            PdfDocument::new(page.title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let fonts = Fonts::load(&doc)?;

        let mut first = Some((first_page, first_layer));
        for laid_out in &pages {
            let (page_idx, layer_idx) = match first.take() {
                Some(idx) => idx,
                None => doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1"),
            };
            let layer = doc.get_page(page_idx).get_layer(layer_idx);
            draw(&layer, &fonts, laid_out);
        }

        let file = File::create(out).with_context(|| format!("create pdf: {}", out.display()))?;
        let mut writer = BufWriter::new(file);
        doc.save(&mut writer)
            .map_err(|e| anyhow!("writing pdf {}: {e:?}", out.display()))?;
        writer
            .flush()
            .with_context(|| format!("flush pdf: {}", out.display()))?;
        Ok(())
    }
}
