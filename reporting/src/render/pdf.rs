//! PDF emission with printpdf's built-in Helvetica faces

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use super::document::{layout, Face, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::{ensure_parent, DocumentInput, RenderError, RenderOutcome, REPORT_TITLE};

/// Render `input` to a letter-sized PDF at `path`
pub fn render_pdf(input: &DocumentInput, path: &Path) -> RenderOutcome {
    RenderOutcome::from_result("PDF", write_pdf(input, path))
}

fn write_pdf(input: &DocumentInput, path: &Path) -> Result<PathBuf, RenderError> {
    let pages = layout(input.clone());
    tracing::debug!("Laid out {} PDF page(s)", pages.len());

    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, page, &regular, &bold);
    }

    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| RenderError::io(path, e))?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_error)?;

    Ok(path.to_path_buf())
}

fn draw_page(
    layer: &printpdf::PdfLayerReference,
    page: &Page,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    for line in &page.lines {
        let font = match line.style.face {
            Face::Regular => regular,
            Face::Bold => bold,
        };
        layer.use_text(
            to_win_ansi(&line.text),
            line.style.size,
            pt(line.x),
            pt(line.y),
            font,
        );
    }
}

fn pt(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn pdf_error(e: printpdf::Error) -> RenderError {
    RenderError::Pdf(format!("{:?}", e))
}

/// Built-in fonts only cover WinAnsi; map common typography and drop the rest
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' | '\u{25CF}' => '-',
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ReportContent;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_render_structured_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("company_report.pdf");
        let content = ReportContent::new(
            NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
            "Revenue grew 5%.",
            "Clicks doubled \u{2014} a \u{201C}record\u{201D}.",
        );

        let outcome = render_pdf(&DocumentInput::from_report(&content), &path);
        assert_eq!(outcome, RenderOutcome::Written(path.clone()));

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_marked_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.pdf");
        let input = DocumentInput::Marked("One\nPAGE 2\nTwo\nPAGE 3\nThree".to_string());

        assert!(render_pdf(&input, &path).is_written());
        assert!(path.exists());
    }

    #[test]
    fn test_render_pdf_bad_path_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let outcome = render_pdf(&DocumentInput::Marked("x".to_string()), &blocker.join("a.pdf"));
        assert!(matches!(outcome, RenderOutcome::Failed(_)));
    }

    #[test]
    fn test_to_win_ansi() {
        assert_eq!(to_win_ansi("\u{2022} caf\u{e9} \u{2019}24"), "- caf\u{e9} '24");
        assert_eq!(to_win_ansi("\u{4e2d}"), "?");
    }
}
