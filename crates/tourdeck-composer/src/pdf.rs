//! Conversion of rendered template text into a paginated PDF.
//!
//! The markup is line oriented: `# ` and `## ` headings, `- ` bullets,
//! `**bold**` inline spans, blank lines as vertical breaks, and
//! `[img:ID]` lines that embed a registered image. Images are re-encoded
//! to RGB PNG files on disk because the PDF engine decodes from paths and
//! does not handle alpha channels.

use crate::ComposeError;
use bytes::Bytes;
use genpdf::elements::{Break, Image as PdfImage, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;
use tempfile::NamedTempFile;

const BODY_FONT_SIZE: u8 = 10;
const TITLE_FONT_SIZE: u8 = 16;
const HEADING_FONT_SIZE: u8 = 12;
const PAGE_MARGIN_MM: u32 = 10;
const IMAGE_DPI: f64 = 150.0;
// A4 width minus margins at the embed DPI.
const MAX_IMAGE_WIDTH_PX: f64 = 1122.0;

pub(crate) fn write_pdf(
    markup: &str,
    images: &HashMap<String, Bytes>,
    font_dir: &Path,
    font_family: &str,
    title: &str,
    output: &Path,
) -> Result<(), ComposeError> {
    let fonts = load_font_family(font_dir, font_family)?;
    let mut doc = Document::new(fonts);
    doc.set_title(title);
    doc.set_font_size(BODY_FONT_SIZE);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(PAGE_MARGIN_MM);
    doc.set_page_decorator(decorator);

    // Embedded images live as temp files until the document is rendered.
    let mut embedded: Vec<NamedTempFile> = Vec::new();

    for raw_line in markup.lines() {
        let line = raw_line.trim_end();
        if line.is_empty() {
            doc.push(Break::new(1));
        } else if let Some(text) = line.strip_prefix("# ") {
            doc.push(heading(text, TITLE_FONT_SIZE));
        } else if let Some(text) = line.strip_prefix("## ") {
            doc.push(heading(text, HEADING_FONT_SIZE));
        } else if let Some(id) = line.strip_prefix("[img:").and_then(|r| r.strip_suffix(']')) {
            let bytes = images
                .get(id)
                .ok_or_else(|| ComposeError::MissingField(id.to_string()))?;
            doc.push(embed_image(bytes, &mut embedded)?);
        } else if let Some(text) = line.strip_prefix("- ") {
            let mut paragraph = Paragraph::new("\u{2022} ");
            push_inline(&mut paragraph, text);
            doc.push(paragraph);
        } else {
            let mut paragraph = Paragraph::new("");
            push_inline(&mut paragraph, line);
            doc.push(paragraph);
        }
    }

    // Render to a sibling temp file, then move into place, so the target
    // path never holds a partial document.
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent)?;
    doc.render(&mut staged)
        .map_err(|e| ComposeError::PdfConversion(e.to_string()))?;
    staged.persist(output).map_err(|e| ComposeError::Io(e.error))?;

    tracing::info!(output = %output.display(), "PDF written");
    Ok(())
}

fn heading(text: &str, size: u8) -> Paragraph {
    let mut paragraph = Paragraph::new("");
    paragraph.push(StyledString::new(
        text.to_string(),
        Style::new().bold().with_font_size(size),
    ));
    paragraph
}

/// `**bold**` spans; odd segments after splitting are bold. Unbalanced
/// markers degrade to plain text for the trailing segment.
fn push_inline(paragraph: &mut Paragraph, text: &str) {
    for (i, part) in text.split("**").enumerate() {
        if part.is_empty() {
            continue;
        }
        if i % 2 == 1 {
            paragraph.push(StyledString::new(part.to_string(), Style::new().bold()));
        } else {
            paragraph.push(StyledString::new(part.to_string(), Style::new()));
        }
    }
}

fn embed_image(
    bytes: &[u8],
    embedded: &mut Vec<NamedTempFile>,
) -> Result<PdfImage, ComposeError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ComposeError::PdfConversion(format!("embedded image: {e}")))?;

    let (width, height) = img.dimensions();
    let scale = (MAX_IMAGE_WIDTH_PX / width as f64).min(1.0);
    let img = if scale < 1.0 {
        img.resize(
            (width as f64 * scale) as u32,
            (height as f64 * scale) as u32,
            image::imageops::FilterType::Lanczos3,
        )
    } else {
        img
    };

    // Flatten any alpha channel over white before handing off to the PDF
    // engine, which expects opaque raster data.
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flattened = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut flattened, &rgba, 0, 0);
    let rgb = DynamicImage::ImageRgba8(flattened).to_rgb8();

    let mut tmp = NamedTempFile::new()?;
    rgb.write_to(tmp.as_file_mut(), image::ImageFormat::Png)
        .map_err(|e| ComposeError::PdfConversion(format!("embedded image: {e}")))?;

    let mut element = PdfImage::from_path(tmp.path())
        .map_err(|e| ComposeError::PdfConversion(e.to_string()))?;
    element.set_dpi(IMAGE_DPI);
    embedded.push(tmp);
    Ok(element)
}

fn load_font_family(dir: &Path, family: &str) -> Result<FontFamily<FontData>, ComposeError> {
    if let Ok(fonts) = genpdf::fonts::from_files(dir, family, None) {
        return Ok(fonts);
    }
    // Fall back to common filename variants; styles without a file reuse
    // the nearest available weight.
    let regular = load_variant(dir, family, &["-Regular", ""])?;
    let bold = load_variant(dir, family, &["-Bold"]).unwrap_or_else(|_| regular.clone());
    let italic =
        load_variant(dir, family, &["-Italic", "-Oblique"]).unwrap_or_else(|_| regular.clone());
    let bold_italic = load_variant(dir, family, &["-BoldItalic", "-BoldOblique"])
        .unwrap_or_else(|_| bold.clone());
    Ok(FontFamily {
        regular,
        bold,
        italic,
        bold_italic,
    })
}

fn load_variant(dir: &Path, family: &str, suffixes: &[&str]) -> Result<FontData, ComposeError> {
    for suffix in suffixes {
        let path = dir.join(format!("{family}{suffix}.ttf"));
        if path.is_file() {
            let data = std::fs::read(&path)?;
            return FontData::new(data, None)
                .map_err(|e| ComposeError::PdfConversion(format!("{}: {e}", path.display())));
        }
    }
    Err(ComposeError::PdfConversion(format!(
        "no font file for family {family} in {}",
        dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const FONT_DIR: &str = "/usr/share/fonts/truetype/dejavu";
    const FONT_FAMILY: &str = "DejaVuSans";

    fn fonts_installed() -> bool {
        PathBuf::from(FONT_DIR).join("DejaVuSans.ttf").is_file()
    }

    fn tiny_png() -> Bytes {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageFormat::Png,
            )
            .unwrap();
        Bytes::from(buffer)
    }

    #[test]
    fn writes_pdf_with_text_and_images() {
        if !fonts_installed() {
            eprintln!("skipping: DejaVu fonts not installed");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let mut images = HashMap::new();
        images.insert("logo".to_string(), tiny_png());

        let markup = "# Heading\n\nSome **bold** text\n- a bullet\n[img:logo]\n";
        write_pdf(
            markup,
            &images,
            Path::new(FONT_DIR),
            FONT_FAMILY,
            "test document",
            &output,
        )
        .unwrap();

        let data = std::fs::read(&output).unwrap();
        assert!(data.starts_with(b"%PDF"));
    }

    #[test]
    fn unknown_image_id_fails_before_writing() {
        if !fonts_installed() {
            eprintln!("skipping: DejaVu fonts not installed");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let result = write_pdf(
            "[img:missing]\n",
            &HashMap::new(),
            Path::new(FONT_DIR),
            FONT_FAMILY,
            "test document",
            &output,
        );
        assert!(matches!(result, Err(ComposeError::MissingField(id)) if id == "missing"));
        assert!(!output.exists());
    }

    #[test]
    fn missing_font_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_font_family(&dir.path().join("nope"), "NoSuchFont");
        assert!(matches!(result, Err(ComposeError::PdfConversion(_))));
    }
}
