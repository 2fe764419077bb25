//! Page rasterization for paginated documents.
//!
//! With the `pdfium` feature, pages are drawn by a PDFium library found in
//! `./lib` or on the system library path. Without it, or when PDFium is
//! unavailable, callers get `None` and composite the highlight on a
//! transparent layer instead.

use image::RgbaImage;

#[cfg(feature = "pdfium")]
use pdfium_render::prelude::*;

#[cfg(feature = "pdfium")]
const LIBRARY_DIR: &str = "./lib";

#[cfg(feature = "pdfium")]
fn bind() -> Result<Pdfium, PdfiumError> {
    let local = Pdfium::pdfium_platform_library_name_at_path(&LIBRARY_DIR);
    let bindings = match Pdfium::bind_to_library(&local) {
        Ok(bindings) => bindings,
        Err(e) => {
            log::debug!("No PDFium at {}: {}", local.display(), e);
            Pdfium::bind_to_system_library()?
        }
    };
    Ok(Pdfium::new(bindings))
}

#[cfg(feature = "pdfium")]
fn draw(content: &[u8], page_index: u32, width: u32, height: u32) -> Result<RgbaImage, String> {
    let pdfium = bind().map_err(|e| format!("PDFium unavailable: {}", e))?;
    let document = pdfium
        .load_pdf_from_byte_slice(content, None)
        .map_err(|e| e.to_string())?;
    let index = u16::try_from(page_index).map_err(|_| format!("Page index {} too large", page_index))?;
    let page = document.pages().get(index).map_err(|e| e.to_string())?;
    let bitmap = page
        .render_with_config(
            &PdfRenderConfig::new()
                .set_target_width(width as i32)
                .set_target_height(height as i32),
        )
        .map_err(|e| e.to_string())?;
    let (drawn_width, drawn_height) = (bitmap.width() as u32, bitmap.height() as u32);
    let drawn = RgbaImage::from_raw(drawn_width, drawn_height, bitmap.as_rgba_bytes())
        .ok_or_else(|| "PDFium bitmap size mismatch".to_string())?;
    if (drawn_width, drawn_height) == (width, height) {
        Ok(drawn)
    } else {
        Ok(image::imageops::resize(
            &drawn,
            width,
            height,
            image::imageops::FilterType::Triangle,
        ))
    }
}

/// Draws page `page_index` (0-based) at exactly `width` x `height`.
#[cfg(feature = "pdfium")]
pub fn rasterize_page(content: &[u8], page_index: u32, width: u32, height: u32) -> Option<RgbaImage> {
    match draw(content, page_index, width, height) {
        Ok(pixels) => Some(pixels),
        Err(e) => {
            log::warn!("Page {} not rasterized, showing overlay only: {}", page_index + 1, e);
            None
        }
    }
}

#[cfg(not(feature = "pdfium"))]
pub fn rasterize_page(_content: &[u8], _page_index: u32, _width: u32, _height: u32) -> Option<RgbaImage> {
    None
}

