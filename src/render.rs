use crate::error::{Result, VerifyError};
use crate::geometry::{to_pixel_rect, PixelRect, Viewport};
use crate::raster::rasterize_page;
use crate::types::{BoundingBox, DocumentKind};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

/// US Letter, used when a page declares no MediaBox anywhere in its tree.
const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

const HIGHLIGHT_FILL: Rgba<u8> = Rgba([0, 80, 216, 26]);
const HIGHLIGHT_STROKE: Rgba<u8> = Rgba([0, 80, 216, 255]);
const STROKE_WIDTH: u32 = 2;
const DASH_ON: u32 = 5;
const DASH_OFF: u32 = 3;

/// Largest surface a paginated render may allocate (RGBA, so 4 bytes each).
pub const MAX_SURFACE_PIXELS: u64 = 8192 * 8192;

/// What to draw: the page and the focused field's box, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page: u32,
    pub highlight: Option<BoundingBox>,
}

/// Carries render requests to the view; only the newest pending one is drawn.
pub struct RenderChannel {
    tx: Sender<RenderRequest>,
    rx: Receiver<RenderRequest>,
}

impl Default for RenderChannel {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }
}

impl RenderChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> Sender<RenderRequest> {
        self.tx.clone()
    }

    pub fn request(&self, request: RenderRequest) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.tx.send(request);
    }

    /// Drains everything queued and returns the last request; older ones are superseded.
    pub fn take_latest(&self) -> Option<RenderRequest> {
        let mut latest = None;
        let mut superseded = 0usize;
        for request in self.rx.try_iter() {
            if latest.is_some() {
                superseded += 1;
            }
            latest = Some(request);
        }
        if superseded > 0 {
            log::debug!("Skipped {} superseded render request(s)", superseded);
        }
        latest
    }
}

/// Output of one render: the raster plus the geometry it was drawn with.
#[derive(Debug, Clone)]
pub struct RenderedSurface {
    pub width: u32,
    pub height: u32,
    /// Page scale relative to its native size (1.0 for images).
    pub scale: f64,
    pub page: u32,
    pub total_pages: u32,
    pub highlight: Option<PixelRect>,
    /// True when `pixels` shows the document itself, not just the overlay.
    pub page_rendered: bool,
    /// Image documents: the image with the highlight composited.
    /// Paginated documents: the rasterized page with the highlight, or a
    /// transparent overlay layer when the page could not be drawn.
    pub pixels: RgbaImage,
}

impl RenderedSurface {
    pub fn write_png(&self, path: &Path) -> Result<()> {
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| VerifyError::Render(format!("Could not write {}: {}", path.display(), e)))
    }
}

pub struct ImageView {
    mime: String,
    image: RgbaImage,
}

pub struct PaginatedView {
    content: Vec<u8>,
    /// Native (scale 1) size of every page, already rotated.
    page_sizes: Vec<(f64, f64)>,
    current_page: u32,
}

/// Loaded source document, tagged once from the snapshot's kind.
pub enum DocumentView {
    Image(ImageView),
    Paginated(PaginatedView),
}

impl DocumentView {
    pub fn load(kind: &DocumentKind, content: &[u8]) -> Result<Self> {
        match kind {
            DocumentKind::Image { mime } => {
                let image = image::load_from_memory(content)?.to_rgba8();
                log::debug!("Loaded {} image {}x{}", mime, image.width(), image.height());
                Ok(DocumentView::Image(ImageView {
                    mime: mime.clone(),
                    image,
                }))
            }
            DocumentKind::Paginated => {
                let page_sizes = read_page_sizes(content)?;
                log::debug!("Loaded PDF with {} page(s)", page_sizes.len());
                Ok(DocumentView::Paginated(PaginatedView {
                    content: content.to_vec(),
                    page_sizes,
                    current_page: 1,
                }))
            }
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            DocumentView::Image(view) => &view.mime,
            DocumentView::Paginated(_) => "application/pdf",
        }
    }

    pub fn total_pages(&self) -> u32 {
        match self {
            DocumentView::Image(_) => 1,
            DocumentView::Paginated(view) => view.page_sizes.len() as u32,
        }
    }

    pub fn current_page(&self) -> u32 {
        match self {
            DocumentView::Image(_) => 1,
            DocumentView::Paginated(view) => view.current_page,
        }
    }

    /// Moves to `requested` if it names an existing page; otherwise nothing changes.
    pub fn change_page(&mut self, requested: i64) -> u32 {
        let total = self.total_pages() as i64;
        if let DocumentView::Paginated(view) = self {
            if requested >= 1 && requested <= total {
                view.current_page = requested as u32;
            }
        }
        self.current_page()
    }

    pub fn next_page(&mut self) -> u32 {
        self.change_page(self.current_page() as i64 + 1)
    }

    pub fn previous_page(&mut self) -> u32 {
        self.change_page(self.current_page() as i64 - 1)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page() > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page() < self.total_pages()
    }

    /// Page controls only make sense for multi-page documents.
    pub fn show_pagination(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn request(&self, highlight: Option<BoundingBox>) -> RenderRequest {
        RenderRequest {
            page: self.current_page(),
            highlight,
        }
    }

    pub fn render(&self, request: &RenderRequest, container_width: f64) -> Result<RenderedSurface> {
        match self {
            DocumentView::Image(view) => {
                let (width, height) = view.image.dimensions();
                let highlight = request
                    .highlight
                    .map(|bbox| to_pixel_rect(&bbox, width as f64, height as f64));
                let mut pixels = view.image.clone();
                if let Some(rect) = &highlight {
                    paint_highlight(&mut pixels, rect);
                }
                Ok(RenderedSurface {
                    width,
                    height,
                    scale: 1.0,
                    page: 1,
                    total_pages: 1,
                    highlight,
                    page_rendered: true,
                    pixels,
                })
            }
            DocumentView::Paginated(view) => {
                if !(container_width.is_finite() && container_width > 0.0) {
                    return Err(VerifyError::Render(format!(
                        "Container width must be positive, got {}",
                        container_width
                    )));
                }
                let total_pages = view.page_sizes.len() as u32;
                let (page_width, page_height) = request
                    .page
                    .checked_sub(1)
                    .and_then(|index| view.page_sizes.get(index as usize))
                    .copied()
                    .ok_or_else(|| {
                        VerifyError::Render(format!(
                            "Page {} out of range (1-{})",
                            request.page, total_pages
                        ))
                    })?;
                let viewport = Viewport::fit_width(page_width, page_height, container_width);
                let width = viewport.width.round().max(1.0) as u32;
                let height = viewport.height.round().max(1.0) as u32;
                if width as u64 * height as u64 > MAX_SURFACE_PIXELS {
                    return Err(VerifyError::Render(format!(
                        "Page {} would render at {}x{}, larger than {} pixels",
                        request.page, width, height, MAX_SURFACE_PIXELS
                    )));
                }
                let highlight = request.highlight.map(|bbox| viewport.map(&bbox));
                let page = rasterize_page(&view.content, request.page - 1, width, height);
                let page_rendered = page.is_some();
                let mut pixels = page.unwrap_or_else(|| RgbaImage::new(width, height));
                if let Some(rect) = &highlight {
                    paint_highlight(&mut pixels, rect);
                }
                Ok(RenderedSurface {
                    width,
                    height,
                    scale: viewport.scale,
                    page: request.page,
                    total_pages,
                    highlight,
                    page_rendered,
                    pixels,
                })
            }
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>) {
    let alpha = color[3] as f32 / 255.0;
    for channel in 0..3 {
        let under = pixel[channel] as f32;
        pixel[channel] = (under * (1.0 - alpha) + color[channel] as f32 * alpha).round() as u8;
    }
    let under_alpha = pixel[3] as f32 / 255.0;
    pixel[3] = ((alpha + under_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}

/// Translucent fill and a dashed border, drawn inside the rectangle.
fn paint_highlight(pixels: &mut RgbaImage, rect: &PixelRect) {
    let (width, height) = pixels.dimensions();
    let Some((x0, y0, x1, y1)) = rect.clip(width, height) else {
        return;
    };
    let dashed = |t: u32| t % (DASH_ON + DASH_OFF) < DASH_ON;

    for y in y0..y1 {
        for x in x0..x1 {
            let on_border = x < x0 + STROKE_WIDTH
                || x + STROKE_WIDTH >= x1
                || y < y0 + STROKE_WIDTH
                || y + STROKE_WIDTH >= y1;
            let along = if y < y0 + STROKE_WIDTH || y + STROKE_WIDTH >= y1 {
                x - x0
            } else {
                y - y0
            };
            if on_border && dashed(along) {
                pixels.put_pixel(x, y, HIGHLIGHT_STROKE);
            } else {
                blend(pixels.get_pixel_mut(x, y), HIGHLIGHT_FILL);
            }
        }
    }
}

fn object_to_f64(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Looks a key up on the page, then up the `/Parent` chain.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Option<&'a lopdf::Object> {
    let mut current = page_id;
    // Bounded walk; a malformed tree could loop.
    for _ in 0..64 {
        let dict = doc.get_object(current).and_then(|o| o.as_dict()).ok()?;
        if let Ok(value) = dict.get(key) {
            return match value.as_reference() {
                Ok(id) => doc.get_object(id).ok(),
                Err(_) => Some(value),
            };
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
    }
    None
}

fn page_size(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> (f64, f64) {
    let media_box = resolve_inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .filter(|arr| arr.len() == 4)
        .and_then(|arr| {
            let coords: Vec<f64> = arr.iter().filter_map(object_to_f64).collect();
            (coords.len() == 4).then(|| ((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs()))
        });
    let (width, height) = media_box.unwrap_or(DEFAULT_PAGE_SIZE);

    let rotate = resolve_inherited(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    if rotate.rem_euclid(180) == 90 {
        (height, width)
    } else {
        (width, height)
    }
}

fn read_page_sizes(content: &[u8]) -> Result<Vec<(f64, f64)>> {
    let doc = lopdf::Document::load_mem(content)?;
    let sizes: Vec<(f64, f64)> = doc
        .get_pages()
        .values()
        .map(|page_id| page_size(&doc, *page_id))
        .collect();
    if sizes.is_empty() {
        return Err(VerifyError::Render("PDF has no pages".to_string()));
    }
    Ok(sizes)
}
