use crate::types::BoundingBox;

/// Highlight rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Highlight rectangle as percentages of the surface, for hosts that lay out
/// the overlay relative to a scaled image box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps a normalized box onto a `surface_width` x `surface_height` surface.
/// Malformed boxes give out-of-range rectangles; clamping is left to the caller.
pub fn to_pixel_rect(bbox: &BoundingBox, surface_width: f64, surface_height: f64) -> PixelRect {
    PixelRect {
        x: bbox.left * surface_width,
        y: bbox.top * surface_height,
        w: bbox.width * surface_width,
        h: bbox.height * surface_height,
    }
}

pub fn to_percent_rect(bbox: &BoundingBox) -> PercentRect {
    PercentRect {
        left: bbox.left * 100.0,
        top: bbox.top * 100.0,
        width: bbox.width * 100.0,
        height: bbox.height * 100.0,
    }
}

/// A page scaled to fill the container width, aspect ratio preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// `page_width`/`page_height` are the page size at scale 1.
    pub fn fit_width(page_width: f64, page_height: f64, container_width: f64) -> Self {
        let scale = if page_width > 0.0 {
            container_width / page_width
        } else {
            1.0
        };
        Self {
            scale,
            width: page_width * scale,
            height: page_height * scale,
        }
    }

    /// Highlight against the scaled viewport, not the native page size.
    pub fn map(&self, bbox: &BoundingBox) -> PixelRect {
        to_pixel_rect(bbox, self.width, self.height)
    }
}

impl PixelRect {
    /// Integer pixel span clipped to a `width` x `height` raster, or `None`
    /// when nothing of the rectangle is visible.
    pub fn clip(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x.floor().max(0.0);
        let y0 = self.y.floor().max(0.0);
        let x1 = (self.x + self.w).ceil().min(width as f64);
        let y1 = (self.y + self.h).ceil().min(height as f64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}
