//! Letterbox alignment for the 2D overlay.
//!
//! The overlay draws in content-image space; the canvas it lands on has an
//! arbitrary size. Fitting preserves aspect ratio with a uniform scale and
//! centers the result, so every overlay point maps through one scale and
//! one offset pair.

/// A computed content-to-canvas fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFit {
    /// Uniform scale applied to the content.
    pub scale: f32,
    /// Horizontal offset of the scaled content's left edge.
    pub offset_x: f32,
    /// Vertical offset of the scaled content's top edge.
    pub offset_y: f32,
    content_width: f32,
    content_height: f32,
}

impl OverlayFit {
    /// Fit a `content_width x content_height` image into a
    /// `canvas_width x canvas_height` canvas: `scale` is the smaller of the
    /// two axis ratios and the leftover space splits evenly per axis.
    pub fn compute(
        content_width: f32,
        content_height: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Self {
        let scale = (canvas_width / content_width).min(canvas_height / content_height);
        Self {
            scale,
            offset_x: (canvas_width - content_width * scale) / 2.0,
            offset_y: (canvas_height - content_height * scale) / 2.0,
            content_width,
            content_height,
        }
    }

    /// Size of the scaled content on the canvas.
    pub fn scaled_size(&self) -> (f32, f32) {
        (
            self.content_width * self.scale,
            self.content_height * self.scale,
        )
    }

    /// Map a content-space point onto the canvas.
    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    /// Map a canvas point back into content space, or `None` when it falls
    /// in the letterbox bars or outside the content rectangle.
    pub fn to_content(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        let cx = (x - self.offset_x) / self.scale;
        let cy = (y - self.offset_y) / self.scale;
        if cx < 0.0 || cy < 0.0 || cx > self.content_width || cy > self.content_height {
            return None;
        }
        Some((cx, cy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_content_in_landscape_canvas() {
        // The reference content image in a 1080p canvas.
        let fit = OverlayFit::compute(3214.0, 3233.0, 1920.0, 1080.0);

        assert_eq!(fit.scale, 1080.0 / 3233.0);
        let (w, h) = fit.scaled_size();
        assert!(w <= 1920.0 && h <= 1080.0 + 1e-2);
        // Height-limited: vertical bars only, up to float rounding.
        assert!(fit.offset_y.abs() < 1e-3);
        assert_eq!(fit.offset_x, (1920.0 - 3214.0 * fit.scale) / 2.0);
        assert!(fit.offset_x > 0.0);
    }

    #[test]
    fn test_exact_fit_has_no_bars() {
        let fit = OverlayFit::compute(640.0, 360.0, 1920.0, 1080.0);
        assert_eq!(fit.scale, 3.0);
        assert_eq!(fit.offset_x, 0.0);
        assert_eq!(fit.offset_y, 0.0);
    }

    #[test]
    fn test_point_projection_roundtrip() {
        let fit = OverlayFit::compute(3214.0, 3233.0, 1920.0, 1080.0);

        // Content corners land on the scaled content rectangle.
        assert_eq!(fit.to_canvas(0.0, 0.0), (fit.offset_x, fit.offset_y));
        let (x, y) = fit.to_canvas(3214.0, 3233.0);
        assert!((x - (fit.offset_x + 3214.0 * fit.scale)).abs() < 1e-3);
        assert!((y - 1080.0).abs() < 1e-3);

        let (cx, cy) = fit.to_content(960.0, 540.0).unwrap();
        let (bx, by) = fit.to_canvas(cx, cy);
        assert!((bx - 960.0).abs() < 1e-3 && (by - 540.0).abs() < 1e-3);
    }

    #[test]
    fn test_letterbox_bars_reject_points() {
        let fit = OverlayFit::compute(3214.0, 3233.0, 1920.0, 1080.0);
        // A point inside the left bar.
        assert_eq!(fit.to_content(1.0, 540.0), None);
        assert!(fit.to_content(960.0, 540.0).is_some());
    }
}
