//! Fit and center math shared by the PDF and PPTX writers
//!
//! Units are whatever the caller uses (millimetres, EMU); only ratios matter.

/// A placed rectangle: top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scales `width` x `height` to fit inside `max_width` x `max_height`
///
/// Aspect ratio is preserved and the result is never larger than the input.
pub fn fit_within(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / width).min(max_height / height).min(1.0);
    (width * scale, height * scale)
}

/// Top-left corner that centers a `width` x `height` box on the page
pub fn center_in(page_width: f64, page_height: f64, width: f64, height: f64) -> (f64, f64) {
    ((page_width - width) / 2.0, (page_height - height) / 2.0)
}

/// Fits an image into the content area, then centers it on the page
pub fn place(
    image_width: f64,
    image_height: f64,
    content_width: f64,
    content_height: f64,
    page_width: f64,
    page_height: f64,
) -> Placement {
    let (width, height) = fit_within(image_width, image_height, content_width, content_height);
    let (x, y) = center_in(page_width, page_height, width, height);
    Placement {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const EPS: f64 = 1e-9;

    #[test_case(1600.0, 900.0, 800.0, 600.0 ; "wide image")]
    #[test_case(900.0, 1600.0, 800.0, 600.0 ; "tall image")]
    #[test_case(4000.0, 3000.0, 800.0, 600.0 ; "same aspect")]
    #[test_case(10.0, 5000.0, 267.0, 180.0 ; "sliver")]
    fn test_fit_stays_in_bounds_and_keeps_aspect(w: f64, h: f64, max_w: f64, max_h: f64) {
        let (fw, fh) = fit_within(w, h, max_w, max_h);
        assert!(fw <= max_w + EPS);
        assert!(fh <= max_h + EPS);
        assert!((fw / fh - w / h).abs() < 1e-6);
        assert!((fw - max_w).abs() < EPS || (fh - max_h).abs() < EPS);
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_within(100.0, 50.0, 800.0, 600.0), (100.0, 50.0));
    }

    #[test]
    fn test_fit_degenerate_input() {
        assert_eq!(fit_within(0.0, 50.0, 800.0, 600.0), (0.0, 0.0));
    }

    #[test]
    fn test_center_in() {
        assert_eq!(center_in(297.0, 210.0, 97.0, 10.0), (100.0, 100.0));
    }

    #[test]
    fn test_place_centers_on_page_not_content_area() {
        let p = place(1600.0, 900.0, 8.0, 6.0, 10.0, 7.5);
        assert!((p.width - 8.0).abs() < EPS);
        assert!((p.height - 4.5).abs() < EPS);
        assert!((p.x - 1.0).abs() < EPS);
        assert!((p.y - 1.5).abs() < EPS);
    }
}
