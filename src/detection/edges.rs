use image::GrayImage;
use imageproc::edges::canny;

/// Pixel value marking an edge in an [`EdgeMap`].
pub const EDGE: u8 = 255;

/// Binary edge image: every pixel is either 0 or [`EDGE`].
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    image: GrayImage,
}

impl EdgeMap {
    /// Wrap a grayscale image, treating any non-zero pixel as an edge.
    pub fn from_image(mut image: GrayImage) -> Self {
        for p in image.pixels_mut() {
            if p[0] != 0 {
                p[0] = EDGE;
            }
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] != 0
    }

    pub fn edge_count(&self) -> usize {
        self.image.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// Hysteresis edge detection (Canny).
///
/// Pixels whose gradient magnitude exceeds `high_threshold` are edges; pixels
/// above `low_threshold` are kept only when 8-connected, directly or through
/// other weak pixels, to a strong one. Callers must pass `low <= high`;
/// [`InspectionConfig::validate`](crate::config::InspectionConfig::validate)
/// guarantees it for configured runs.
///
/// `canny` blurs its input again (sigma 1.4) before taking gradients, so the
/// effective smoothing is that blur on top of whatever [`smooth`] applied.
///
/// [`smooth`]: crate::detection::preprocessing::smooth
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> EdgeMap {
    EdgeMap::from_image(canny(img, low_threshold, high_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn uniform_image_has_no_edges() {
        let img = GrayImage::from_pixel(64, 48, Luma([90]));
        let edges = detect_edges(&img, 100.0, 200.0);
        assert_eq!(edges.edge_count(), 0);
        assert_eq!((edges.width(), edges.height()), (64, 48));
    }

    #[test]
    fn strong_step_produces_edges() {
        let img = GrayImage::from_fn(64, 64, |x, _| if x < 32 { Luma([20]) } else { Luma([230]) });
        let edges = detect_edges(&img, 50.0, 150.0);
        assert!(edges.edge_count() > 0);
        assert!((0..64).any(|x| edges.is_edge(x, 32)));
    }

    #[test]
    fn weak_ramp_alone_is_dropped() {
        // Slope 10 per pixel: the gradient sits between the thresholds everywhere.
        let img = GrayImage::from_fn(25, 32, |x, _| Luma([(x * 10) as u8]));
        let edges = detect_edges(&img, 50.0, 150.0);
        assert_eq!(edges.edge_count(), 0);
    }

    /// Vertical edge at x = 32 with contrast 50. With `strengthen` the left side
    /// darkens below row 24, so the same line continues as a strong edge.
    fn faint_edge(strengthen: bool) -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| {
            let v = if x >= 32 {
                200
            } else if strengthen && y >= 24 {
                150 - (y - 24) * 150 / 39
            } else {
                150
            };
            Luma([v as u8])
        })
    }

    #[test]
    fn weak_edge_survives_only_when_linked_to_a_strong_one() {
        let alone = detect_edges(&faint_edge(false), 50.0, 150.0);
        assert_eq!(alone.edge_count(), 0);

        let linked = detect_edges(&faint_edge(true), 50.0, 150.0);
        for y in 4..20 {
            assert!((29..35).any(|x| linked.is_edge(x, y)), "row {y} lost its weak edge");
        }
    }

    #[test]
    fn from_image_binarises() {
        let img = GrayImage::from_fn(4, 1, |x, _| Luma([x as u8 * 10]));
        let edges = EdgeMap::from_image(img);
        let values: Vec<u8> = edges.as_image().pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, EDGE, EDGE, EDGE]);
    }
}
