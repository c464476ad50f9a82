use image::GrayImage;
use imageproc::contours::{self, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

use crate::config::ContourMode;
use crate::detection::edges::EdgeMap;
use crate::models::{BoundaryKind, Contour};

/// Bridge short breaks in edge outlines so that closed shapes trace as
/// closed boundaries.
pub fn close_gaps(edges: &EdgeMap, radius: u8) -> GrayImage {
    if radius == 0 {
        return edges.as_image().clone();
    }
    close(edges.as_image(), Norm::LInf, radius)
}

/// Trace the boundaries of edge regions.
///
/// `External` keeps only top-level outer borders; `All` keeps every border,
/// holes included. `parent` indices always refer to the full, unfiltered
/// trace order.
pub fn find_contours(edges: &EdgeMap, mode: ContourMode, gap_closing_radius: u8) -> Vec<Contour> {
    let closed = close_gaps(edges, gap_closing_radius);

    contours::find_contours::<u32>(&closed)
        .into_iter()
        .filter(|c| match mode {
            ContourMode::All => true,
            ContourMode::External => c.border_type == BorderType::Outer && c.parent.is_none(),
        })
        .map(|c| Contour {
            points: c.points,
            kind: match c.border_type {
                BorderType::Outer => BoundaryKind::Outer,
                BorderType::Hole => BoundaryKind::Hole,
            },
            parent: c.parent,
        })
        .collect()
}
