use std::fmt;
use std::path::PathBuf;

use image::RgbImage;
use imageproc::point::Point;
use serde::Serialize;

/// Whether a traced boundary is the outside of an edge region or the rim of
/// a hole inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Outer,
    Hole,
}

/// Axis-aligned rectangle in image coordinates, inclusive of both edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    pub fn max_x(&self) -> u32 {
        self.x + self.width - 1
    }

    pub fn max_y(&self) -> u32 {
        self.y + self.height - 1
    }

    /// True when the whole rectangle lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.max_x() < width && self.max_y() < height
    }
}

/// Ordered boundary of one connected edge region.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<u32>>,
    pub kind: BoundaryKind,
    /// Index of the enclosing contour in the extractor's full output.
    pub parent: Option<usize>,
}

impl Contour {
    /// Polygon area of the point sequence (shoelace formula).
    ///
    /// Boundaries one or two pixels long enclose nothing and report zero.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Smallest rectangle containing every boundary point.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoundingRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Unsigned area of a closed polygon.
pub fn polygon_area(points: &[Point<u32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        twice_area += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    twice_area.abs() / 2.0
}

/// A contour that passed the classification predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct DefectCandidate {
    pub contour: Contour,
    pub area: f64,
    pub bounds: BoundingRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InspectionStatus {
    Pass,
    Fail,
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
        }
    }
}

/// Outcome of one inspection. Built once, at the end of the pipeline.
#[derive(Debug, Clone)]
pub struct VerdictResult {
    pub status: InspectionStatus,
    pub message: String,
    pub defect_count: usize,
    /// Contours that reached the classifier.
    pub contour_count: usize,
    pub defects: Vec<DefectCandidate>,
    /// Copy of the source image with defect boxes drawn on it.
    pub annotated_image: RgbImage,
}

impl VerdictResult {
    pub fn is_pass(&self) -> bool {
        self.status == InspectionStatus::Pass
    }

    pub fn report(&self, source: impl Into<String>, output_path: Option<PathBuf>) -> VerdictReport {
        VerdictReport {
            source: source.into(),
            status: self.status,
            message: self.message.clone(),
            defect_count: self.defect_count,
            contour_count: self.contour_count,
            defects: self
                .defects
                .iter()
                .map(|d| DefectReport {
                    area: d.area,
                    bounds: d.bounds,
                })
                .collect(),
            width: self.annotated_image.width(),
            height: self.annotated_image.height(),
            output_path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DefectReport {
    pub area: f64,
    pub bounds: BoundingRect,
}

/// Serialisable view of a [`VerdictResult`], without pixel data.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictReport {
    pub source: String,
    pub status: InspectionStatus,
    pub message: String,
    pub defect_count: usize,
    pub contour_count: usize,
    pub defects: Vec<DefectReport>,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}
