use image::RgbImage;

use crate::models::{DefectCandidate, InspectionStatus, VerdictResult};

pub const PASS_MESSAGE: &str = "Quality check passed. No significant defects detected.";

pub fn fail_message(defect_count: usize) -> String {
    let noun = if defect_count == 1 { "defect" } else { "defects" };
    format!(
        "Quality check failed. Found {defect_count} potential {noun}, highlighted in the processed image."
    )
}

/// Turn the classifier output into the final verdict.
pub fn summarize(
    defects: Vec<DefectCandidate>,
    contour_count: usize,
    annotated_image: RgbImage,
) -> VerdictResult {
    let defect_count = defects.len();
    let (status, message) = if defect_count > 0 {
        (InspectionStatus::Fail, fail_message(defect_count))
    } else {
        (InspectionStatus::Pass, PASS_MESSAGE.to_string())
    };

    VerdictResult {
        status,
        message,
        defect_count,
        contour_count,
        defects,
        annotated_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundaryKind, BoundingRect, Contour};

    fn defect() -> DefectCandidate {
        DefectCandidate {
            contour: Contour {
                points: Vec::new(),
                kind: BoundaryKind::Outer,
                parent: None,
            },
            area: 120.0,
            bounds: BoundingRect {
                x: 1,
                y: 1,
                width: 12,
                height: 10,
            },
        }
    }

    #[test]
    fn no_defects_is_a_pass() {
        let result = summarize(Vec::new(), 3, RgbImage::new(4, 4));
        assert_eq!(result.status, InspectionStatus::Pass);
        assert_eq!(result.defect_count, 0);
        assert_eq!(result.message, PASS_MESSAGE);
        assert!(result.is_pass());
    }

    #[test]
    fn defects_fail_and_are_counted_in_the_message() {
        let result = summarize(vec![defect(), defect()], 5, RgbImage::new(4, 4));
        assert_eq!(result.status, InspectionStatus::Fail);
        assert_eq!(result.defect_count, 2);
        assert!(result.message.contains("Found 2 potential defects"));

        let single = summarize(vec![defect()], 1, RgbImage::new(4, 4));
        assert!(single.message.contains("Found 1 potential defect,"));
    }
}
