use crate::config::{ClassificationPolicy, InspectionConfig};
use crate::models::{Contour, DefectCandidate};

/// Area of the largest contour, or zero when there are none.
pub fn largest_area(contours: &[Contour]) -> f64 {
    contours.iter().map(Contour::area).fold(0.0, f64::max)
}

/// Select the contours that count as defects under the configured policy.
///
/// Input order is preserved.
pub fn classify(contours: &[Contour], config: &InspectionConfig) -> Vec<DefectCandidate> {
    let min_area = config.min_defect_area;
    let upper_bound = match config.classification_policy {
        ClassificationPolicy::Fixed => None,
        ClassificationPolicy::Relative => {
            Some(config.relative_threshold_fraction * largest_area(contours))
        }
    };

    contours
        .iter()
        .filter_map(|contour| {
            let area = contour.area();
            if area <= min_area {
                return None;
            }
            if let Some(bound) = upper_bound {
                if area >= bound {
                    return None;
                }
            }
            let bounds = contour.bounding_rect()?;
            Some(DefectCandidate {
                contour: contour.clone(),
                area,
                bounds,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundaryKind;
    use imageproc::point::Point;

    fn rect(x: u32, y: u32, w: u32, h: u32) -> Contour {
        Contour {
            points: vec![
                Point::new(x, y),
                Point::new(x, y + h),
                Point::new(x + w, y + h),
                Point::new(x + w, y),
            ],
            kind: BoundaryKind::Outer,
            parent: None,
        }
    }

    fn square(x: u32, y: u32, side: u32) -> Contour {
        rect(x, y, side, side)
    }

    fn config(policy: ClassificationPolicy, min_area: f64) -> InspectionConfig {
        InspectionConfig::builder()
            .classification_policy(policy)
            .min_defect_area(min_area)
            .build()
            .unwrap()
    }

    #[test]
    fn fixed_policy_uses_strict_minimum() {
        // areas: 49, 50, 100
        let contours = vec![square(0, 0, 7), rect(0, 20, 10, 5), square(40, 0, 10)];
        let defects = classify(&contours, &config(ClassificationPolicy::Fixed, 50.0));
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].area, 100.0);
        assert_eq!(defects[0].bounds.x, 40);
    }

    #[test]
    fn relative_policy_excludes_the_dominant_outline() {
        let contours = vec![square(0, 0, 100), square(10, 10, 20), square(50, 50, 95)];
        let defects = classify(&contours, &config(ClassificationPolicy::Relative, 50.0));
        // 100x100 is the largest, 95x95 = 9025 >= 0.9 * 10000, only 20x20 remains.
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].area, 400.0);
    }

    #[test]
    fn relative_policy_with_single_contour_finds_nothing() {
        for side in [8, 30, 500] {
            let contours = vec![square(0, 0, side)];
            assert!(classify(&contours, &config(ClassificationPolicy::Relative, 50.0)).is_empty());
        }
    }

    #[test]
    fn no_contours_no_defects() {
        assert!(classify(&[], &InspectionConfig::default()).is_empty());
        assert_eq!(largest_area(&[]), 0.0);
    }
}
