use serde::{Deserialize, Serialize};

use crate::error::{InspectError, Result};

const MAX_GAP_CLOSING_RADIUS: u8 = 8;

/// Which contours the extractor hands to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContourMode {
    /// Outermost boundaries only. Suits parts that fill the frame.
    #[default]
    External,
    /// Every boundary, holes and nested structure included.
    All,
}

/// How contour area decides whether a contour is a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Defect iff `area > min_defect_area`.
    #[default]
    Fixed,
    /// Defect iff `area > min_defect_area` and
    /// `area < relative_threshold_fraction * largest_area`.
    Relative,
}

/// How defect boxes are drawn onto the annotated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// RGB colour of boxes and labels.
    pub color: [u8; 3],
    /// Box outline thickness in pixels.
    pub line_width: u32,
    /// Draw a "DEFECT" tag above each box.
    pub draw_labels: bool,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            line_width: 3,
            draw_labels: true,
        }
    }
}

/// Tunable parameters for one inspection.
///
/// Deserialises from JSON with every field optional; missing fields take the
/// values of [`InspectionConfig::fixed_preset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    pub min_defect_area: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    pub blur_kernel_size: u32,
    /// Gaussian sigma; `0.0` derives it from the kernel size.
    pub blur_sigma: f32,
    /// Radius of the morphological closing applied to the edge map before
    /// tracing; bridges one-pixel breaks in outlines. `0` disables it.
    pub gap_closing_radius: u8,
    pub contour_mode: ContourMode,
    pub classification_policy: ClassificationPolicy,
    pub relative_threshold_fraction: f64,
    pub annotation: AnnotationStyle,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self::fixed_preset()
    }
}

impl InspectionConfig {
    /// Whole-frame inspection: any sizeable outer boundary is a defect.
    pub fn fixed_preset() -> Self {
        Self {
            min_defect_area: 50.0,
            canny_low: 100.0,
            canny_high: 200.0,
            blur_kernel_size: 5,
            blur_sigma: 0.0,
            gap_closing_radius: 1,
            contour_mode: ContourMode::External,
            classification_policy: ClassificationPolicy::Fixed,
            relative_threshold_fraction: 0.9,
            annotation: AnnotationStyle::default(),
        }
    }

    /// Object-on-background inspection: flags regions smaller than the
    /// part's own outline.
    pub fn relative_preset() -> Self {
        Self {
            min_defect_area: 300.0,
            canny_low: 50.0,
            canny_high: 150.0,
            blur_kernel_size: 5,
            blur_sigma: 0.0,
            gap_closing_radius: 1,
            contour_mode: ContourMode::All,
            classification_policy: ClassificationPolicy::Relative,
            relative_threshold_fraction: 0.9,
            annotation: AnnotationStyle {
                line_width: 2,
                draw_labels: false,
                ..AnnotationStyle::default()
            },
        }
    }

    pub fn builder() -> InspectionConfigBuilder {
        InspectionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read a JSON config file, then validate it.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)
            .map_err(|e| InspectError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_defect_area.is_finite() && self.min_defect_area > 0.0) {
            return Err(InspectError::Config(format!(
                "min_defect_area must be positive, got {}",
                self.min_defect_area
            )));
        }
        if !(self.canny_low.is_finite() && self.canny_high.is_finite()) || self.canny_low < 0.0 {
            return Err(InspectError::Config(format!(
                "canny thresholds must be finite and non-negative, got {}/{}",
                self.canny_low, self.canny_high
            )));
        }
        if self.canny_low >= self.canny_high {
            return Err(InspectError::Config(format!(
                "canny_low ({}) must be below canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(InspectError::Config(format!(
                "blur_kernel_size must be a positive odd integer, got {}",
                self.blur_kernel_size
            )));
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma >= 0.0) {
            return Err(InspectError::Config(format!(
                "blur_sigma must be zero or positive, got {}",
                self.blur_sigma
            )));
        }
        if self.gap_closing_radius > MAX_GAP_CLOSING_RADIUS {
            return Err(InspectError::Config(format!(
                "gap_closing_radius must be at most {MAX_GAP_CLOSING_RADIUS}, got {}",
                self.gap_closing_radius
            )));
        }
        let f = self.relative_threshold_fraction;
        if !(f > 0.0 && f < 1.0) {
            return Err(InspectError::Config(format!(
                "relative_threshold_fraction must lie strictly between 0 and 1, got {f}"
            )));
        }
        if self.annotation.line_width == 0 {
            return Err(InspectError::Config(
                "annotation line_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sigma actually used for smoothing.
    pub fn effective_sigma(&self) -> f32 {
        if self.blur_sigma > 0.0 {
            self.blur_sigma
        } else {
            sigma_for_kernel(self.blur_kernel_size)
        }
    }
}

/// Classic kernel-size to sigma rule used when no sigma is given.
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Validating builder for [`InspectionConfig`].
#[derive(Debug, Clone)]
pub struct InspectionConfigBuilder {
    config: InspectionConfig,
}

impl InspectionConfigBuilder {
    pub fn from_config(config: InspectionConfig) -> Self {
        Self { config }
    }

    pub fn min_defect_area(mut self, area: f64) -> Self {
        self.config.min_defect_area = area;
        self
    }

    pub fn canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.config.canny_low = low;
        self.config.canny_high = high;
        self
    }

    pub fn blur_kernel_size(mut self, size: u32) -> Self {
        self.config.blur_kernel_size = size;
        self
    }

    pub fn blur_sigma(mut self, sigma: f32) -> Self {
        self.config.blur_sigma = sigma;
        self
    }

    pub fn gap_closing_radius(mut self, radius: u8) -> Self {
        self.config.gap_closing_radius = radius;
        self
    }

    pub fn contour_mode(mut self, mode: ContourMode) -> Self {
        self.config.contour_mode = mode;
        self
    }

    pub fn classification_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.config.classification_policy = policy;
        self
    }

    pub fn relative_threshold_fraction(mut self, fraction: f64) -> Self {
        self.config.relative_threshold_fraction = fraction;
        self
    }

    pub fn annotation(mut self, style: AnnotationStyle) -> Self {
        self.config.annotation = style;
        self
    }

    pub fn draw_labels(mut self, draw: bool) -> Self {
        self.config.annotation.draw_labels = draw;
        self
    }

    pub fn build(self) -> Result<InspectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
