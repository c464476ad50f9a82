use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbImage};
use tracing::{debug, info};

use crate::config::InspectionConfig;
use crate::detection::{annotate, classify, contours, edges, loader, preprocessing, verdict};
use crate::error::{InspectError, Result};
use crate::models::VerdictResult;
use crate::output::save_error;

/// Pipeline stages, in execution order. Names key the debug directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Grayscale,
    Smoothing,
    EdgeDetection,
    Annotation,
}

impl Stage {
    pub fn index(&self) -> usize {
        match self {
            Self::Input => 0,
            Self::Grayscale => 1,
            Self::Smoothing => 2,
            Self::EdgeDetection => 3,
            Self::Annotation => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Grayscale => "grayscale",
            Self::Smoothing => "smoothed",
            Self::EdgeDetection => "edges",
            Self::Annotation => "annotated",
        }
    }

    /// e.g. `03_edges`
    pub fn dir_name(&self) -> String {
        format!("{:02}_{}", self.index(), self.name())
    }
}

/// Where stage images go when debug output is on.
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Holds one `NN_stage` subdirectory per stage.
    pub output_dir: PathBuf,
}

/// Per-inspector switches that do not affect the verdict.
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Runs the inspection stages over one image at a time.
///
/// An `Inspector` holds only its validated configuration, so one instance can
/// be shared by any number of concurrent inspections.
#[derive(Clone, Debug)]
pub struct Inspector {
    config: InspectionConfig,
    context: PipelineContext,
}

impl Inspector {
    /// Validates `config` up front; a bad config never reaches a stage.
    pub fn new(config: InspectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context: PipelineContext::default(),
        })
    }

    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    /// Log per-contour details at debug level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Save every stage's image under `output_dir`.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let mut entries = std::fs::read_dir(&output_dir).map_err(|source| InspectError::Persist {
                path: output_dir.clone(),
                source,
            })?;
            if entries.next().is_some() {
                return Err(InspectError::Config(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|source| InspectError::Persist {
                path: output_dir.clone(),
                source,
            })?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn inspect_path(&self, path: impl AsRef<Path>) -> Result<VerdictResult> {
        let path = path.as_ref();
        let img = loader::load(path).inspect_err(|e| {
            tracing::warn!(file = %path.display(), error = %e, "could not load image");
        })?;
        self.inspect(&img)
    }

    pub fn inspect_bytes(&self, bytes: &[u8]) -> Result<VerdictResult> {
        let img = loader::load_from_memory(bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "could not decode image bytes");
        })?;
        self.inspect(&img)
    }

    /// Run preprocessing, extraction, classification and annotation.
    ///
    /// Only debug-artefact writes can fail; with debug output off this always
    /// returns `Ok`.
    pub fn inspect(&self, img: &DynamicImage) -> Result<VerdictResult> {
        let config = &self.config;
        debug!(width = img.width(), height = img.height(), "inspecting image");
        self.save_debug(Stage::Input, DebugImage::Color(img))?;

        let gray = preprocessing::to_grayscale(img);
        self.save_debug(Stage::Grayscale, DebugImage::Gray(&gray))?;

        let sigma = config.effective_sigma();
        let smoothed = preprocessing::smooth(&gray, config.blur_kernel_size, sigma);
        debug!(kernel = config.blur_kernel_size, sigma, "smoothed");
        self.save_debug(Stage::Smoothing, DebugImage::Gray(&smoothed))?;

        let edge_map = edges::detect_edges(&smoothed, config.canny_low, config.canny_high);
        debug!(edge_pixels = edge_map.edge_count(), "edges detected");
        self.save_debug(Stage::EdgeDetection, DebugImage::Gray(edge_map.as_image()))?;

        let found = contours::find_contours(&edge_map, config.contour_mode, config.gap_closing_radius);
        debug!(contours = found.len(), mode = ?config.contour_mode, "contours traced");
        if self.context.verbose {
            for (i, c) in found.iter().take(10).enumerate() {
                debug!(
                    index = i + 1,
                    area = c.area(),
                    points = c.len(),
                    kind = ?c.kind,
                    bounds = ?c.bounding_rect(),
                    "contour"
                );
            }
        }

        let defects = classify::classify(&found, config);
        debug!(
            defects = defects.len(),
            policy = ?config.classification_policy,
            min_area = config.min_defect_area,
            "classified"
        );

        let annotated = annotate::annotate(img, &defects, &config.annotation);
        self.save_debug(Stage::Annotation, DebugImage::Rgb(&annotated))?;

        let result = verdict::summarize(defects, found.len(), annotated);
        info!(
            status = %result.status,
            defects = result.defect_count,
            contours = result.contour_count,
            "inspection complete"
        );
        Ok(result)
    }

    fn save_debug(&self, stage: Stage, image: DebugImage<'_>) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let stage_dir = debug_config.output_dir.join(stage.dir_name());
        std::fs::create_dir_all(&stage_dir).map_err(|source| InspectError::Persist {
            path: stage_dir.clone(),
            source,
        })?;

        let output_path = stage_dir.join("01.png");
        match image {
            DebugImage::Gray(g) => g.save(&output_path),
            DebugImage::Color(c) => c.save(&output_path),
            DebugImage::Rgb(c) => c.save(&output_path),
        }
        .map_err(|e| save_error(&output_path, e))?;

        debug!(path = %output_path.display(), "saved debug image");
        Ok(())
    }
}

enum DebugImage<'a> {
    Gray(&'a GrayImage),
    Color(&'a DynamicImage),
    Rgb(&'a RgbImage),
}

/// One-shot inspection with a throwaway [`Inspector`].
pub fn inspect(img: &DynamicImage, config: &InspectionConfig) -> Result<VerdictResult> {
    Inspector::new(config.clone())?.inspect(img)
}
