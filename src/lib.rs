pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;

pub use config::{AnnotationStyle, ClassificationPolicy, ContourMode, InspectionConfig};
pub use error::{InspectError, Result};
pub use models::{
    BoundaryKind, BoundingRect, Contour, DefectCandidate, InspectionStatus, VerdictReport, VerdictResult,
};
pub use output::{encode_annotated, save_annotated, OutputFormat};
pub use pipeline::{inspect, Inspector, PipelineContext, Stage};
