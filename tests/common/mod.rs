mod fixtures;
pub use fixtures::*;

// Re-export commonly used types for tests
pub use surface_inspect::{
    BoundingRect, ClassificationPolicy, ContourMode, InspectError, InspectionConfig, InspectionStatus, Inspector,
    VerdictResult,
};
