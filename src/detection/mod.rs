//! The four inspection stages: loading, preprocessing, edge and contour
//! extraction, then classification with annotation and verdict.

pub mod loader;
pub mod preprocessing;
pub mod edges;
pub mod contours;
pub mod classify;
pub mod annotate;
pub mod verdict;

pub use annotate::annotate;
pub use classify::classify;
pub use contours::find_contours;
pub use edges::{detect_edges, EdgeMap};
pub use loader::{load, load_from_memory};
pub use preprocessing::{smooth, to_grayscale};
pub use verdict::summarize;
