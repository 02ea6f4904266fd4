//! Chessboard corner candidate detection.
//!
//! ## Quickstart
//!
//! ```
//! use cbdetect_core::synthetic::BoardRender;
//! use cbdetect_corners::{CornerDetector, CornerParams};
//! use nalgebra::Point2;
//!
//! let board = BoardRender::axis_aligned(5, 4, 20.0, Point2::new(19.5, 19.5), 140, 120);
//! let img = board.render();
//!
//! let detector = CornerDetector::new(CornerParams::default());
//! let candidates = detector.detect(&img.view()).expect("valid raster");
//! println!("found {} candidates", candidates.len());
//! ```
//!
//! Pipeline:
//! 1. Normalise the raster to `[0, 1]`.
//! 2. Correlate with a bank of saddle templates (two orientations × several
//!    radii) and keep the per-pixel maximum as corner likelihood.
//! 3. Block-based non-maximum suppression.
//! 4. Per maximum: edge orientations from a gradient-angle histogram,
//!    structure-tensor refinement of both directions, least-squares
//!    sub-pixel position from the two edge lines.
//! 5. Score each candidate by gradient/intensity template correlation and
//!    drop weak ones.

mod candidates;
mod detector;
mod filter_bank;
mod gradient;
mod nms;
mod orientation;
mod params;
mod refine;
mod score;

pub use candidates::CandidateSet;
pub use detector::CornerDetector;
pub use filter_bank::{saddle_response, CorrelationTemplate, FilterBank};
pub use gradient::GradientField;
pub use nms::non_maximum_suppression;
pub use orientation::{edge_orientations, find_histogram_modes};
pub use params::CornerParams;
pub use refine::{refine_directions, refine_position};
pub use score::corner_score;
