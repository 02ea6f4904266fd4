//! Chessboard corner-grid detection.
//!
//! A grayscale raster goes through a correlation-template corner detector
//! ([`corners`]) and an energy-driven grid grower ([`chessboard`]); the best
//! grid comes back as row-major sub-pixel corner positions.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cbdetect::{detect, DetectorParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = cbdetect::detect::load_gray("board.png")?;
//! let view = cbdetect::detect::gray_view(&img);
//!
//! // 9x6 inner corners expected
//! let points = detect(&view, 9, 6, &DetectorParams::default())?;
//! println!("found {} corners", points.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `cbdetect::core`: rasters, the corner candidate type, logging, a
//!   synthetic board renderer.
//! - `cbdetect::corners`: template bank, corner detector, candidate set.
//! - `cbdetect::chessboard`: seeding, growth, energy and ranking of grids.
//! - `cbdetect::detect`: end-to-end helpers (image helpers behind the
//!   `image` feature).
//!
//! Features: `image` and `cli` (default), `rayon` for parallel filtering,
//! refinement and growth, `tracing` for spans around the pipeline stages.

pub use cbdetect_chessboard as chessboard;
pub use cbdetect_core as core;
pub use cbdetect_corners as corners;

pub use cbdetect_chessboard::{Chessboard, ChessboardParams};
pub use cbdetect_core::{CornerCandidate, GrayImageView, InputError};
pub use cbdetect_corners::{CandidateSet, CornerParams};

pub mod detect;

pub use detect::{
    detect, detect_chessboards, DetectError, DetectionResult, DetectorParams, GridDetection,
};
