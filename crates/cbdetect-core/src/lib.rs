//! Core types and utilities for chessboard corner-grid detection.
//!
//! This crate is intentionally small: raster views and float maps, the
//! corner candidate type shared by the detector and the grid grower, input
//! validation, a planar homography, logging helpers and a synthetic board
//! renderer used by tests and benchmarks across the workspace.

mod corner;
mod error;
mod homography;
mod image;
mod logger;
pub mod synthetic;

pub use corner::CornerCandidate;
pub use error::InputError;
pub use homography::{homography_from_4pt, Homography};
pub use image::{sample_bilinear, GrayImage, GrayImageView, ImageF32, MIN_IMAGE_SIDE};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
