//! End-to-end detection: raster -> corner candidates -> ranked grids.

use cbdetect_chessboard::{Chessboard, ChessboardGrower, ChessboardParams};
use cbdetect_core::{GrayImageView, InputError};
use cbdetect_corners::{CandidateSet, CornerDetector, CornerParams};
use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] serde_json::Error),

    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}

/// Parameters of the whole pipeline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub corners: CornerParams,
    pub chessboard: ChessboardParams,
}

impl DetectorParams {
    /// Parse a (possibly partial) JSON config; missing fields keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self, DetectError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DetectError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DetectError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// One recovered grid in serialisable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridDetection {
    pub rows: usize,
    pub cols: usize,
    pub energy: f32,
    /// Corner positions, row-major (row index slower).
    pub corners: Vec<[f32; 2]>,
}

impl GridDetection {
    /// Flatten a board. Unfilled cells are skipped.
    pub fn from_board(board: &Chessboard, candidates: &CandidateSet) -> Self {
        let corners = board
            .filled()
            .map(|i| {
                let p = candidates.position(i);
                [p.x, p.y]
            })
            .collect();
        Self {
            rows: board.rows(),
            cols: board.cols(),
            energy: board.energy(),
            corners,
        }
    }

    pub fn points(&self) -> Vec<Point2<f32>> {
        self.corners.iter().map(|&[x, y]| Point2::new(x, y)).collect()
    }

    /// Whether the grid is `cols x rows`, in either orientation.
    pub fn matches_shape(&self, cols: usize, rows: usize) -> bool {
        (self.cols == cols && self.rows == rows) || (self.cols == rows && self.rows == cols)
    }
}

/// Everything the pipeline produced for one raster.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    pub candidates: CandidateSet,
    /// Ranked best first; boards never share a candidate.
    pub boards: Vec<Chessboard>,
}

impl DetectionResult {
    pub fn grids(&self) -> Vec<GridDetection> {
        self.boards
            .iter()
            .map(|b| GridDetection::from_board(b, &self.candidates))
            .collect()
    }

    pub fn best(&self) -> Option<GridDetection> {
        self.boards
            .first()
            .map(|b| GridDetection::from_board(b, &self.candidates))
    }
}

/// Run corner detection and grid growing, returning all ranked grids.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(view, params), fields(width = view.width, height = view.height))
)]
pub fn detect_chessboards(
    view: &GrayImageView<'_>,
    params: &DetectorParams,
) -> Result<DetectionResult, DetectError> {
    let candidates = CornerDetector::new(params.corners.clone()).detect(view)?;
    let boards = ChessboardGrower::new(params.chessboard.clone()).detect(&candidates);
    Ok(DetectionResult { candidates, boards })
}

/// Corners of the best grid, row-major; empty when no grid is found.
///
/// `cols`/`rows` describe the expected inner-corner layout. They do not
/// filter the result: a best grid of another shape is still returned, with
/// a warning. Pass zeros to skip the check.
pub fn detect(
    view: &GrayImageView<'_>,
    cols: usize,
    rows: usize,
    params: &DetectorParams,
) -> Result<Vec<Point2<f32>>, DetectError> {
    let result = detect_chessboards(view, params)?;
    let Some(best) = result.best() else {
        info!("no chessboard among {} candidates", result.candidates.len());
        return Ok(Vec::new());
    };

    if cols > 0 && rows > 0 && !best.matches_shape(cols, rows) {
        warn!(
            "best grid is {}x{} (cols x rows), expected {}x{}",
            best.cols, best.rows, cols, rows
        );
    }
    Ok(best.points())
}

/// [`detect`] on a raw row-major grayscale buffer.
pub fn detect_from_gray_u8(
    width: usize,
    height: usize,
    pixels: &[u8],
    cols: usize,
    rows: usize,
    params: &DetectorParams,
) -> Result<Vec<Point2<f32>>, DetectError> {
    let view = GrayImageView::new(width, height, pixels)?;
    detect(&view, cols, rows, params)
}

/// Borrow an `image::GrayImage` as a detector view.
#[cfg(feature = "image")]
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Decode an image file and convert it to 8-bit grayscale.
#[cfg(feature = "image")]
pub fn load_gray(path: impl AsRef<Path>) -> Result<::image::GrayImage, DetectError> {
    Ok(::image::open(path)?.to_luma8())
}

/// [`detect`] on an `image::GrayImage`.
#[cfg(feature = "image")]
pub fn detect_image(
    img: &::image::GrayImage,
    cols: usize,
    rows: usize,
    params: &DetectorParams,
) -> Result<Vec<Point2<f32>>, DetectError> {
    detect(&gray_view(img), cols, rows, params)
}
