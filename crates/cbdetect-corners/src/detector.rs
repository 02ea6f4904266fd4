use crate::candidates::CandidateSet;
use crate::filter_bank::FilterBank;
use crate::gradient::GradientField;
use crate::nms::non_maximum_suppression;
use crate::orientation::edge_orientations;
use crate::params::CornerParams;
use crate::refine::{refine_directions, refine_position};
use crate::score::corner_score;
use cbdetect_core::{CornerCandidate, GrayImageView, ImageF32, InputError};
use kiddo::{KdTree, SquaredEuclidean};
use log::{debug, info, trace};
use nalgebra::Point2;
use std::cmp::Ordering;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Refined maxima closer than this to a stronger candidate are duplicates.
const DUPLICATE_RADIUS: f32 = 1.0;

/// Saddle-point corner detector.
///
/// Holds the parameters and the pre-built template bank, so one instance can
/// be reused across images.
#[derive(Clone, Debug)]
pub struct CornerDetector {
    params: CornerParams,
    bank: FilterBank,
}

impl CornerDetector {
    pub fn new(params: CornerParams) -> Self {
        let bank = FilterBank::new(&params.template_angles, &params.template_radii);
        Self { params, bank }
    }

    pub fn params(&self) -> &CornerParams {
        &self.params
    }

    pub fn filter_bank(&self) -> &FilterBank {
        &self.bank
    }

    /// Combined corner likelihood of a raster, for inspection.
    ///
    /// `Ok(None)` for a uniform raster.
    pub fn likelihood(&self, view: &GrayImageView<'_>) -> Result<Option<ImageF32>, InputError> {
        view.validate()?;
        Ok(ImageF32::from_gray_normalized(view).map(|img| self.bank.likelihood(&img)))
    }

    /// Detect corner candidates, strongest first.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, view), fields(width = view.width, height = view.height))
    )]
    pub fn detect(&self, view: &GrayImageView<'_>) -> Result<CandidateSet, InputError> {
        view.validate()?;
        let Some(img) = ImageF32::from_gray_normalized(view) else {
            info!("uniform {}x{} raster, no corners", view.width, view.height);
            return Ok(CandidateSet::new(Vec::new()));
        };

        let likelihood = self.bank.likelihood(&img);
        let maxima = non_maximum_suppression(
            &likelihood,
            self.params.nms_radius,
            self.params.nms_margin,
            self.params.nms_threshold,
        );
        debug!("{} local maxima above {}", maxima.len(), self.params.nms_threshold);

        let grad = GradientField::prewitt(&img);

        #[cfg(feature = "rayon")]
        let refined: Vec<Option<CornerCandidate>> = maxima
            .par_iter()
            .map(|&(x, y)| self.refine_maximum(&img, &grad, x, y))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let refined: Vec<Option<CornerCandidate>> = maxima
            .iter()
            .map(|&(x, y)| self.refine_maximum(&img, &grad, x, y))
            .collect();

        let mut corners: Vec<CornerCandidate> = refined
            .into_iter()
            .flatten()
            .filter(|c| c.score >= self.params.score_threshold)
            .collect();
        for c in corners.iter_mut() {
            c.canonicalize_directions();
        }
        corners.sort_by(compare_candidates);
        let corners = drop_duplicates(corners);

        info!(
            "{} corner candidates from {} maxima (score >= {})",
            corners.len(),
            maxima.len(),
            self.params.score_threshold
        );
        Ok(CandidateSet::new(corners))
    }

    fn refine_maximum(
        &self,
        img: &ImageF32,
        grad: &GradientField,
        x: usize,
        y: usize,
    ) -> Option<CornerCandidate> {
        let p = &self.params;
        let Some((v1, v2)) = edge_orientations(
            grad,
            x,
            y,
            p.refine_radius,
            p.histogram_bins,
            p.min_edge_angle,
        ) else {
            trace!("({x}, {y}): fewer than two edge orientations");
            return None;
        };

        let (v1, v2) = refine_directions(grad, x, y, p.refine_radius, v1, v2);
        if v1.dot(&v2).abs() > p.min_edge_angle.cos() {
            trace!("({x}, {y}): refined edges are near-parallel");
            return None;
        }

        let position = if p.refine {
            match refine_position(grad, x, y, p.refine_radius, v1, v2, p.max_refine_shift) {
                Some(pos) => pos,
                None => {
                    trace!("({x}, {y}): unstable sub-pixel refinement");
                    return None;
                }
            }
        } else {
            Point2::new(x as f32, y as f32)
        };

        let score = corner_score(img, grad, position, v1, v2, &p.template_radii);
        Some(CornerCandidate::new(position, score, v1, v2))
    }
}

/// Descending score, then row-major position.
fn compare_candidates(a: &CornerCandidate, b: &CornerCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.position.y.total_cmp(&b.position.y))
        .then(a.position.x.total_cmp(&b.position.x))
}

/// Keep the first (strongest) of several candidates that converged onto the
/// same spot.
fn drop_duplicates(sorted: Vec<CornerCandidate>) -> Vec<CornerCandidate> {
    let mut tree: KdTree<f32, 2> = KdTree::new();
    let mut kept = Vec::with_capacity(sorted.len());
    for c in sorted {
        let q = [c.position.x, c.position.y];
        let r_sq = DUPLICATE_RADIUS * DUPLICATE_RADIUS;
        if !tree.within::<SquaredEuclidean>(&q, r_sq).is_empty() {
            trace!("duplicate candidate at {:?}", c.position);
            continue;
        }
        tree.add(&q, kept.len() as u64);
        kept.push(c);
    }
    kept
}
