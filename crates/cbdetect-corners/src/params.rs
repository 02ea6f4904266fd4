use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Parameters of the corner candidate detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerParams {
    /// Minimal final corner score τ; weaker candidates are dropped.
    pub score_threshold: f32,

    /// Edge-angle pairs (radians) of the correlation templates.
    pub template_angles: Vec<[f32; 2]>,

    /// Template radii in pixels; every angle pair is built at every radius.
    pub template_radii: Vec<usize>,

    /// Half-size of the non-maximum suppression neighbourhood.
    pub nms_radius: usize,

    /// Border (pixels) excluded from the maximum search.
    pub nms_margin: usize,

    /// Minimal likelihood of a local maximum.
    pub nms_threshold: f32,

    /// Refine positions to sub-pixel accuracy. Orientations are refined
    /// regardless.
    pub refine: bool,

    /// Half-size of the window used for orientation and position refinement.
    pub refine_radius: usize,

    /// Candidates moving this far (pixels) or more during refinement are
    /// dropped as unstable.
    pub max_refine_shift: f32,

    /// Minimal angle (radians) between the two edge directions; closer
    /// directions mean an edge or blob, not a saddle.
    pub min_edge_angle: f32,

    /// Number of bins of the edge-angle histogram over `[0, π)`.
    pub histogram_bins: usize,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            score_threshold: 0.01,
            template_angles: vec![[0.0, FRAC_PI_2], [FRAC_PI_4, -FRAC_PI_4]],
            template_radii: vec![4, 8, 12],
            nms_radius: 3,
            nms_margin: 5,
            nms_threshold: 0.025,
            refine: true,
            refine_radius: 10,
            max_refine_shift: 4.0,
            min_edge_angle: 0.3,
            histogram_bins: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p: CornerParams = serde_json::from_str(r#"{ "score_threshold": 0.2 }"#).unwrap();
        assert_eq!(p.score_threshold, 0.2);
        assert_eq!(p.template_radii, vec![4, 8, 12]);
        assert!(p.refine);
    }
}
