//! Training defaults derived from the frame count.
//!
//! 200-1000 images is the sweet spot for a splat capture. Fewer frames
//! need fewer steps (less data to fit); large captures benefit from more.
//! Refinement is scheduled roughly once per full scene coverage.

/// Step count and refinement interval chosen for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingDefaults {
    pub steps: u32,
    pub refine_every: u32,
}

/// Picks defaults for `frame_count` extracted frames.
#[must_use]
pub fn training_defaults(frame_count: usize) -> TrainingDefaults {
    let steps = if frame_count < 50 {
        tracing::warn!(
            "only {frame_count} frames, quality may be limited; try a higher --fps"
        );
        20000
    } else if frame_count < 100 {
        25000
    } else if frame_count > 300 {
        35000
    } else {
        30000
    };

    TrainingDefaults {
        steps,
        refine_every: frame_count.min(200) as u32,
    }
}
