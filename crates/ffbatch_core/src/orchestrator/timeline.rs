//! Head/middle/tail cut points for a splice.

use serde::{Deserialize, Serialize};

use crate::models::SpliceConfig;

/// Segments shorter than this are treated as empty.
const MIN_SEGMENT: f64 = 1e-3;

/// Clamped cut points for one clip of `duration` seconds.
///
/// `[0, head)` and `[tail_start, duration)` come from the original;
/// `[head, tail_start)` comes from the companion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceTimeline {
    pub duration: f64,
    pub head: f64,
    pub tail: f64,
    pub tail_start: f64,
    /// Whether a tail was requested at all (middle then has a fixed length).
    pub splice_tail: bool,
    /// Human-readable notes about every adjustment made.
    pub adjustments: Vec<String>,
}

impl SpliceTimeline {
    /// Clamp requested head/tail lengths to the clip.
    ///
    /// Each side is capped at half the duration; if the pair still exceeds
    /// the duration both are scaled down proportionally.
    pub fn clamp(duration: f64, config: &SpliceConfig) -> Self {
        let duration = duration.max(0.0);
        let half = duration / 2.0;
        let mut adjustments = Vec::new();

        let mut head = 0.0;
        if config.splice_head {
            head = config.head_seconds.min(half);
            if head < config.head_seconds {
                adjustments.push(format!(
                    "head {:.3}s exceeds half the duration, clamped to {:.3}s",
                    config.head_seconds, head
                ));
            }
        }

        let mut tail = 0.0;
        if config.splice_tail {
            tail = config.tail_seconds.min(half);
            if tail < config.tail_seconds {
                adjustments.push(format!(
                    "tail {:.3}s exceeds half the duration, clamped to {:.3}s",
                    config.tail_seconds, tail
                ));
            }
        }

        let total = head + tail;
        if total > duration && total > 0.0 {
            let scale = duration / total;
            head *= scale;
            tail *= scale;
            adjustments.push(format!(
                "head + tail exceed the duration, scaled to {:.3}s + {:.3}s",
                head, tail
            ));
        }

        let tail_start = if config.splice_tail {
            (duration - tail).max(0.0)
        } else {
            duration
        };

        Self {
            duration,
            head,
            tail,
            tail_start,
            splice_tail: config.splice_tail,
            adjustments,
        }
    }

    /// Length of the companion segment.
    pub fn middle_duration(&self) -> f64 {
        (self.tail_start - self.head).max(0.0)
    }

    pub fn has_head(&self) -> bool {
        self.head >= MIN_SEGMENT
    }

    pub fn has_tail(&self) -> bool {
        self.splice_tail && self.tail >= MIN_SEGMENT
    }

    pub fn has_middle(&self) -> bool {
        self.middle_duration() >= MIN_SEGMENT
    }

    /// Fixed middle length, or `None` to take the rest of the companion.
    pub fn middle_length(&self) -> Option<f64> {
        if self.has_tail() {
            Some(self.middle_duration())
        } else {
            None
        }
    }
}
