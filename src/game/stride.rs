//! Stride - Foot alternation and stride completion
//!
//! Only one foot may be dragged at a time, and the foot that completed the
//! last stride has to wait for the other one.

use serde::{Deserialize, Serialize};

/// Which foot a gesture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootSide {
    Left,
    Right,
}

impl FootSide {
    /// Opposite foot
    pub fn other(self) -> Self {
        match self {
            FootSide::Left => FootSide::Right,
            FootSide::Right => FootSide::Left,
        }
    }
}

/// Emitted when a dragged foot is released
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrideEvent {
    pub foot: FootSide,
    /// Distance covered by the stride (meters)
    pub length: f64,
}

/// Downward drag offsets of both feet, as reported by the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FootOffsets {
    pub left: f64,
    pub right: f64,
}

impl FootOffsets {
    /// Offset of one foot
    pub fn get(&self, foot: FootSide) -> f64 {
        match foot {
            FootSide::Left => self.left,
            FootSide::Right => self.right,
        }
    }

    fn set(&mut self, foot: FootSide, offset: f64) {
        match foot {
            FootSide::Left => self.left = offset,
            FootSide::Right => self.right = offset,
        }
    }
}

/// Alternating-foot gate
#[derive(Debug, Clone)]
pub struct StrideTracker {
    stride_length: f64,
    active_foot: Option<FootSide>,
    last_foot_moved: Option<FootSide>,
    offsets: FootOffsets,
}

impl StrideTracker {
    /// Create a tracker where either foot may open
    pub fn new(stride_length: f64) -> Self {
        Self {
            stride_length,
            active_foot: None,
            last_foot_moved: None,
            offsets: FootOffsets::default(),
        }
    }

    /// True iff nothing is being dragged and `foot` is not the one that just moved
    pub fn can_start(&self, foot: FootSide) -> bool {
        if self.active_foot.is_some() {
            return false;
        }
        match self.last_foot_moved {
            None => true,
            Some(last) => last != foot,
        }
    }

    /// Start dragging `foot`. Returns false (and changes nothing) if alternation forbids it.
    pub fn begin_stride(&mut self, foot: FootSide) -> bool {
        if !self.can_start(foot) {
            log::trace!("ignoring stride start for {:?}", foot);
            return false;
        }
        self.active_foot = Some(foot);
        self.offsets.set(foot, 0.0);
        true
    }

    /// Record the current downward translation of the dragged foot.
    /// Upward movement is clamped to zero.
    pub fn update_offset(&mut self, foot: FootSide, downward_delta: f64) -> bool {
        if self.active_foot != Some(foot) {
            log::trace!("ignoring offset update for inactive {:?}", foot);
            return false;
        }
        let offset = if downward_delta.is_finite() {
            downward_delta.max(0.0)
        } else {
            0.0
        };
        self.offsets.set(foot, offset);
        true
    }

    /// Release the dragged foot, producing a stride
    pub fn complete_stride(&mut self, foot: FootSide) -> Option<StrideEvent> {
        if self.active_foot != Some(foot) {
            log::trace!("ignoring stride end for inactive {:?}", foot);
            return None;
        }
        self.active_foot = None;
        self.last_foot_moved = Some(foot);
        self.offsets.set(foot, 0.0);
        Some(StrideEvent {
            foot,
            length: self.stride_length,
        })
    }

    /// Foot currently being dragged
    pub fn active_foot(&self) -> Option<FootSide> {
        self.active_foot
    }

    /// Foot that completed the last stride
    pub fn last_foot_moved(&self) -> Option<FootSide> {
        self.last_foot_moved
    }

    /// Get current drag offsets
    pub fn offsets(&self) -> FootOffsets {
        self.offsets
    }

    /// Forget all stride history
    pub fn reset(&mut self) {
        self.active_foot = None;
        self.last_foot_moved = None;
        self.offsets = FootOffsets::default();
    }
}
