use crate::common::*;

/// A source/target pair of volumes for registration training.
#[derive(Debug)]
pub struct PairRecord {
    /// The anchor volume in shape `[1, ...]`.
    pub source: Tensor,
    /// The companion volume in shape `[1, ...]`.
    pub target: Tensor,
    pub source_id: String,
    pub target_id: String,
}

/// A source/target pair of volumes with their label maps.
#[derive(Debug)]
pub struct SegPairRecord {
    pub source: Tensor,
    pub target: Tensor,
    /// The anchor label map in `Int16` kind.
    pub source_seg: Tensor,
    /// The companion label map in `Int16` kind.
    pub target_seg: Tensor,
}
