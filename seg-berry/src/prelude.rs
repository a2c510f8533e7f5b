//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF, Idx3d};
pub use crate::{SegError, SegResult};

pub use crate::geometry::Point;

pub use crate::curve::{
    can_interpolate_at, can_interpolate_fully, find_next_key, find_previous_key, step_slice, Curve,
    KeyLookup, Step,
};
pub use crate::segmentation::{CurveId, Segmentation};

pub use crate::edge::{CannyEdges, EdgeMap, EdgeOperator};

pub use crate::interp::{
    interpolate_at, interpolate_full, EdgeGuideConfig, EdgeGuidedInterpolator, InterpolationMode,
    SliceInterpolator,
};

pub use crate::cloud::vcps::{read_vcps, write_ordered_vcps};
pub use crate::cloud::DenseCloud;

pub use crate::volume::{SliceSource, Volume, VolumeCache};

pub use crate::package::{list_segmentations, load_segmentation, save_segmentation};

pub use crate::consts::{DEFAULT_JUMP, HIT_RADIUS};
