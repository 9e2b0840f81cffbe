//! Raw backend record layout and the caller-facing detection table.
//!
//! The record layout is part of the wire contract with the native ADLA
//! interface and must stay bit-exact: six 32-bit floats per record, in
//! the order the backend writes them.

/// Number of record slots the backend's output buffer holds per call.
///
/// Fixed by the backend definition, not chosen by the caller. The
/// reported result count is clamped to this before any indexed access.
pub const RESULT_CAPACITY: usize = 230;

/// Maximum number of rows in the caller-facing detection table.
pub const MAX_DETECTIONS: usize = 20;

/// One detection record as the backend writes it.
///
/// Field order is fixed by the native interface: `ymin, xmin, ymax,
/// xmax, score, object_class`. The class is carried as a float because
/// that is what the backend emits.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawDetection {
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
    pub score: f32,
    pub object_class: f32,
}

/// One caller-facing detection row.
///
/// Coordinates come through exactly as the backend produced them,
/// already normalized to the model's convention; no rescaling happens
/// in this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Detection {
    pub class_id: f32,
    pub score: f32,
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
}

impl Detection {
    /// True for the all-zero sentinel rows that pad the table.
    pub fn is_zero(&self) -> bool {
        *self == Detection::default()
    }
}

impl From<RawDetection> for Detection {
    fn from(record: RawDetection) -> Self {
        Detection {
            class_id: record.object_class,
            score: record.score,
            ymin: record.ymin,
            xmin: record.xmin,
            ymax: record.ymax,
            xmax: record.xmax,
        }
    }
}

/// Fixed-shape detection table.
///
/// Always exactly `MAX_DETECTIONS` rows regardless of how many true
/// detections occurred; rows past `accepted()` are all-zero sentinel
/// rows, never omitted, so the return value keeps a constant shape
/// across calls.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DetectionTable {
    pub(crate) rows: [Detection; MAX_DETECTIONS],
    pub(crate) accepted: usize,
}

impl DetectionTable {
    /// Table with zero accepted rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All rows, accepted first, zero-filled to `MAX_DETECTIONS`.
    pub fn rows(&self) -> &[Detection; MAX_DETECTIONS] {
        &self.rows
    }

    /// Number of rows holding an accepted detection.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn is_empty(&self) -> bool {
        self.accepted == 0
    }

    /// Iterator over the accepted rows only.
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.rows[..self.accepted].iter()
    }
}
