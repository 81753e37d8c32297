use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ZERO: Point = Point {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Opaque handle for a segment, whether it is a chain member or a bonus item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SegmentId(pub u64);

#[derive(Debug, Clone)]
pub struct Segment {
    pub id: SegmentId,
    pub value: u32,
    pub position: Point,
    pub facing: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCompletion {
    HeadArrived,
    Absorbed { item: SegmentId, value: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ChainEvent {
    #[serde(rename = "merged")]
    Merged { value: u32 },
    #[serde(rename = "headChanged")]
    HeadChanged { head: Option<SegmentId> },
    #[serde(rename = "absorbed")]
    Absorbed { value: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentView {
    pub id: SegmentId,
    pub value: u32,
    pub size: f64,
    pub position: Point,
    pub facing: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot {
    pub segments: Vec<SegmentView>,
    pub bonus: Vec<SegmentView>,
    pub head: Option<SegmentId>,
    pub merging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GroundBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub y: f64,
}
