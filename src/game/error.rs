use super::types::SegmentId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    #[error("path history is empty")]
    EmptyPath,
    #[error("segment {0:?} is not alive")]
    MissingSegment(SegmentId),
    #[error("segment value {0} is not a power of two")]
    InvalidValue(u32),
    #[error("offset cache holds {offsets} entries for {chain} segments")]
    StaleOffsets { chain: usize, offsets: usize },
    #[error("no free spawn point after {attempts} attempts")]
    PlacementExhausted { attempts: usize },
}
