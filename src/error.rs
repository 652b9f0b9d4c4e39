use std::path::PathBuf;

use crate::model::{DistrictId, ParticipantId, RoomId, SchoolId};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is listed more than once")]
    DuplicateParticipant(ParticipantId),

    #[error("{0} has an empty test type")]
    EmptyParticipantTestType(ParticipantId),

    #[error("{room} in {school} has an empty test type")]
    EmptyRoomTestType { room: RoomId, school: SchoolId },

    #[error("{room} in {school} has negative capacity {capacity}")]
    NegativeCapacity {
        room: RoomId,
        school: SchoolId,
        capacity: i64,
    },

    #[error("{room} in {school} exceeds u32 capacity with {capacity}")]
    CapacityOverflow {
        room: RoomId,
        school: SchoolId,
        capacity: i64,
    },

    #[error("room slot {0} is already at capacity")]
    RoomFull(usize),

    #[error("room slot {0} does not exist")]
    UnknownRoom(usize),

    #[error("distance matrix is empty")]
    EmptyDistanceMatrix,

    #[error("distance matrix has {rows} rows but {cols} columns")]
    NonSquareDistanceMatrix { rows: usize, cols: usize },

    #[error("distance matrix has {labels} district labels but is {size}x{size}")]
    LabelCountMismatch { labels: usize, size: usize },

    #[error("distance table line {line} has an unbalanced quote")]
    MalformedCsv { line: usize },

    #[error("distance matrix row {row} has {found} cells, expected {expected}")]
    RaggedDistanceRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("distance matrix label {0:?} is not an integer district id")]
    BadDistrictLabel(String),

    #[error("{0} appears more than once in the distance matrix")]
    DuplicateDistrict(DistrictId),

    #[error("distance matrix row {row} column {col} holds {value:?}, expected a non-negative number")]
    BadDistance {
        row: usize,
        col: usize,
        value: String,
    },

    #[error("mismatch penalty must be a finite non-negative number, got {0}")]
    InvalidPenalty(f64),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
