//! Capacity-constrained assignment of test-takers to exam rooms.
//!
//! Participants need one test type each; rooms hold a fixed number of seats
//! for one test type. [`allocate`] seats participants so that total travel
//! distance between districts stays low, and emits a fallback record for
//! anyone who cannot be seated.

pub mod allocator;
pub mod config;
pub mod cost;
pub mod distance;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod hungarian;
pub mod io;
pub mod model;
pub mod pool;

pub use allocator::{Allocation, Allocator, GreedyAllocator, OptimalAllocator, Strategy};
pub use config::{AllocationConfig, ParticipantOrder, SeatColumns, StrategyKind};
pub use cost::{CostModel, MismatchCost};
pub use distance::{DistanceMatrix, DistanceProvider, DistrictLabels};
pub use engine::{allocate, AllocationReport, AllocationSummary, Problem};
pub use error::{Error, Result};
pub use hungarian::{hungarian, solve_rectangular, Allocations};
pub use model::{
    AssignmentRecord, DistrictId, Participant, ParticipantId, Placement, Room, RoomId, SchoolId,
    TestType, FALLBACK_DISTANCE, FALLBACK_ID, MISMATCH_PENALTY, UNREACHABLE_DISTANCE,
};
pub use pool::{RoomOccupancy, RoomPool};
