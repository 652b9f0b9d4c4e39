use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    allocator::{Allocator, Strategy},
    config::AllocationConfig,
    cost::CostModel,
    distance::DistanceMatrix,
    error::{Error, Result},
    fallback,
    model::{AssignmentRecord, Participant, Room},
    pool::{RoomOccupancy, RoomPool},
};

/// Validated input for allocation runs. Runs never mutate it.
#[derive(Debug, Clone)]
pub struct Problem {
    participants: Vec<Participant>,
    rooms: Vec<Room>,
    distances: DistanceMatrix,
}

impl Problem {
    pub fn new(
        participants: Vec<Participant>,
        rooms: Vec<Room>,
        distances: DistanceMatrix,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(participants.len());
        for p in &participants {
            if !seen.insert(p.id) {
                return Err(Error::DuplicateParticipant(p.id));
            }
            if p.test_type.as_str().trim().is_empty() {
                return Err(Error::EmptyParticipantTestType(p.id));
            }
        }
        if let Some(r) = rooms.iter().find(|r| r.test_type.as_str().trim().is_empty()) {
            return Err(Error::EmptyRoomTestType {
                room: r.id,
                school: r.school,
            });
        }
        Ok(Self {
            participants,
            rooms,
            distances,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSummary {
    pub participants: usize,
    pub placed: usize,
    pub unplaced: usize,
    pub rounds: usize,
    pub total_distance: f64,
    pub mean_distance: Option<f64>,
    pub max_distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReport {
    pub strategy: &'static str,
    pub records: Vec<AssignmentRecord>,
    pub occupancy: Vec<RoomOccupancy>,
    pub summary: AllocationSummary,
}

impl AllocationReport {
    fn new(
        strategy: &'static str,
        records: Vec<AssignmentRecord>,
        occupancy: Vec<RoomOccupancy>,
        rounds: usize,
    ) -> Self {
        let placed: Vec<f64> = records
            .iter()
            .filter(|r| !r.is_fallback())
            .map(|r| r.distance)
            .collect();
        let total_distance: f64 = placed.iter().sum();
        let summary = AllocationSummary {
            participants: records.len(),
            placed: placed.len(),
            unplaced: records.len() - placed.len(),
            rounds,
            total_distance,
            mean_distance: (!placed.is_empty()).then(|| total_distance / placed.len() as f64),
            max_distance: placed.iter().copied().reduce(f64::max),
        };
        Self {
            strategy,
            records,
            occupancy,
            summary,
        }
    }

    pub fn placed_records(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.records.iter().filter(|r| !r.is_fallback())
    }

    pub fn fallback_records(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.records.iter().filter(|r| r.is_fallback())
    }

    /// Distances of placed participants, ascending.
    pub fn sorted_distances(&self) -> Vec<f64> {
        let mut distances: Vec<f64> = self.placed_records().map(|r| r.distance).collect();
        distances.sort_by(f64::total_cmp);
        distances
    }

    pub fn into_records(self, keep_fallback: bool) -> Vec<AssignmentRecord> {
        if keep_fallback {
            self.records
        } else {
            fallback::retain_placed(self.records)
        }
    }
}

/// Runs the configured strategy on a fresh room pool and resolves fallbacks.
#[instrument(skip_all, fields(strategy = ?config.strategy, participants = problem.participants().len()))]
pub fn allocate(problem: &Problem, config: &AllocationConfig) -> Result<AllocationReport> {
    config.validate()?;
    let mut pool = RoomPool::new(problem.rooms().to_vec());
    let cost = CostModel::new(problem.distances(), config.mismatch);
    let strategy = Strategy::from_config(config);

    let allocation = strategy.allocate(problem.participants(), &mut pool, cost)?;
    let records = fallback::resolve(problem.participants(), &pool, &allocation.placements);
    let report = AllocationReport::new(
        strategy.name(),
        records,
        pool.occupancy_report(),
        allocation.rounds,
    );

    info!(
        placed = report.summary.placed,
        unplaced = report.summary.unplaced,
        total_distance = report.summary.total_distance,
        rounds = report.summary.rounds,
        "allocation finished"
    );
    Ok(report)
}
