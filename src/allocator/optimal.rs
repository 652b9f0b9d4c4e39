use std::collections::HashMap;

use nalgebra::DMatrix;
use tracing::{debug, instrument, warn};

use super::{Allocation, Allocator};
use crate::{
    config::SeatColumns,
    cost::{is_committable, CostModel, MismatchCost},
    distance::DistanceProvider,
    error::Result,
    hungarian,
    model::{Participant, Placement, TestType, UNREACHABLE_DISTANCE},
    pool::RoomPool,
};

/// Iterative minimum-cost matching.
///
/// Each round matches every pending participant against the open rooms,
/// commits the pairs that are compatible and below [`UNREACHABLE_DISTANCE`],
/// and goes again with whoever is left. A round that commits nothing ends
/// the run, so at most one round per participant is ever needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimalAllocator {
    seat_columns: SeatColumns,
    max_rounds: Option<usize>,
}

impl OptimalAllocator {
    pub fn new(seat_columns: SeatColumns, max_rounds: Option<usize>) -> Self {
        Self {
            seat_columns,
            max_rounds,
        }
    }

    /// Room slot behind each matrix column.
    fn columns(&self, pending: &[&Participant], pool: &RoomPool) -> Vec<usize> {
        match self.seat_columns {
            SeatColumns::PerRoom => pool.open_rooms().collect(),
            SeatColumns::PerSeat => {
                let mut demand: HashMap<&TestType, usize> = HashMap::new();
                for p in pending {
                    *demand.entry(&p.test_type).or_default() += 1;
                }
                let mut columns = Vec::new();
                for slot in pool.open_rooms() {
                    let wanted = pool
                        .get(slot)
                        .and_then(|r| demand.get(&r.test_type))
                        .copied()
                        .unwrap_or(0);
                    let seats = (pool.remaining(slot) as usize).min(wanted).max(1);
                    columns.extend(std::iter::repeat(slot).take(seats));
                }
                columns
            }
        }
    }
}

impl Allocator for OptimalAllocator {
    fn name(&self) -> &'static str {
        "optimal"
    }

    #[instrument(skip_all, fields(participants = participants.len(), rooms = pool.len()))]
    fn allocate<D>(
        &self,
        participants: &[Participant],
        pool: &mut RoomPool,
        cost: CostModel<'_, D>,
    ) -> Result<Allocation>
    where
        D: DistanceProvider + ?Sized,
    {
        let limit = self.max_rounds.unwrap_or(participants.len() + 1);
        let mut cost = cost;
        let mut pending: Vec<&Participant> = participants.iter().collect();
        let mut out = Allocation::default();

        while !pending.is_empty() {
            if out.rounds >= limit {
                warn!(limit, pending = pending.len(), "round limit reached");
                break;
            }

            let columns = self.columns(&pending, pool);
            if columns.is_empty() {
                debug!(pending = pending.len(), "no open rooms left");
                break;
            }
            out.rounds += 1;

            let mut compatible_cells = 0usize;
            let matrix = DMatrix::from_fn(pending.len(), columns.len(), |r, c| {
                let v = cost.cost(pending[r], pool, columns[c]);
                if !is_committable(v) {
                    return UNREACHABLE_DISTANCE;
                }
                if pool.is_compatible(columns[c], &pending[r].test_type) {
                    compatible_cells += 1;
                }
                v
            });
            if matrix.iter().all(|&v| !is_committable(v)) {
                warn!(
                    round = out.rounds,
                    pending = pending.len(),
                    "no feasible pair left, remaining participants fall back"
                );
                break;
            }

            let matched = hungarian::solve_rectangular(&matrix, UNREACHABLE_DISTANCE);
            let mut placed = vec![false; pending.len()];
            let mut committed = 0usize;
            for (r, c) in matched.assignment() {
                let (participant, slot) = (pending[r], columns[c]);
                let distance = matrix[(r, c)];
                if !is_committable(distance) || !pool.is_compatible(slot, &participant.test_type) {
                    continue;
                }
                pool.occupy(slot)?;
                out.placements.push(Placement {
                    participant: participant.id,
                    room: slot,
                    distance,
                });
                placed[r] = true;
                committed += 1;
            }

            debug!(
                round = out.rounds,
                pending = pending.len(),
                columns = columns.len(),
                committed,
                "matching round"
            );

            if committed == 0 {
                if matches!(cost.mismatch(), MismatchCost::Penalized(_)) && compatible_cells > 0 {
                    debug!(round = out.rounds, "mismatches crowded out compatible rooms, excluding them");
                    cost = cost.with_mismatch(MismatchCost::Excluded);
                    continue;
                }
                warn!(
                    round = out.rounds,
                    pending = pending.len(),
                    "round committed nothing, remaining participants fall back"
                );
                break;
            }

            pending = pending
                .into_iter()
                .zip(placed)
                .filter_map(|(p, placed)| (!placed).then_some(p))
                .collect();
        }

        Ok(out)
    }
}
