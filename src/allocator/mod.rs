//! Allocation strategies over a shared [`RoomPool`] and [`CostModel`].
//!
//! An allocator only ever mutates the pool through [`RoomPool::occupy`] and
//! reports what it committed as [`Placement`]s. Participants it could not
//! seat are simply absent from the result; the fallback resolver covers them.

pub mod greedy;
pub mod optimal;

pub use greedy::GreedyAllocator;
pub use optimal::OptimalAllocator;

use crate::{
    config::{AllocationConfig, StrategyKind},
    cost::CostModel,
    distance::DistanceProvider,
    error::Result,
    model::{Participant, Placement},
    pool::RoomPool,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub placements: Vec<Placement>,
    /// Matching rounds or greedy passes that were run.
    pub rounds: usize,
}

pub trait Allocator {
    fn name(&self) -> &'static str;

    fn allocate<D>(
        &self,
        participants: &[Participant],
        pool: &mut RoomPool,
        cost: CostModel<'_, D>,
    ) -> Result<Allocation>
    where
        D: DistanceProvider + ?Sized;
}

/// Allocator selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Optimal(OptimalAllocator),
    Greedy(GreedyAllocator),
}

impl Strategy {
    pub fn from_config(config: &AllocationConfig) -> Self {
        match config.strategy {
            StrategyKind::Optimal => Strategy::Optimal(OptimalAllocator::new(
                config.seat_columns,
                config.max_rounds,
            )),
            StrategyKind::Greedy => {
                Strategy::Greedy(GreedyAllocator::new(config.participant_order))
            }
        }
    }
}

impl Allocator for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Optimal(a) => a.name(),
            Strategy::Greedy(a) => a.name(),
        }
    }

    fn allocate<D>(
        &self,
        participants: &[Participant],
        pool: &mut RoomPool,
        cost: CostModel<'_, D>,
    ) -> Result<Allocation>
    where
        D: DistanceProvider + ?Sized,
    {
        match self {
            Strategy::Optimal(a) => a.allocate(participants, pool, cost),
            Strategy::Greedy(a) => a.allocate(participants, pool, cost),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{ParticipantOrder, SeatColumns};

    #[test]
    fn strategy_follows_config() {
        let cfg = AllocationConfig {
            max_rounds: Some(3),
            seat_columns: SeatColumns::PerRoom,
            ..AllocationConfig::default()
        };
        assert_eq!(
            Strategy::from_config(&cfg),
            Strategy::Optimal(OptimalAllocator::new(SeatColumns::PerRoom, Some(3)))
        );

        let cfg = AllocationConfig {
            strategy: StrategyKind::Greedy,
            participant_order: ParticipantOrder::InputOrder,
            ..AllocationConfig::default()
        };
        let strategy = Strategy::from_config(&cfg);
        assert_eq!(
            strategy,
            Strategy::Greedy(GreedyAllocator::new(ParticipantOrder::InputOrder))
        );
        assert_eq!(strategy.name(), "greedy");
    }
}
