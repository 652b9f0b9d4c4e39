use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use super::{Allocation, Allocator};
use crate::{
    config::ParticipantOrder,
    cost::{is_committable, CostModel},
    distance::DistanceProvider,
    error::Result,
    model::{DistrictId, Participant, Placement, TestType, UNREACHABLE_DISTANCE},
    pool::RoomPool,
};

/// Nearest-room greedy strategy. Each participant takes the closest
/// compatible room that still has a seat; decisions are never revisited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreedyAllocator {
    order: ParticipantOrder,
}

impl GreedyAllocator {
    pub fn new(order: ParticipantOrder) -> Self {
        Self { order }
    }

    fn processing_order<'p, D>(
        &self,
        participants: &'p [Participant],
        pool: &RoomPool,
        cost: &CostModel<'_, D>,
    ) -> Vec<&'p Participant>
    where
        D: DistanceProvider + ?Sized,
    {
        match self.order {
            ParticipantOrder::InputOrder => participants.iter().collect(),
            ParticipantOrder::DistrictPriority => {
                district_priority_order(participants, pool, cost)
            }
        }
    }
}

/// Test types in room-list order; within a type, districts by descending
/// distance to their nearest district offering that type (ties by id), and
/// input order within a district. Participants whose type no room offers
/// are left out.
fn district_priority_order<'p, D>(
    participants: &'p [Participant],
    pool: &RoomPool,
    cost: &CostModel<'_, D>,
) -> Vec<&'p Participant>
where
    D: DistanceProvider + ?Sized,
{
    let mut order = Vec::with_capacity(participants.len());
    for test_type in pool.test_types() {
        let targets = pool.districts_offering(&test_type);

        let mut by_district: BTreeMap<DistrictId, Vec<&Participant>> = BTreeMap::new();
        for p in participants.iter().filter(|p| p.test_type == test_type) {
            by_district.entry(p.district).or_default().push(p);
        }

        let mut ranked: Vec<(DistrictId, f64)> = by_district
            .keys()
            .map(|&d| {
                let nearest = targets
                    .iter()
                    .map(|&t| cost.distance(d, t))
                    .fold(UNREACHABLE_DISTANCE, f64::min);
                (d, nearest)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        for (district, _) in ranked {
            if let Some(group) = by_district.remove(&district) {
                order.extend(group);
            }
        }
    }
    order
}

/// Compatible, reachable rooms by ascending distance; ties keep pool order.
fn scan_order<D>(
    participant: &Participant,
    pool: &RoomPool,
    cost: &CostModel<'_, D>,
) -> Vec<(usize, f64)>
where
    D: DistanceProvider + ?Sized,
{
    let rooms_by_slot = pool.rooms();
    let mut rooms: Vec<(usize, f64)> = pool
        .rooms_for(&participant.test_type)
        .map(|slot| (slot, cost.distance(participant.district, rooms_by_slot[slot].district)))
        .filter(|&(_, d)| is_committable(d))
        .collect();
    rooms.sort_by(|a, b| a.1.total_cmp(&b.1));
    rooms
}

impl Allocator for GreedyAllocator {
    fn name(&self) -> &'static str {
        "greedy"
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
        let order = self.processing_order(participants, pool, &cost);
        let mut scans: HashMap<(DistrictId, TestType), Vec<(usize, f64)>> = HashMap::new();
        let mut out = Allocation {
            placements: Vec::with_capacity(order.len()),
            rounds: 1,
        };

        for participant in order {
            let key = (participant.district, participant.test_type.clone());
            let candidates = scans
                .entry(key)
                .or_insert_with(|| scan_order(participant, &*pool, &cost));
            let Some(&(slot, distance)) = candidates.iter().find(|(slot, _)| pool.has_capacity(*slot))
            else {
                debug!(participant = %participant.id, "no compatible room with a free seat");
                continue;
            };
            pool.occupy(slot)?;
            out.placements.push(Placement {
                participant: participant.id,
                room: slot,
                distance,
            });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cost::MismatchCost,
        distance::DistanceMatrix,
        model::{ParticipantId, Room},
    };

    fn line() -> DistanceMatrix {
        // districts on a line: 0 -- 10 -- 1 -- 10 -- 2
        DistanceMatrix::from_rows(
            &[0, 1, 2],
            &[&[0., 10., 20.], &[10., 0., 10.], &[20., 10., 0.]],
        )
        .unwrap()
    }

    fn ids(order: &[&Participant]) -> Vec<i64> {
        order.iter().map(|p| p.id.value()).collect()
    }

    #[test]
    fn scan_is_by_distance_then_pool_order() {
        let m = line();
        let pool = RoomPool::new(vec![
            Room::new(1, 1, 2, "A", 1),
            Room::new(2, 1, 1, "A", 1),
            Room::new(3, 1, 1, "B", 1),
            Room::new(4, 2, 1, "A", 1),
        ]);
        let cost = CostModel::new(&m, MismatchCost::Excluded);
        let scan = scan_order(&Participant::new(1, 0, "A"), &pool, &cost);
        assert_eq!(scan, vec![(1, 10.), (3, 10.), (0, 20.)]);
    }

    #[test]
    fn farthest_district_goes_first() {
        let m = line();
        let pool = RoomPool::new(vec![Room::new(1, 1, 0, "A", 1), Room::new(2, 1, 2, "B", 1)]);
        let cost = CostModel::new(&m, MismatchCost::Excluded);
        let ps = [
            Participant::new(1, 0, "A"),
            Participant::new(2, 2, "A"),
            Participant::new(3, 1, "A"),
            Participant::new(4, 2, "A"),
            Participant::new(5, 0, "B"),
            Participant::new(6, 0, "C"),
        ];
        let order = district_priority_order(&ps, &pool, &cost);
        assert_eq!(ids(&order), vec![2, 4, 3, 1, 5]);
    }

    #[test]
    fn priority_order_serves_remote_district_first() {
        let m = line();
        // the single seat in district 1 should go to the participant in
        // district 2, who has nothing closer
        let mut pool = RoomPool::new(vec![Room::new(1, 1, 1, "A", 1), Room::new(2, 1, 0, "A", 1)]);
        let ps = [Participant::new(1, 0, "A"), Participant::new(2, 2, "A")];
        let out = GreedyAllocator::default()
            .allocate(&ps, &mut pool, CostModel::new(&m, MismatchCost::Excluded))
            .unwrap();
        assert_eq!(out.placements.len(), 2);
        assert_eq!(out.placements[0].participant, ParticipantId::new(2));
        assert_eq!(out.placements[0].room, 0);
        assert_eq!(out.placements[1].room, 1);
        assert_eq!(out.placements.iter().map(|p| p.distance).sum::<f64>(), 10.);
    }

    #[test]
    fn input_order_takes_nearest_first_come() {
        let m = line();
        let mut pool = RoomPool::new(vec![Room::new(1, 1, 1, "A", 1), Room::new(2, 1, 0, "A", 1)]);
        let ps = [Participant::new(1, 1, "A"), Participant::new(2, 1, "A")];
        let out = GreedyAllocator::new(ParticipantOrder::InputOrder)
            .allocate(&ps, &mut pool, CostModel::new(&m, MismatchCost::Excluded))
            .unwrap();
        assert_eq!(out.placements[0].participant, ParticipantId::new(1));
        assert_eq!(out.placements[0].distance, 0.);
        assert_eq!(out.placements[1].distance, 10.);
    }

    #[test]
    fn overflow_and_unknown_type_stay_unplaced() {
        let m = line();
        let pool = RoomPool::new(vec![Room::new(1, 1, 0, "A", 1)]);
        let ps = [
            Participant::new(1, 0, "A"),
            Participant::new(2, 0, "A"),
            Participant::new(3, 0, "B"),
        ];
        for order in [ParticipantOrder::DistrictPriority, ParticipantOrder::InputOrder] {
            let mut pool = pool.clone();
            let out = GreedyAllocator::new(order)
                .allocate(&ps, &mut pool, CostModel::new(&m, MismatchCost::Excluded))
                .unwrap();
            assert_eq!(out.placements.len(), 1);
            assert_eq!(pool.occupancy(0), 1);
        }
        assert_eq!(pool.occupancy(0), 0);
    }

    #[test]
    fn unreachable_rooms_are_skipped() {
        let m = line();
        let mut pool = RoomPool::new(vec![Room::new(1, 1, 42, "A", 4)]);
        let ps = [Participant::new(1, 0, "A")];
        let out = GreedyAllocator::default()
            .allocate(&ps, &mut pool, CostModel::new(&m, MismatchCost::Excluded))
            .unwrap();
        assert!(out.placements.is_empty());
    }
}
