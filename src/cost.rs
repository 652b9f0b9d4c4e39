use serde::{Deserialize, Serialize};

use crate::{
    distance::DistanceProvider,
    model::{DistrictId, Participant, UNREACHABLE_DISTANCE},
    pool::RoomPool,
};

/// Pricing of a participant/room pair whose test types differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchCost {
    /// Distance plus a fixed addend. Mismatches stay visible to the matcher
    /// but are never committed.
    Penalized(f64),
    /// Mismatches cost `+inf` and never enter a matching.
    #[default]
    Excluded,
}

#[derive(Debug)]
pub struct CostModel<'a, D: ?Sized> {
    distances: &'a D,
    mismatch: MismatchCost,
}

impl<D: ?Sized> Clone for CostModel<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for CostModel<'_, D> {}

impl<'a, D> CostModel<'a, D>
where
    D: DistanceProvider + ?Sized,
{
    pub fn new(distances: &'a D, mismatch: MismatchCost) -> Self {
        Self {
            distances,
            mismatch,
        }
    }

    pub fn with_mismatch(self, mismatch: MismatchCost) -> Self {
        Self { mismatch, ..self }
    }

    pub fn mismatch(&self) -> MismatchCost {
        self.mismatch
    }

    #[inline]
    pub fn distance(&self, from: DistrictId, to: DistrictId) -> f64 {
        self.distances.distance(from, to)
    }

    /// Cost of seating `participant` in the room at `slot`.
    ///
    /// Full (or unknown) rooms cost `+inf`. Compatible rooms cost the
    /// district distance.
    pub fn cost(&self, participant: &Participant, pool: &RoomPool, slot: usize) -> f64 {
        let Some(room) = pool.get(slot) else {
            return f64::INFINITY;
        };
        if !pool.has_capacity(slot) {
            return f64::INFINITY;
        }
        let d = self.distance(participant.district, room.district);
        if room.accepts(&participant.test_type) {
            return d;
        }
        match self.mismatch {
            MismatchCost::Penalized(penalty) => d + penalty,
            MismatchCost::Excluded => f64::INFINITY,
        }
    }
}

/// Whether a cost is low enough to ever be committed.
#[inline]
pub fn is_committable(cost: f64) -> bool {
    cost < UNREACHABLE_DISTANCE
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        distance::DistanceMatrix,
        model::{Room, MISMATCH_PENALTY},
    };

    fn fixture() -> (DistanceMatrix, RoomPool) {
        let m = DistanceMatrix::from_rows(&[0, 1], &[&[0., 100.], &[100., 0.]]).unwrap();
        let pool = RoomPool::new(vec![
            Room::new(1, 1, 1, "A", 1),
            Room::new(2, 1, 1, "B", 1),
            Room::new(3, 2, 5, "A", 1),
        ]);
        (m, pool)
    }

    #[test]
    fn compatible_cost_is_distance() {
        let (m, pool) = fixture();
        let cost = CostModel::new(&m, MismatchCost::Excluded);
        assert_eq!(cost.cost(&Participant::new(1, 0, "A"), &pool, 0), 100.);
    }

    #[test]
    fn mismatch_policies() {
        let (m, pool) = fixture();
        let p = Participant::new(1, 0, "A");
        let penalized = CostModel::new(&m, MismatchCost::Penalized(MISMATCH_PENALTY));
        assert_eq!(penalized.cost(&p, &pool, 1), 10_100.);
        assert!(is_committable(penalized.cost(&p, &pool, 1)));
        let excluded = penalized.with_mismatch(MismatchCost::Excluded);
        assert_eq!(excluded.cost(&p, &pool, 1), f64::INFINITY);
    }

    #[test]
    fn full_room_is_infinite() {
        let (m, mut pool) = fixture();
        pool.occupy(0).unwrap();
        let cost = CostModel::new(&m, MismatchCost::Penalized(MISMATCH_PENALTY));
        assert_eq!(cost.cost(&Participant::new(1, 0, "A"), &pool, 0), f64::INFINITY);
        assert_eq!(cost.cost(&Participant::new(1, 0, "A"), &pool, 42), f64::INFINITY);
    }

    #[test]
    fn untracked_district_is_not_committable() {
        let (m, pool) = fixture();
        let cost = CostModel::new(&m, MismatchCost::Excluded);
        let c = cost.cost(&Participant::new(1, 0, "A"), &pool, 2);
        assert_eq!(c, UNREACHABLE_DISTANCE);
        assert!(!is_committable(c));
    }
}
