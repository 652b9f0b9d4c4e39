use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    model::{DistrictId, Room, RoomId, SchoolId, TestType},
};

/// Rooms plus their running occupancy for one allocation run.
///
/// Rooms are addressed by their slot in the pool, which stays stable for the
/// life of the pool. Capacity never changes; [`RoomPool::occupy`] is the only
/// way occupancy moves, and it only moves up.
#[derive(Debug, Clone)]
pub struct RoomPool {
    rooms: Vec<Room>,
    occupancy: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomOccupancy {
    pub room_id: RoomId,
    pub school_id: SchoolId,
    pub district_id: DistrictId,
    pub type_of_test: TestType,
    pub capacity: u32,
    pub occupancy: u32,
}

impl RoomPool {
    pub fn new(rooms: Vec<Room>) -> Self {
        let occupancy = vec![0; rooms.len()];
        Self { rooms, occupancy }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn get(&self, slot: usize) -> Option<&Room> {
        self.rooms.get(slot)
    }

    pub fn occupancy(&self, slot: usize) -> u32 {
        self.occupancy.get(slot).copied().unwrap_or(0)
    }

    pub fn remaining(&self, slot: usize) -> u32 {
        match self.rooms.get(slot) {
            Some(room) => room.capacity - self.occupancy[slot],
            None => 0,
        }
    }

    #[inline]
    pub fn has_capacity(&self, slot: usize) -> bool {
        self.remaining(slot) > 0
    }

    pub fn is_compatible(&self, slot: usize, test_type: &TestType) -> bool {
        self.rooms.get(slot).is_some_and(|r| r.accepts(test_type))
    }

    /// Takes one seat in the room at `slot`.
    pub fn occupy(&mut self, slot: usize) -> Result<()> {
        let room = self.rooms.get(slot).ok_or(Error::UnknownRoom(slot))?;
        let taken = &mut self.occupancy[slot];
        if *taken >= room.capacity {
            return Err(Error::RoomFull(slot));
        }
        *taken += 1;
        Ok(())
    }

    /// Slots that still have at least one free seat, in pool order.
    pub fn open_rooms(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.rooms.len()).filter(|&slot| self.has_capacity(slot))
    }

    /// Slots accepting `test_type`, in pool order, full or not.
    pub fn rooms_for<'a>(&'a self, test_type: &'a TestType) -> impl Iterator<Item = usize> + 'a {
        self.rooms
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.accepts(test_type))
            .map(|(slot, _)| slot)
    }

    /// Distinct test types in order of first appearance.
    pub fn test_types(&self) -> Vec<TestType> {
        let mut types: Vec<TestType> = Vec::new();
        for room in &self.rooms {
            if !types.contains(&room.test_type) {
                types.push(room.test_type.clone());
            }
        }
        types
    }

    pub fn districts_offering(&self, test_type: &TestType) -> BTreeSet<DistrictId> {
        self.rooms
            .iter()
            .filter(|r| r.accepts(test_type))
            .map(|r| r.district)
            .collect()
    }

    pub fn total_remaining(&self) -> u64 {
        (0..self.rooms.len()).map(|s| self.remaining(s) as u64).sum()
    }

    pub fn occupancy_report(&self) -> Vec<RoomOccupancy> {
        self.rooms
            .iter()
            .zip(&self.occupancy)
            .map(|(r, &occupancy)| RoomOccupancy {
                room_id: r.id,
                school_id: r.school,
                district_id: r.district,
                type_of_test: r.test_type.clone(),
                capacity: r.capacity,
                occupancy,
            })
            .collect()
    }
}
