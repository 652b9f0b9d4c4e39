use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Distance reported for any district pair the matrix does not track.
pub const UNREACHABLE_DISTANCE: f64 = 9_999_999.0;

/// Additive penalty applied to mismatched test types in penalized mode.
pub const MISMATCH_PENALTY: f64 = 10_000.0;

/// School and room id carried by fallback records.
pub const FALLBACK_ID: i64 = -2;

/// Distance carried by fallback records.
pub const FALLBACK_DISTANCE: f64 = 9_999.0;

macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[repr(transparent)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[inline]
            pub const fn new(id: i64) -> Self {
                $name(id)
            }

            #[inline]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                $name(value)
            }
        }
    };
}

define_id!(ParticipantId, "Participant");
define_id!(DistrictId, "District");
define_id!(SchoolId, "School");
define_id!(RoomId, "Room");

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestType(String);

impl TestType {
    pub fn new(name: impl Into<String>) -> Self {
        TestType(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestType {
    fn from(value: &str) -> Self {
        TestType(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    pub id: ParticipantId,
    pub district: DistrictId,
    pub test_type: TestType,
}

impl Participant {
    pub fn new(id: i64, district: i64, test_type: impl Into<TestType>) -> Self {
        Self {
            id: ParticipantId::new(id),
            district: DistrictId::new(district),
            test_type: test_type.into(),
        }
    }
}

/// A room flattened out of the district/school hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Room {
    pub id: RoomId,
    pub school: SchoolId,
    pub district: DistrictId,
    pub test_type: TestType,
    pub capacity: u32,
}

impl Room {
    pub fn new(
        id: i64,
        school: i64,
        district: i64,
        test_type: impl Into<TestType>,
        capacity: u32,
    ) -> Self {
        Self {
            id: RoomId::new(id),
            school: SchoolId::new(school),
            district: DistrictId::new(district),
            test_type: test_type.into(),
            capacity,
        }
    }

    #[inline]
    pub fn accepts(&self, test_type: &TestType) -> bool {
        &self.test_type == test_type
    }
}

/// One committed seat: `room` indexes into the `RoomPool` the allocator ran on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub participant: ParticipantId,
    pub room: usize,
    pub distance: f64,
}

/// Output row, placed or fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub participant_id: ParticipantId,
    pub district_id: DistrictId,
    pub school_id: SchoolId,
    pub room_id: RoomId,
    pub type_of_test: TestType,
    pub distance: f64,
}

impl AssignmentRecord {
    pub fn placed(participant: &Participant, room: &Room, distance: f64) -> Self {
        Self {
            participant_id: participant.id,
            district_id: room.district,
            school_id: room.school,
            room_id: room.id,
            type_of_test: participant.test_type.clone(),
            distance,
        }
    }

    pub fn fallback(participant: &Participant) -> Self {
        Self {
            participant_id: participant.id,
            district_id: participant.district,
            school_id: SchoolId::new(FALLBACK_ID),
            room_id: RoomId::new(FALLBACK_ID),
            type_of_test: participant.test_type.clone(),
            distance: FALLBACK_DISTANCE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.school_id.value() == FALLBACK_ID && self.room_id.value() == FALLBACK_ID
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fallback_record_uses_sentinels() {
        let p = Participant::new(7, 3, "B");
        let rec = AssignmentRecord::fallback(&p);
        assert!(rec.is_fallback());
        assert_eq!(rec.school_id.value(), -2);
        assert_eq!(rec.room_id.value(), -2);
        assert_eq!(rec.distance, 9999.);
        assert_eq!(rec.type_of_test, TestType::from("B"));
        assert_eq!(rec.district_id, DistrictId::new(3));
    }

    #[test]
    fn placed_record_reports_room_district() {
        let p = Participant::new(1, 0, "A");
        let room = Room::new(10, 20, 1, "A", 4);
        let rec = AssignmentRecord::placed(&p, &room, 100.);
        assert!(!rec.is_fallback());
        assert_eq!(rec.district_id, DistrictId::new(1));
        assert_eq!(rec.school_id, SchoolId::new(20));
        assert_eq!(rec.room_id, RoomId::new(10));
    }

    #[test]
    fn record_serializes_with_flat_ids() {
        let p = Participant::new(1, 0, "A");
        let room = Room::new(10, 20, 1, "A", 4);
        let json = serde_json::to_value(AssignmentRecord::placed(&p, &room, 100.)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "participant_id": 1,
                "district_id": 1,
                "school_id": 20,
                "room_id": 10,
                "type_of_test": "A",
                "distance": 100.0,
            })
        );
    }
}
