//! Loading the three input files and writing results.
//!
//! Participants and the district/school/room hierarchy are JSON; the
//! distance table is CSV. The hierarchy is flattened into a plain room list
//! here so nothing downstream depends on its shape.

use std::path::Path;

use serde::Deserialize;

use crate::{
    distance::{DistanceMatrix, DistrictLabels},
    engine::Problem,
    error::{Error, Result},
    model::{AssignmentRecord, Participant, Room, RoomId, SchoolId, TestType},
};

/// Test types arrive as strings or bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTestType {
    Text(String),
    Number(i64),
}

impl From<RawTestType> for TestType {
    fn from(value: RawTestType) -> Self {
        match value {
            RawTestType::Text(s) => TestType::new(s),
            RawTestType::Number(n) => TestType::new(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ParticipantRecord {
    id: i64,
    district_id: i64,
    type_of_test: RawTestType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistrictSpec {
    pub id: i64,
    pub schools: Vec<SchoolSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchoolSpec {
    pub id: i64,
    pub rooms: Vec<RoomSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomSpec {
    pub id: i64,
    type_of_test: RawTestType,
    pub capacity: i64,
}

impl RoomSpec {
    pub fn test_type(&self) -> TestType {
        self.type_of_test.clone().into()
    }
}

pub fn parse_participants(json: &str) -> Result<Vec<Participant>> {
    let raw: Vec<ParticipantRecord> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|r| Participant::new(r.id, r.district_id, r.type_of_test))
        .collect())
}

pub fn parse_districts(json: &str) -> Result<Vec<DistrictSpec>> {
    Ok(serde_json::from_str(json)?)
}

/// One pass over district -> school -> room.
pub fn flatten_rooms(districts: &[DistrictSpec]) -> Result<Vec<Room>> {
    let mut rooms = Vec::new();
    for district in districts {
        for school in &district.schools {
            for spec in &school.rooms {
                let room = RoomId::new(spec.id);
                let school_id = SchoolId::new(school.id);
                let capacity = match u32::try_from(spec.capacity) {
                    Ok(c) => c,
                    Err(_) if spec.capacity < 0 => {
                        return Err(Error::NegativeCapacity {
                            room,
                            school: school_id,
                            capacity: spec.capacity,
                        })
                    }
                    Err(_) => {
                        return Err(Error::CapacityOverflow {
                            room,
                            school: school_id,
                            capacity: spec.capacity,
                        })
                    }
                };
                rooms.push(Room::new(
                    spec.id,
                    school.id,
                    district.id,
                    spec.test_type(),
                    capacity,
                ));
            }
        }
    }
    Ok(rooms)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_participants(path: impl AsRef<Path>) -> Result<Vec<Participant>> {
    parse_participants(&read(path.as_ref())?)
}

pub fn read_rooms(path: impl AsRef<Path>) -> Result<Vec<Room>> {
    flatten_rooms(&parse_districts(&read(path.as_ref())?)?)
}

pub fn read_distance_matrix(path: impl AsRef<Path>, labels: DistrictLabels) -> Result<DistanceMatrix> {
    DistanceMatrix::from_csv_str(&read(path.as_ref())?, labels)
}

pub fn load_problem(
    participants: impl AsRef<Path>,
    districts: impl AsRef<Path>,
    distances: impl AsRef<Path>,
    labels: DistrictLabels,
) -> Result<Problem> {
    Problem::new(
        read_participants(participants)?,
        read_rooms(districts)?,
        read_distance_matrix(distances, labels)?,
    )
}

pub fn records_to_json(records: &[AssignmentRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn write_records(path: impl AsRef<Path>, records: &[AssignmentRecord]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, records_to_json(records)?).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
