use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    model::{AssignmentRecord, Participant, ParticipantId, Placement},
    pool::RoomPool,
};

/// Turns an allocator's placements into one record per participant.
///
/// Placed records come first in commit order, then a fallback record for
/// every participant without a placement, in input order. A placement whose
/// participant or room is unknown, or a second placement for the same
/// participant, is ignored.
pub fn resolve(
    participants: &[Participant],
    pool: &RoomPool,
    placements: &[Placement],
) -> Vec<AssignmentRecord> {
    let by_id: HashMap<ParticipantId, &Participant> =
        participants.iter().map(|p| (p.id, p)).collect();
    let mut placed: HashSet<ParticipantId> = HashSet::with_capacity(placements.len());
    let mut records = Vec::with_capacity(participants.len());

    for placement in placements {
        let (Some(participant), Some(room)) =
            (by_id.get(&placement.participant), pool.get(placement.room))
        else {
            continue;
        };
        if !placed.insert(participant.id) {
            continue;
        }
        records.push(AssignmentRecord::placed(participant, room, placement.distance));
    }

    let before = records.len();
    records.extend(
        participants
            .iter()
            .filter(|p| !placed.contains(&p.id))
            .map(AssignmentRecord::fallback),
    );
    debug!(fallback = records.len() - before, "fallback records emitted");
    records
}

/// Drops fallback records, for consumers that only want real seats.
pub fn retain_placed(records: Vec<AssignmentRecord>) -> Vec<AssignmentRecord> {
    records.into_iter().filter(|r| !r.is_fallback()).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Room, FALLBACK_DISTANCE};

    #[test]
    fn every_participant_gets_one_record() {
        let pool = RoomPool::new(vec![Room::new(5, 6, 1, "A", 2)]);
        let ps = [
            Participant::new(1, 0, "A"),
            Participant::new(2, 0, "A"),
            Participant::new(3, 0, "B"),
        ];
        let placements = [
            Placement {
                participant: ParticipantId::new(2),
                room: 0,
                distance: 100.,
            },
            // duplicate and dangling placements are ignored
            Placement {
                participant: ParticipantId::new(2),
                room: 0,
                distance: 100.,
            },
            Placement {
                participant: ParticipantId::new(9),
                room: 0,
                distance: 1.,
            },
            Placement {
                participant: ParticipantId::new(1),
                room: 4,
                distance: 1.,
            },
        ];
        let records = resolve(&ps, &pool, &placements);
        let ids: Vec<i64> = records.iter().map(|r| r.participant_id.value()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert!(!records[0].is_fallback());
        assert!(records[1].is_fallback() && records[2].is_fallback());
        assert_eq!(records[2].distance, FALLBACK_DISTANCE);

        let kept = retain_placed(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].room_id.value(), 5);
    }
}
