use seat_alloc::{
    allocate, AllocationConfig, DistanceMatrix, DistrictId, Participant, Problem, Room,
    StrategyKind,
};

const DISTRICTS: usize = 16;
const PARTICIPANTS: i64 = 120;
const N: usize = 10;

fn main() -> seat_alloc::Result<()> {
    let mut totals = [0.; 2];
    for _ in 0..N {
        let raw = nalgebra::DMatrix::<f64>::new_random(DISTRICTS, DISTRICTS) * 1_000.;
        let values = nalgebra::DMatrix::from_fn(DISTRICTS, DISTRICTS, |r, c| {
            if r == c {
                0.
            } else {
                raw[(r.min(c), r.max(c))].round()
            }
        });
        let distances =
            DistanceMatrix::new((0..DISTRICTS as i64).map(DistrictId::new).collect(), values)?;

        let rooms = (0..DISTRICTS as i64)
            .flat_map(|d| {
                [
                    Room::new(2 * d, d, d, "A", 4),
                    Room::new(2 * d + 1, d, d, "B", 3),
                ]
            })
            .collect();
        let participants = (0..PARTICIPANTS)
            .map(|i| {
                let district = (i * 7) % DISTRICTS as i64;
                Participant::new(i, district, if i % 3 == 0 { "B" } else { "A" })
            })
            .collect();
        let problem = Problem::new(participants, rooms, distances)?;

        for (i, strategy) in [StrategyKind::Optimal, StrategyKind::Greedy].into_iter().enumerate() {
            let report = allocate(&problem, &AllocationConfig::default().with_strategy(strategy))?;
            totals[i] += report.summary.total_distance;
        }
    }

    println!("optimal total: {}", totals[0]);
    println!("greedy total: {}", totals[1]);
    Ok(())
}
