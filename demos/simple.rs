use seat_alloc::{
    allocate, AllocationConfig, DistanceMatrix, Participant, Problem, Room, StrategyKind,
};

fn main() -> seat_alloc::Result<()> {
    let distances = DistanceMatrix::from_rows(&[0, 1], &[&[0., 100.], &[100., 0.]])?;
    let problem = Problem::new(
        vec![
            Participant::new(1, 0, "A"),
            Participant::new(2, 0, "A"),
            Participant::new(3, 1, "B"),
        ],
        vec![Room::new(1, 10, 1, "A", 1), Room::new(2, 10, 1, "B", 4)],
        distances,
    )?;

    for strategy in [StrategyKind::Optimal, StrategyKind::Greedy] {
        let report = allocate(&problem, &AllocationConfig::default().with_strategy(strategy))?;
        println!("{}:", report.strategy);
        for r in &report.records {
            println!(
                "  {} -> school {} room {} ({}), distance {}",
                r.participant_id,
                r.school_id.value(),
                r.room_id.value(),
                r.type_of_test,
                r.distance
            );
        }
    }
    Ok(())
}
