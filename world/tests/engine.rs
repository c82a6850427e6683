use std::{sync::Arc, thread};

use maze_patrol_core::{
    CellKind, Command, DamageSource, Direction, Event, GameOutcome, Grid, HostileId, HostileKind,
    Position, Rules,
};
use maze_patrol_world::{self as world, query, SharedWorld, World};

fn grid_from(rows: &[&str]) -> Arc<Grid> {
    let rows = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|glyph| match glyph {
                    '#' => CellKind::Wall,
                    'S' => CellKind::Start,
                    'E' => CellKind::End,
                    '^' => CellKind::Hazard,
                    's' => CellKind::SpiderSpawn,
                    'f' => CellKind::FlySpawn,
                    _ => CellKind::Empty,
                })
                .collect()
        })
        .collect();
    Arc::new(Grid::from_rows(rows).expect("valid test grid"))
}

fn world_from(rows: &[&str]) -> World {
    World::new(grid_from(rows), Rules::default()).expect("valid test world")
}

fn pillar_field_world() -> World {
    world_from(&["S....", ".....", "..#..", ".....", "....E"])
}

#[test]
fn can_move_matches_bounds_walls_and_liveness() {
    let world = pillar_field_world();
    let grid = Arc::clone(query::grid(&world));

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let position = Position::new(x, y);
            for direction in Direction::ALL {
                let expected = position
                    .step(direction)
                    .and_then(|target| grid.cell_at(target).ok())
                    .map_or(false, |kind| kind != CellKind::Wall);
                assert_eq!(
                    world.can_move(position, direction),
                    expected,
                    "can_move({position}, {direction:?})"
                );
            }
        }
    }
}

#[test]
fn nothing_moves_while_the_player_is_dead() {
    let mut world = pillar_field_world();
    let mut events = Vec::new();
    world.apply_damage(10, DamageSource::Hazard, &mut events);

    for direction in Direction::ALL {
        assert!(!world.can_move(Position::new(1, 1), direction));
    }
    assert!(!query::player(&world).is_alive());
}

#[test]
fn zero_health_is_not_alive() {
    let mut world = pillar_field_world();
    let mut events = Vec::new();

    world.apply_damage(9, DamageSource::Hazard, &mut events);
    assert!(query::player(&world).is_alive());

    world.apply_damage(1, DamageSource::Hazard, &mut events);
    let player = query::player(&world);
    assert_eq!(player.health, 0);
    assert!(!player.is_alive());
}

#[test]
fn blocked_player_move_is_a_no_op() {
    let mut world = world_from(&["S#", ".."]);
    let mut events = Vec::new();

    world.move_player(Direction::Right, &mut events);
    world.move_player(Direction::Up, &mut events);
    world.move_player(Direction::Left, &mut events);

    assert!(events.is_empty());
    assert_eq!(query::player(&world).position, Position::new(0, 0));
}

#[test]
fn player_move_changes_position_by_one_cell() {
    let mut world = pillar_field_world();
    let mut events = Vec::new();

    assert!(world.can_move(Position::new(0, 0), Direction::Right));
    world.move_player(Direction::Right, &mut events);

    assert_eq!(query::player(&world).position, Position::new(1, 0));
    assert_eq!(
        events,
        vec![Event::PlayerMoved {
            from: Position::new(0, 0),
            to: Position::new(1, 0),
        }]
    );
}

#[test]
fn player_walks_around_the_pillar_to_the_exit() {
    let mut world = pillar_field_world();
    let mut events = Vec::new();

    assert!(world.can_move(Position::new(0, 0), Direction::Right));
    for _ in 0..4 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::Right,
            },
            &mut events,
        );
    }
    for _ in 0..4 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::Down,
            },
            &mut events,
        );
    }

    assert_eq!(query::player(&world).position, Position::new(4, 4));
    assert!(world.is_player_at_exit());
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            outcome: GameOutcome::Won
        })
    );
}

#[test]
fn hazard_costs_exactly_its_damage() {
    let mut world = world_from(&["S^."]);
    let mut events = Vec::new();

    world.move_player(Direction::Right, &mut events);

    let player = query::player(&world);
    assert_eq!(player.health, 8);
    assert!(player.is_alive());
    assert_eq!(
        events,
        vec![
            Event::PlayerMoved {
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            },
            Event::PlayerDamaged {
                amount: 2,
                health: 8,
                source: DamageSource::Hazard,
            },
        ]
    );
}

#[test]
fn hazard_hurts_once_per_entry() {
    let mut world = world_from(&["S^."]);
    let mut events = Vec::new();

    world.move_player(Direction::Right, &mut events);
    world.move_player(Direction::Right, &mut events);
    world.move_player(Direction::Left, &mut events);

    assert_eq!(query::player(&world).health, 6);
}

#[test]
fn racing_contact_checks_do_not_double_count() {
    let shared = SharedWorld::new(world_from(&["Ss", "#f"]));
    let spider = HostileId::new(0);
    let fly = HostileId::new(1);

    let _ = shared.apply(Command::MovePlayer {
        direction: Direction::Right,
    });
    let _ = shared.apply(Command::StepHostile { hostile: fly });
    assert_eq!(
        shared.read(|world| query::hostile(world, fly).map(|hostile| hostile.position)),
        Some(Position::new(1, 0))
    );
    assert_eq!(shared.read(|world| world.check_contact()), Some(spider));

    let contenders: Vec<_> = [spider, fly]
        .into_iter()
        .map(|hostile| {
            let shared = shared.clone();
            thread::spawn(move || shared.apply(Command::ResolveContact { hostile }))
        })
        .collect();

    let damage: Vec<Event> = contenders
        .into_iter()
        .flat_map(|handle| handle.join().expect("contender panicked"))
        .filter(|event| matches!(event, Event::PlayerDamaged { .. }))
        .collect();

    assert_eq!(
        damage,
        vec![Event::PlayerDamaged {
            amount: 5,
            health: 5,
            source: DamageSource::Hostile(spider),
        }]
    );
    assert_eq!(shared.read(|world| query::player(world).health), 5);
}

#[test]
fn contact_only_counts_the_first_hostile_on_the_cell() {
    let mut world = world_from(&["Ssf"]);
    let mut events = Vec::new();

    world.move_player(Direction::Right, &mut events);
    assert_eq!(world.check_contact(), Some(HostileId::new(0)));

    world::apply(
        &mut world,
        Command::ResolveContact {
            hostile: HostileId::new(1),
        },
        &mut events,
    );
    assert_eq!(query::player(&world).health, 10);

    world::apply(
        &mut world,
        Command::ResolveContact {
            hostile: HostileId::new(0),
        },
        &mut events,
    );
    assert_eq!(query::player(&world).health, 5);
}

#[test]
fn check_contact_requires_exact_position_match() {
    let world = world_from(&["S.s", "...", "f.."]);
    assert_eq!(world.check_contact(), None);
}

#[test]
fn reset_restores_start_and_health() {
    let mut world = world_from(&["S^^^.E"]);
    let mut events = Vec::new();

    for _ in 0..3 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::Right,
            },
            &mut events,
        );
    }
    assert_eq!(query::player(&world).health, 4);

    world::apply(&mut world, Command::Reset, &mut events);

    let player = query::player(&world);
    assert_eq!(player.position, query::start(&world));
    assert_eq!(player.health, player.max_health);
    assert_eq!(events.last(), Some(&Event::GameReset));
}

#[test]
fn blocked_hostile_turns_without_moving() {
    let mut world = world_from(&["#s.", "S.."]);
    let hostile = HostileId::new(0);
    let mut events = Vec::new();

    world.move_hostile(hostile, &mut events);

    let snapshot = query::hostile(&world, hostile).expect("hostile exists");
    assert_eq!(snapshot.position, Position::new(1, 0));
    assert_eq!(snapshot.direction, Direction::Right);
    assert_eq!(
        events,
        vec![Event::HostileTurned {
            hostile,
            direction: Direction::Right,
        }]
    );
}

#[test]
fn hostile_direction_persists_until_the_next_obstacle() {
    let mut world = world_from(&["#s..#", "S...."]);
    let hostile = HostileId::new(0);
    let mut events = Vec::new();
    let mut trail = Vec::new();

    for _ in 0..8 {
        world.move_hostile(hostile, &mut events);
        let snapshot = query::hostile(&world, hostile).expect("hostile exists");
        trail.push((snapshot.position.x(), snapshot.direction));
    }

    assert_eq!(
        trail,
        vec![
            (1, Direction::Right),
            (2, Direction::Right),
            (3, Direction::Right),
            (3, Direction::Left),
            (2, Direction::Left),
            (1, Direction::Left),
            (1, Direction::Right),
            (2, Direction::Right),
        ]
    );
}

#[test]
fn flies_patrol_vertically_between_walls() {
    let mut world = world_from(&["S#", ".f", ".#"]);
    let hostile = HostileId::new(0);
    let mut events = Vec::new();

    world.move_hostile(hostile, &mut events);
    world.move_hostile(hostile, &mut events);

    let snapshot = query::hostile(&world, hostile).expect("hostile exists");
    assert_eq!(snapshot.kind, HostileKind::Fly);
    assert_eq!(snapshot.position, Position::new(1, 1));
    assert_eq!(snapshot.direction, Direction::Up);
    assert_eq!(
        events,
        vec![
            Event::HostileTurned {
                hostile,
                direction: Direction::Down,
            },
            Event::HostileTurned {
                hostile,
                direction: Direction::Up,
            },
        ]
    );
}

#[test]
fn game_over_is_reported_once_and_gates_intents() {
    let mut world = world_from(&["S^^^^^."]);
    let mut events = Vec::new();

    for _ in 0..6 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::Right,
            },
            &mut events,
        );
    }

    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
    assert!(query::awaiting_acknowledgement(&world));
    assert_eq!(query::player(&world).position, Position::new(5, 0));
    assert_eq!(query::player(&world).health, 0);

    world::apply(&mut world, Command::Reset, &mut events);
    assert!(!query::awaiting_acknowledgement(&world));

    events.clear();
    world::apply(
        &mut world,
        Command::MovePlayer {
            direction: Direction::Right,
        },
        &mut events,
    );
    assert_eq!(query::player(&world).position, Position::new(1, 0));
}

#[test]
fn intents_are_ignored_after_winning_until_reset() {
    let mut world = world_from(&["SE."]);
    let mut events = Vec::new();
    let right = Command::MovePlayer {
        direction: Direction::Right,
    };

    world::apply(&mut world, right, &mut events);
    world::apply(&mut world, right, &mut events);

    assert_eq!(query::player(&world).position, Position::new(1, 0));
    assert!(query::awaiting_acknowledgement(&world));
}

#[test]
fn reset_sends_hostiles_back_to_spawn() {
    let mut world = world_from(&["Ss...."]);
    let hostile = HostileId::new(0);
    let mut events = Vec::new();

    for _ in 0..4 {
        world.move_hostile(hostile, &mut events);
    }
    let moved = query::hostile(&world, hostile).expect("hostile exists");
    assert_ne!(moved.position, Position::new(1, 0));

    world.reset(&mut events);

    let snapshot = query::hostile(&world, hostile).expect("hostile exists");
    assert_eq!(snapshot.position, Position::new(1, 0));
    assert_eq!(snapshot.direction, Direction::Left);
}

#[test]
fn concurrent_damage_is_never_lost() {
    let rules = Rules {
        max_health: 1_000,
        ..Rules::default()
    };
    let shared = SharedWorld::new(World::new(grid_from(&["S."]), rules).expect("valid world"));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    shared.update(|world| {
                        let mut events = Vec::new();
                        world.apply_damage(1, DamageSource::Hazard, &mut events);
                    });
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    assert_eq!(shared.read(|world| query::player(world).health), 600);
}
