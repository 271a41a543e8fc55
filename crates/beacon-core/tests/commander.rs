mod common;

use beacon_core::{Commander, CoordinationConfig, Role, RoundContext};
use beacon_protocol::{GridPos, Message, UnitKind};
use common::{registry, ScriptedEnv};

fn sighted(unit_kind: UnitKind, x: i32, y: i32) -> Message {
    Message::EnemySighted {
        unit_kind,
        position: GridPos::new(x, y),
    }
}

#[test]
fn dispatches_highest_priority_target_first() {
    let registry = registry();
    let mut commander = Commander::new(0u64, &CoordinationConfig::default());
    let mut env = ScriptedEnv::at(GridPos::ORIGIN);
    env.broadcast(&registry, 5, GridPos::new(2, 2), sighted(UnitKind::Soldier, 4, 4));
    env.broadcast(&registry, 6, GridPos::new(-2, 1), sighted(UnitKind::Tower, -3, 2));

    let report = commander
        .step(&RoundContext::new(1), &registry, &mut env)
        .unwrap();

    assert_eq!(report.role, Role::Commander);
    assert_eq!(report.accepted, 2);
    assert_eq!(
        env.sent(&registry),
        Message::AttackAssignment {
            target: GridPos::new(-3, 2)
        }
    );
    let queued: Vec<_> = commander.targets().iter().map(|t| t.position()).collect();
    assert_eq!(queued, vec![GridPos::new(4, 4)]);
    assert!(!report.moved);
}

#[test]
fn each_latched_report_is_applied_once() {
    let registry = registry();
    let config = CoordinationConfig::default();
    let hold = u64::from(config.hold_rounds());
    let mut commander = Commander::new(0u64, &config);
    let mut env = ScriptedEnv::at(GridPos::ORIGIN);
    env.broadcast(&registry, 5, GridPos::new(1, 0), sighted(UnitKind::Worker, 2, 0));

    let mut sent = Vec::new();
    for round in 1..=2 * hold {
        commander
            .step(&RoundContext::new(round), &registry, &mut env)
            .unwrap();
        sent.push(env.sent(&registry));
    }

    let attack = Message::AttackAssignment {
        target: GridPos::new(2, 0),
    };
    assert!(sent[..hold as usize].iter().all(|m| *m == attack));
    assert_eq!(
        sent[hold as usize],
        Message::PatrolAssignment {
            outbound_direction_degrees: 0
        }
    );
    assert!(commander.targets().is_empty());
}

#[test]
fn missing_report_retracts_queued_target() {
    let registry = registry();
    let mut commander = Commander::new(0u64, &CoordinationConfig::default());
    let mut env = ScriptedEnv::at(GridPos::ORIGIN);

    commander
        .step(&RoundContext::new(1), &registry, &mut env)
        .unwrap();
    assert_eq!(
        env.sent(&registry),
        Message::PatrolAssignment {
            outbound_direction_degrees: 0
        }
    );

    env.broadcast(&registry, 5, GridPos::new(1, 0), sighted(UnitKind::Scout, 3, 3));
    commander
        .step(&RoundContext::new(2), &registry, &mut env)
        .unwrap();
    assert_eq!(commander.targets().len(), 1);

    env.broadcast(
        &registry,
        5,
        GridPos::new(1, 0),
        Message::TargetMissing {
            position: GridPos::new(3, 3),
        },
    );
    commander
        .step(&RoundContext::new(3), &registry, &mut env)
        .unwrap();
    assert!(commander.targets().is_empty());

    commander
        .step(&RoundContext::new(4), &registry, &mut env)
        .unwrap();
    assert_eq!(
        env.sent(&registry),
        Message::PatrolAssignment {
            outbound_direction_degrees: 45
        }
    );
}

#[test]
fn base_sightings_do_not_queue_targets() {
    let registry = registry();
    let mut commander = Commander::new(0u64, &CoordinationConfig::default());
    let mut env = ScriptedEnv::at(GridPos::ORIGIN);
    env.broadcast(
        &registry,
        5,
        GridPos::new(1, 0),
        Message::BaseSighted {
            position: GridPos::new(6, 6),
        },
    );
    commander
        .step(&RoundContext::new(1), &registry, &mut env)
        .unwrap();
    assert!(commander.targets().is_empty());
}
