//! Property tests for queue restoration after failed formation attempts

mod fixtures;

use proptest::prelude::*;
use role_matchmaker::{FormationConfig, FormationEngine, Role, RoleQueues};

use fixtures::{player, snapshot};

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Tank),
        Just(Role::Healer),
        Just(Role::Assassin),
        Just(Role::Bruiser),
    ]
}

fn queued(entries: &[(Role, u32)]) -> RoleQueues {
    let mut queues = RoleQueues::new();
    for (i, &(role, mmr)) in entries.iter().enumerate() {
        queues.enqueue(player(i as u64 + 1, role, mmr));
    }
    queues
}

proptest! {
    #[test]
    fn failed_team_leaves_queues_untouched(
        entries in prop::collection::vec((role_strategy(), 1500u32..=3500), 0..20),
        overflow in any::<bool>(),
    ) {
        let config = if overflow {
            FormationConfig::with_overflow_flex()
        } else {
            FormationConfig::default()
        };
        let engine = FormationEngine::new(config).unwrap();
        let mut queues = queued(&entries);
        let before = snapshot(&queues);
        let total = queues.total_count();

        match engine.form_team(&mut queues) {
            Ok(team) => {
                prop_assert_eq!(team.len(), 5);
                prop_assert_eq!(team.count_role(Role::Tank) >= 1, true);
                prop_assert_eq!(team.count_role(Role::Healer) >= 1, true);
                prop_assert_eq!(queues.total_count(), total - 5);
            }
            Err(_) => {
                prop_assert_eq!(snapshot(&queues), before);
                prop_assert_eq!(queues.total_count(), total);
            }
        }
    }

    #[test]
    fn failed_match_leaves_queues_untouched(
        entries in prop::collection::vec((role_strategy(), 1500u32..=3500), 0..30),
    ) {
        let engine = FormationEngine::default();
        let mut queues = queued(&entries);
        let before = snapshot(&queues);
        let total = queues.total_count();

        match engine.try_create_match(&mut queues) {
            Ok(game) => {
                prop_assert_eq!(game.player_count(), 10);
                prop_assert!(game.mmr_gap() <= 100.0);
                prop_assert_eq!(queues.total_count(), total - 10);
            }
            Err(_) => {
                prop_assert_eq!(snapshot(&queues), before);
                prop_assert_eq!(queues.total_count(), total);
            }
        }
    }

    #[test]
    fn requeue_restores_dequeued_prefix(
        entries in prop::collection::vec((role_strategy(), 1500u32..=3500), 1..20),
        take in 0usize..10,
        role in role_strategy(),
    ) {
        let mut queues = queued(&entries);
        let before = snapshot(&queues);

        let mut taken = Vec::new();
        for _ in 0..take {
            match queues.dequeue_front(role) {
                Some(p) => taken.push(p),
                None => break,
            }
        }
        queues.requeue_front(taken);

        prop_assert_eq!(snapshot(&queues), before);
    }
}
