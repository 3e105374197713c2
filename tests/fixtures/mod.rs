//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use role_matchmaker::{
    CharacterRoster, CharacterTemplate, Player, PlayerFactory, PlayerId, RatingRange, Role,
    RoleQueues,
};
use std::sync::Arc;

/// Small roster with two characters per role
pub fn test_roster() -> CharacterRoster {
    let templates = vec![
        ("Johanna", Role::Tank),
        ("Muradin", Role::Tank),
        ("Alexstrasza", Role::Healer),
        ("Anduin", Role::Healer),
        ("Jaina", Role::Assassin),
        ("Raynor", Role::Assassin),
        ("Sonya", Role::Bruiser),
        ("Dehaka", Role::Bruiser),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, role))| CharacterTemplate {
        id: i as u32 + 1,
        name: name.to_string(),
        role,
    })
    .collect();

    CharacterRoster::from_templates(templates).expect("test roster is valid")
}

/// Factory over the test roster
pub fn test_factory() -> PlayerFactory {
    PlayerFactory::new(Arc::new(test_roster()), RatingRange::default())
}

/// Character id in the test roster for `role`
pub fn character_for(role: Role) -> u32 {
    match role {
        Role::Tank => 1,
        Role::Healer => 3,
        Role::Assassin => 5,
        Role::Bruiser => 7,
    }
}

/// Player built directly, bypassing the catalog
pub fn player(id: PlayerId, role: Role, mmr: u32) -> Player {
    Player {
        id,
        name: format!("{}-{}", role.as_str().to_lowercase(), id),
        role,
        mmr,
    }
}

/// Queues holding one player per entry of `roles`, ids starting at 1
pub fn queues_with(roles: &[Role], mmr: u32) -> RoleQueues {
    let mut queues = RoleQueues::new();
    for (i, &role) in roles.iter().enumerate() {
        queues.enqueue(player(i as PlayerId + 1, role, mmr));
    }
    queues
}

/// Ten roles that are enough for two teams
pub fn two_team_roles() -> Vec<Role> {
    vec![
        Role::Tank,
        Role::Tank,
        Role::Healer,
        Role::Healer,
        Role::Assassin,
        Role::Assassin,
        Role::Assassin,
        Role::Assassin,
        Role::Bruiser,
        Role::Bruiser,
    ]
}

/// Ids per role queue, front first
pub fn snapshot(queues: &RoleQueues) -> Vec<Vec<PlayerId>> {
    Role::ALL
        .iter()
        .map(|&role| queues.iter(role).map(|p| p.id).collect())
        .collect()
}
