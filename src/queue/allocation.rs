//! Transactional removal of players from the queues
//!
//! An `Allocation` records every player it takes, in order. Committing hands
//! the players to the caller for good. Dropping it without a commit puts
//! them all back where they were. Savepoints let a nested step (one team
//! inside a match) undo only its own suffix of the buffer.

use crate::queue::store::RoleQueues;
use crate::types::{Player, Role};
use tracing::trace;

/// Position in an allocation's buffer that can be rolled back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint(usize);

/// Players taken from `RoleQueues` but not yet committed
#[derive(Debug)]
pub struct Allocation<'a> {
    queues: &'a mut RoleQueues,
    taken: Vec<Player>,
}

impl<'a> Allocation<'a> {
    pub fn begin(queues: &'a mut RoleQueues) -> Self {
        Self {
            queues,
            taken: Vec::new(),
        }
    }

    /// Queues as they currently stand, without the taken players
    pub fn queues(&self) -> &RoleQueues {
        self.queues
    }

    /// Move the front player of `role` into the allocation
    pub fn take(&mut self, role: Role) -> Option<&Player> {
        let player = self.queues.dequeue_front(role)?;
        self.taken.push(player);
        self.taken.last()
    }

    /// Players taken so far, in the order they were taken
    pub fn taken(&self) -> &[Player] {
        &self.taken
    }

    pub fn savepoint(&self) -> Savepoint {
        Savepoint(self.taken.len())
    }

    /// Players taken after `savepoint`
    pub fn since(&self, savepoint: Savepoint) -> &[Player] {
        &self.taken[savepoint.0.min(self.taken.len())..]
    }

    /// Return everything taken after `savepoint` to the queues
    pub fn rollback_to(&mut self, savepoint: Savepoint) {
        if savepoint.0 >= self.taken.len() {
            return;
        }
        let undone = self.taken.split_off(savepoint.0);
        trace!("Rolling back {} players", undone.len());
        self.queues.requeue_front(undone);
    }

    /// Keep every taken player; they no longer belong to any queue
    pub fn commit(mut self) -> Vec<Player> {
        std::mem::take(&mut self.taken)
    }
}

impl Drop for Allocation<'_> {
    fn drop(&mut self) {
        if !self.taken.is_empty() {
            let undone = std::mem::take(&mut self.taken);
            trace!("Allocation dropped, returning {} players", undone.len());
            self.queues.requeue_front(undone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerId;

    fn player(id: PlayerId, role: Role) -> Player {
        Player {
            id,
            name: format!("player{}", id),
            role,
            mmr: 2000,
        }
    }

    fn filled_queues() -> RoleQueues {
        let mut queues = RoleQueues::new();
        queues.enqueue(player(1, Role::Tank));
        queues.enqueue(player(2, Role::Healer));
        queues.enqueue(player(3, Role::Assassin));
        queues.enqueue(player(4, Role::Assassin));
        queues.enqueue(player(5, Role::Tank));
        queues
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut queues = filled_queues();
        let before = queues.clone();

        {
            let mut allocation = Allocation::begin(&mut queues);
            assert_eq!(allocation.take(Role::Tank).map(|p| p.id), Some(1));
            assert_eq!(allocation.take(Role::Assassin).map(|p| p.id), Some(3));
            assert_eq!(allocation.take(Role::Tank).map(|p| p.id), Some(5));
            assert!(allocation.take(Role::Bruiser).is_none());
            assert_eq!(allocation.taken().len(), 3);
            assert_eq!(allocation.queues().total_count(), 2);
        }

        assert_eq!(queues, before);
    }

    #[test]
    fn test_commit_keeps_players_out() {
        let mut queues = filled_queues();

        let mut allocation = Allocation::begin(&mut queues);
        allocation.take(Role::Tank);
        allocation.take(Role::Healer);
        let players = allocation.commit();

        assert_eq!(players.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(queues.total_count(), 3);
        assert_eq!(queues.front(Role::Tank).map(|p| p.id), Some(5));
    }

    #[test]
    fn test_rollback_to_savepoint() {
        let mut queues = filled_queues();

        let mut allocation = Allocation::begin(&mut queues);
        allocation.take(Role::Tank);
        let savepoint = allocation.savepoint();
        allocation.take(Role::Healer);
        allocation.take(Role::Assassin);
        assert_eq!(allocation.since(savepoint).len(), 2);

        allocation.rollback_to(savepoint);
        assert_eq!(allocation.taken().len(), 1);
        assert!(allocation.since(savepoint).is_empty());
        assert_eq!(allocation.queues().front(Role::Healer).map(|p| p.id), Some(2));
        assert_eq!(
            allocation.queues().front(Role::Assassin).map(|p| p.id),
            Some(3)
        );

        let players = allocation.commit();
        assert_eq!(players.len(), 1);
        assert_eq!(queues.total_count(), 4);
    }
}
