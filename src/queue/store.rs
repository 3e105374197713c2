//! Per-role waiting queues
//!
//! One FIFO per role, indexed directly by `Role`. Players only ever leave
//! from the front, and rollback puts them back at the front in their
//! original order.

use crate::types::{Player, QueueStatus, Role};
use std::collections::VecDeque;

/// Waiting players partitioned by role, in arrival order per role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleQueues {
    queues: [VecDeque<Player>; Role::COUNT],
}

impl RoleQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player to the back of its role queue
    pub fn enqueue(&mut self, player: Player) {
        self.queues[player.role.index()].push_back(player);
    }

    /// Players waiting across all roles
    pub fn total_count(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Players waiting for `role`
    pub fn len(&self, role: Role) -> usize {
        self.queues[role.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Next player for `role` without removing it
    pub fn front(&self, role: Role) -> Option<&Player> {
        self.queues[role.index()].front()
    }

    /// Players waiting for `role`, front first
    pub fn iter(&self, role: Role) -> impl Iterator<Item = &Player> + '_ {
        self.queues[role.index()].iter()
    }

    /// Remove the front player of `role`, `None` if that queue is empty
    pub fn dequeue_front(&mut self, role: Role) -> Option<Player> {
        self.queues[role.index()].pop_front()
    }

    /// Put back players that were dequeued together, given in dequeue order.
    ///
    /// Each player returns to the front of its own queue. Walking the list
    /// backwards means the first one dequeued ends up first again.
    pub fn requeue_front(&mut self, players: Vec<Player>) {
        for player in players.into_iter().rev() {
            self.queues[player.role.index()].push_front(player);
        }
    }

    /// Copy of every queue, front first
    pub fn status(&self) -> QueueStatus {
        let mut status = QueueStatus::default();
        for role in Role::ALL {
            status.role_mut(role).extend(self.iter(role).cloned());
        }
        status
    }
}
