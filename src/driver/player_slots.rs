use crate::conditioner::{PlayerId, MAX_PLAYERS};
use std::collections::HashMap;
use std::hash::Hash;

/// Assigns connected devices to player slots in connection order
///
/// A freed slot is reused by the next device that connects, lowest slot first.
#[derive(Debug)]
pub struct PlayerSlots<K> {
    assigned: HashMap<K, PlayerId>,
}

impl<K: Copy + Eq + Hash> PlayerSlots<K> {
    pub fn new() -> Self {
        Self {
            assigned: HashMap::new(),
        }
    }

    /// Slot of `device`, assigning the lowest free one if it has none yet
    ///
    /// Returns `None` when all [`MAX_PLAYERS`] slots are taken.
    pub fn assign(&mut self, device: K) -> Option<PlayerId> {
        if let Some(player) = self.assigned.get(&device) {
            return Some(*player);
        }

        let player = PlayerId::all().find(|slot| !self.assigned.values().any(|p| p == slot))?;
        self.assigned.insert(device, player);
        Some(player)
    }

    pub fn release(&mut self, device: K) -> Option<PlayerId> {
        self.assigned.remove(&device)
    }

    pub fn player_of(&self, device: K) -> Option<PlayerId> {
        self.assigned.get(&device).copied()
    }

    /// Assigned (device, player) pairs ordered by player slot
    pub fn assigned(&self) -> Vec<(K, PlayerId)> {
        let mut pairs: Vec<(K, PlayerId)> = self
            .assigned
            .iter()
            .map(|(device, player)| (*device, *player))
            .collect();
        pairs.sort_by_key(|(_, player)| *player);
        pairs
    }

    pub fn is_full(&self) -> bool {
        self.assigned.len() >= MAX_PLAYERS as usize
    }
}

impl<K: Copy + Eq + Hash> Default for PlayerSlots<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_in_connection_order() {
        let mut slots = PlayerSlots::new();
        assert_eq!(slots.assign(10), Some(PlayerId::P1));
        assert_eq!(slots.assign(20), Some(PlayerId::P2));
        assert_eq!(slots.assign(10), Some(PlayerId::P1));
        assert_eq!(slots.player_of(20), Some(PlayerId::P2));
    }

    #[test]
    fn reuses_lowest_free_slot() {
        let mut slots = PlayerSlots::new();
        slots.assign('a');
        slots.assign('b');
        slots.assign('c');

        assert_eq!(slots.release('a'), Some(PlayerId::P1));
        assert_eq!(slots.assign('d'), Some(PlayerId::P1));
        assert_eq!(
            slots.assigned(),
            vec![('d', PlayerId::P1), ('b', PlayerId::P2), ('c', PlayerId::P3)]
        );
    }

    #[test]
    fn refuses_devices_beyond_max_players() {
        let mut slots = PlayerSlots::new();
        for device in 0..MAX_PLAYERS {
            assert!(slots.assign(device).is_some());
        }
        assert!(slots.is_full());
        assert_eq!(slots.assign(99), None);
        assert_eq!(slots.release(99), None);
    }
}
