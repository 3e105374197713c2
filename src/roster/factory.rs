//! Player creation from catalog characters
//!
//! Ratings are random within a configured range; that policy lives here so
//! the formation engine only ever sees finished `Player` values.

use crate::error::{MatchmakingError, Result};
use crate::roster::catalog::CharacterCatalog;
use crate::types::{CharacterId, Player, PlayerId};
use anyhow::anyhow;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Inclusive range generated ratings are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingRange {
    min: u32,
    max: u32,
}

impl RatingRange {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(anyhow!(
                "Rating range minimum {} is greater than maximum {}",
                min,
                max
            ));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, mmr: u32) -> bool {
        (self.min..=self.max).contains(&mmr)
    }

    /// Uniformly random rating in the range
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for RatingRange {
    fn default() -> Self {
        Self {
            min: 1500,
            max: 3500,
        }
    }
}

/// Creates players with unique, increasing ids
pub struct PlayerFactory {
    catalog: Arc<dyn CharacterCatalog>,
    rating_range: RatingRange,
    next_id: AtomicU64,
}

impl PlayerFactory {
    pub fn new(catalog: Arc<dyn CharacterCatalog>, rating_range: RatingRange) -> Self {
        Self {
            catalog,
            rating_range,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CharacterCatalog> {
        &self.catalog
    }

    pub fn rating_range(&self) -> RatingRange {
        self.rating_range
    }

    /// Number of players created so far
    pub fn issued_count(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }

    /// Create a player for `character_id` with a random rating
    pub fn create_player(&self, character_id: CharacterId) -> Result<Player> {
        self.create_player_with_rng(character_id, &mut rand::thread_rng())
    }

    /// Create a player drawing its rating from `rng`
    pub fn create_player_with_rng<R: Rng>(
        &self,
        character_id: CharacterId,
        rng: &mut R,
    ) -> Result<Player> {
        let mmr = self.rating_range.sample(rng);
        self.create_player_with_mmr(character_id, mmr)
    }

    /// Create a player with a fixed rating
    pub fn create_player_with_mmr(&self, character_id: CharacterId, mmr: u32) -> Result<Player> {
        let Some(template) = self.catalog.get_character(character_id) else {
            warn!("No character with id {} in the catalog", character_id);
            return Err(MatchmakingError::UnknownCharacter { character_id }.into());
        };

        let id: PlayerId = self.next_id.fetch_add(1, Ordering::Relaxed);
        let player = Player {
            id,
            name: template.name,
            role: template.role,
            mmr,
        };

        debug!(
            "Created player {} - '{}' ({}) mmr {}",
            player.id, player.name, player.role, player.mmr
        );
        Ok(player)
    }

    /// Pick any character id from the catalog
    pub fn random_character_id<R: Rng>(&self, rng: &mut R) -> Option<CharacterId> {
        self.catalog
            .all_characters()
            .choose(rng)
            .map(|template| template.id)
    }
}

impl std::fmt::Debug for PlayerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerFactory")
            .field("characters", &self.catalog.character_count())
            .field("rating_range", &self.rating_range)
            .field("issued", &self.issued_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::catalog::MockCharacterCatalog;
    use crate::types::{CharacterTemplate, Role};
    use mockall::predicate::eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn johanna() -> CharacterTemplate {
        CharacterTemplate {
            id: 7,
            name: "Johanna".to_string(),
            role: Role::Tank,
        }
    }

    #[test]
    fn test_rating_range_validation() {
        assert!(RatingRange::new(2000, 1000).is_err());
        let range = RatingRange::new(2000, 2000).unwrap();
        assert_eq!(range.sample(&mut StdRng::seed_from_u64(1)), 2000);
    }

    #[test]
    fn test_ratings_stay_in_range() {
        let range = RatingRange::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }

    #[test]
    fn test_create_player_uses_catalog_entry() {
        let mut catalog = MockCharacterCatalog::new();
        catalog
            .expect_get_character()
            .with(eq(7))
            .returning(|_| Some(johanna()));

        let factory = PlayerFactory::new(Arc::new(catalog), RatingRange::default());
        let player = factory.create_player(7).unwrap();

        assert_eq!(player.id, 1);
        assert_eq!(player.name, "Johanna");
        assert_eq!(player.role, Role::Tank);
        assert!(RatingRange::default().contains(player.mmr));
    }

    #[test]
    fn test_ids_increase_monotonically() {
        let mut catalog = MockCharacterCatalog::new();
        catalog
            .expect_get_character()
            .returning(|_| Some(johanna()));

        let factory = PlayerFactory::new(Arc::new(catalog), RatingRange::default());
        let ids: Vec<_> = (0..5)
            .map(|_| factory.create_player_with_mmr(7, 2000).unwrap().id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(factory.issued_count(), 5);
    }

    #[test]
    fn test_unknown_character_consumes_no_id() {
        let mut catalog = MockCharacterCatalog::new();
        catalog
            .expect_get_character()
            .with(eq(99))
            .returning(|_| None);
        catalog
            .expect_get_character()
            .with(eq(7))
            .returning(|_| Some(johanna()));

        let factory = PlayerFactory::new(Arc::new(catalog), RatingRange::default());
        let err = factory.create_player(99).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchmakingError>(),
            Some(MatchmakingError::UnknownCharacter { character_id: 99 })
        ));

        assert_eq!(factory.create_player(7).unwrap().id, 1);
    }

    #[test]
    fn test_random_character_id() {
        let mut catalog = MockCharacterCatalog::new();
        catalog.expect_all_characters().returning(|| vec![johanna()]);

        let factory = PlayerFactory::new(Arc::new(catalog), RatingRange::default());
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(factory.random_character_id(&mut rng), Some(7));
    }
}
