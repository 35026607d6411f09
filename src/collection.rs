use chrono::{Local, NaiveDate};
use rand::Rng;
use schema::Creature;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// National Dex ids of generations 1 to 3
pub const DEFAULT_ID_RANGE: RangeInclusive<u32> = 1..=386;
/// Draws spent trying to avoid an id the player already owns
pub const CATCH_RETRY_CAP: u32 = 20;

/// Outcome of drawing an id for a new catch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdDraw {
    pub id: u32,
    /// Number of draws made, between 1 and the retry cap
    pub attempts: u32,
    /// The id is already in the collection; accepted because the cap was hit
    pub duplicate: bool,
}

/// The creatures a player owns, in catch order.
///
/// Ids are kept unique on a best-effort basis only: [`Collection::draw_catch_id`]
/// gives up after a bounded number of draws and accepts a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    creatures: Vec<Creature>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_creatures(creatures: Vec<Creature>) -> Self {
        Self { creatures }
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Creature> {
        self.creatures.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.iter()
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.creatures.iter().any(|c| c.id == id)
    }

    /// First slot holding `id`
    pub fn position_of(&self, id: u32) -> Option<usize> {
        self.creatures.iter().position(|c| c.id == id)
    }

    pub fn push(&mut self, creature: Creature) {
        self.creatures.push(creature);
    }

    /// Replace the creature in `slot`, returning the previous occupant.
    /// Out-of-range slots leave the collection untouched.
    pub fn replace_slot(&mut self, slot: usize, creature: Creature) -> Option<Creature> {
        let entry = self.creatures.get_mut(slot)?;
        Some(std::mem::replace(entry, creature))
    }

    /// Pokedex order: ascending id, catch order among equal ids
    pub fn sorted_by_id(&self) -> Vec<&Creature> {
        let mut sorted: Vec<&Creature> = self.creatures.iter().collect();
        sorted.sort_by_key(|c| c.id);
        sorted
    }

    /// Draw an id in `id_range` for a new catch.
    ///
    /// Redraws while the id is already owned, up to `retry_cap` draws in total;
    /// the last draw is accepted even if it is a duplicate.
    pub fn draw_catch_id<R: Rng>(&self, id_range: RangeInclusive<u32>, retry_cap: u32, rng: &mut R) -> IdDraw {
        let retry_cap = retry_cap.max(1);
        let mut attempts = 0;

        loop {
            let id = rng.random_range(id_range.clone());
            attempts += 1;
            let duplicate = self.contains_id(id);
            if !duplicate || attempts >= retry_cap {
                return IdDraw {
                    id,
                    attempts,
                    duplicate,
                };
            }
        }
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Creature;
    type IntoIter = std::slice::Iter<'a, Creature>;

    fn into_iter(self) -> Self::IntoIter {
        self.creatures.iter()
    }
}

/// Short date in the `d/m/yyyy` form used for catch dates
pub fn format_caught_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

pub fn today() -> String {
    format_caught_date(Local::now().date_naive())
}
