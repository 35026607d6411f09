//! Turning reward events into creatures.
//!
//! A scoring event that unlocks rewards spawns one [`RewardTask`]. The task
//! works on its own copy of the collection, handles the events in order
//! (so an evolution can pick the creature caught a moment earlier) and
//! finishes with one [`RewardDelivery`] per event. The session joins each
//! task exactly once and applies the deliveries to the live collection.
//!
//! Delivery is at-most-once and best-effort: network failures are logged and
//! the reward is dropped, the points are kept.

use crate::collection::{today, Collection, CATCH_RETRY_CAP, DEFAULT_ID_RANGE};
use crate::errors::{ApiError, ApiResult};
use crate::pokeapi::{CreatureInfo, CreatureSource};
use crate::progression::evolution::find_next_evolution;
use crate::progression::rewards::RewardEvent;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use schema::Creature;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Where new catches come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchRules {
    pub id_range: RangeInclusive<u32>,
    pub retry_cap: u32,
}

impl Default for CatchRules {
    fn default() -> Self {
        Self {
            id_range: DEFAULT_ID_RANGE,
            retry_cap: CATCH_RETRY_CAP,
        }
    }
}

/// Why an evolution turned into a catch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    /// Every owned creature is at its final stage
    NothingCanEvolve,
    /// A lookup failed while searching for a candidate
    EvolutionFailed(ApiError),
}

/// Why a reward was not delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    CatchFailed(ApiError),
    /// The evolution fell back to a catch and the catch failed too
    FallbackCatchFailed { cause: FallbackCause, catch: ApiError },
    /// The task panicked or was cancelled before finishing
    TaskFailed(String),
}

/// The single observed result of one reward event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardDelivery {
    Caught {
        creature: Creature,
        /// Set when this catch stands in for an evolution
        fallback: Option<FallbackCause>,
    },
    Evolved {
        slot: usize,
        from: Creature,
        into: Creature,
    },
    /// An evolution with an empty collection: nothing to evolve, no fallback
    Skipped { event: RewardEvent },
    Dropped { event: RewardEvent, reason: DropReason },
}

impl RewardDelivery {
    /// Apply this delivery to `collection`. Returns whether it changed.
    ///
    /// An evolution whose slot no longer holds the expected creature is
    /// re-targeted to the first slot with the same id, or dropped.
    pub fn apply_to(&self, collection: &mut Collection) -> bool {
        match self {
            RewardDelivery::Caught { creature, .. } => {
                collection.push(creature.clone());
                true
            }
            RewardDelivery::Evolved { slot, from, into } => {
                let target = match collection.get(*slot) {
                    Some(current) if current.id == from.id => Some(*slot),
                    _ => collection.position_of(from.id),
                };
                match target {
                    Some(slot) => collection.replace_slot(slot, into.clone()).is_some(),
                    None => {
                        warn!(creature = %from, "evolved creature is no longer owned, dropping evolution");
                        false
                    }
                }
            }
            RewardDelivery::Skipped { .. } | RewardDelivery::Dropped { .. } => false,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, RewardDelivery::Caught { .. } | RewardDelivery::Evolved { .. })
    }
}

fn to_creature(info: CreatureInfo, caught_date: String) -> Creature {
    Creature {
        id: info.id,
        name: info.name,
        sprite: info.sprite,
        caught_date,
    }
}

/// Catch a random creature, preferring ids not yet owned.
pub async fn catch_random<R: Rng + Send>(
    collection: &Collection,
    source: &dyn CreatureSource,
    rules: &CatchRules,
    rng: &mut R,
) -> ApiResult<Creature> {
    let draw = collection.draw_catch_id(rules.id_range.clone(), rules.retry_cap, rng);
    if draw.duplicate {
        debug!(id = draw.id, attempts = draw.attempts, "accepting duplicate catch");
    }

    let info = source.creature_by_id(draw.id).await?;
    Ok(to_creature(info, today()))
}

/// Find the first creature, in shuffled order, that has a next stage.
///
/// Returns the slot and the next stage. Any failed lookup aborts the search.
pub async fn find_evolution_candidate<R: Rng + Send>(
    collection: &Collection,
    source: &dyn CreatureSource,
    rng: &mut R,
) -> ApiResult<Option<(usize, CreatureInfo)>> {
    let mut order: Vec<usize> = (0..collection.len()).collect();
    order.shuffle(rng);

    for slot in order {
        let Some(creature) = collection.get(slot) else {
            continue;
        };
        let chain_url = source.evolution_chain_url(creature.id).await?;
        let chain = source.evolution_chain(&chain_url).await?;

        if let Some(next) = find_next_evolution(&chain, &creature.name) {
            let info = source.creature_by_name(&next).await?;
            return Ok(Some((slot, info)));
        }
        debug!(creature = %creature, "final stage");
    }

    Ok(None)
}

/// Evolve one owned creature, falling back to a catch when none can evolve
/// or the search fails.
pub async fn evolve_pokemon<R: Rng + Send>(
    collection: &Collection,
    source: &dyn CreatureSource,
    rules: &CatchRules,
    rng: &mut R,
) -> RewardDelivery {
    if collection.is_empty() {
        debug!("evolution unlocked with an empty collection");
        return RewardDelivery::Skipped {
            event: RewardEvent::Evolve,
        };
    }

    let cause = match find_evolution_candidate(collection, source, rng).await {
        Ok(Some((slot, info))) => {
            if let Some(from) = collection.get(slot) {
                let into = from.evolved_into(info.id, info.name, info.sprite);
                info!(from = %from, into = %into, "creature evolved");
                return RewardDelivery::Evolved {
                    slot,
                    from: from.clone(),
                    into,
                };
            }
            FallbackCause::NothingCanEvolve
        }
        Ok(None) => {
            info!("no creature can evolve, catching a new one instead");
            FallbackCause::NothingCanEvolve
        }
        Err(e) => {
            warn!(error = %e, "evolution failed, catching a new creature instead");
            FallbackCause::EvolutionFailed(e)
        }
    };

    match catch_random(collection, source, rules, rng).await {
        Ok(creature) => {
            info!(creature = %creature, "creature caught");
            RewardDelivery::Caught {
                creature,
                fallback: Some(cause),
            }
        }
        Err(catch) => {
            error!(cause = ?cause, error = %catch, "evolution and fallback catch both failed, no reward");
            RewardDelivery::Dropped {
                event: RewardEvent::Evolve,
                reason: DropReason::FallbackCatchFailed { cause, catch },
            }
        }
    }
}

/// Resolve `events` in order against a working copy of the collection.
pub async fn deliver_rewards<R: Rng + Send>(
    events: &[RewardEvent],
    mut collection: Collection,
    source: &dyn CreatureSource,
    rules: &CatchRules,
    rng: &mut R,
) -> Vec<RewardDelivery> {
    let mut deliveries = Vec::with_capacity(events.len());

    for event in events {
        let delivery = match event {
            RewardEvent::Catch => match catch_random(&collection, source, rules, rng).await {
                Ok(creature) => {
                    info!(creature = %creature, "creature caught");
                    RewardDelivery::Caught {
                        creature,
                        fallback: None,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "catch failed, no reward this time");
                    RewardDelivery::Dropped {
                        event: RewardEvent::Catch,
                        reason: DropReason::CatchFailed(e),
                    }
                }
            },
            RewardEvent::Evolve => evolve_pokemon(&collection, source, rules, rng).await,
        };

        delivery.apply_to(&mut collection);
        deliveries.push(delivery);
    }

    deliveries
}

/// A reward fetch running in the background.
#[derive(Debug)]
pub struct RewardTask {
    events: Vec<RewardEvent>,
    handle: JoinHandle<Vec<RewardDelivery>>,
}

impl RewardTask {
    pub fn spawn(
        events: Vec<RewardEvent>,
        collection: Collection,
        source: Arc<dyn CreatureSource>,
        rules: CatchRules,
        mut rng: StdRng,
    ) -> Self {
        let task_events = events.clone();
        let handle = tokio::spawn(async move {
            deliver_rewards(&task_events, collection, source.as_ref(), &rules, &mut rng).await
        });
        Self { events, handle }
    }

    pub fn events(&self) -> &[RewardEvent] {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task. Consumes it, so each result is observed once.
    pub async fn join(self) -> Vec<RewardDelivery> {
        match self.handle.await {
            Ok(deliveries) => deliveries,
            Err(e) => {
                warn!(error = %e, "reward task did not finish, dropping its rewards");
                self.events
                    .into_iter()
                    .map(|event| RewardDelivery::Dropped {
                        event,
                        reason: DropReason::TaskFailed(e.to_string()),
                    })
                    .collect()
            }
        }
    }
}
