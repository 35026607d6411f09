//! In-memory creature source for tests.

use crate::errors::{ApiError, ApiResult};
use crate::pokeapi::{CreatureInfo, CreatureSource};
use async_trait::async_trait;
use schema::{Creature, EvolutionChainNode};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A builder-style fake Pokedex.
///
/// # Example
/// ```ignore
/// let dex = FakeDex::new()
///     .with_line(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")])
///     .failing_creature(3);
/// ```
#[derive(Debug, Default)]
pub struct FakeDex {
    creatures: HashMap<u32, CreatureInfo>,
    chain_urls: HashMap<u32, String>,
    chains: HashMap<String, EvolutionChainNode>,
    failing_ids: HashSet<u32>,
    failing_chain_urls: HashSet<String>,
    offline: bool,
    calls: AtomicUsize,
}

impl FakeDex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single-stage creature
    pub fn with_creature(mut self, id: u32, name: &str) -> Self {
        self.insert_line(&[(id, name)]);
        self
    }

    /// Registers a linear evolution line sharing one chain
    pub fn with_line(mut self, line: &[(u32, &str)]) -> Self {
        self.insert_line(line);
        self
    }

    /// Registers every id in `ids` as its own single-stage creature
    pub fn with_filler(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        for id in ids {
            let name = format!("mon{}", id);
            self.insert_line(&[(id, name.as_str())]);
        }
        self
    }

    /// Lookups of this id (by id or name, species included) fail
    pub fn failing_creature(mut self, id: u32) -> Self {
        self.failing_ids.insert(id);
        self
    }

    /// The chain that `species_id` belongs to cannot be fetched
    pub fn failing_chain_for(mut self, species_id: u32) -> Self {
        if let Some(url) = self.chain_urls.get(&species_id) {
            self.failing_chain_urls.insert(url.clone());
        }
        self
    }

    /// Every call fails
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn insert_line(&mut self, line: &[(u32, &str)]) {
        let Some((root_id, _)) = line.first() else {
            return;
        };
        let url = format!("fake://evolution-chain/{}", root_id);
        let names: Vec<&str> = line.iter().map(|(_, name)| *name).collect();
        if let Some(chain) = EvolutionChainNode::linear(&names) {
            self.chains.insert(url.clone(), chain);
        }
        for (id, name) in line {
            self.creatures.insert(
                *id,
                CreatureInfo {
                    id: *id,
                    name: name.to_string(),
                    sprite: Some(format!("https://img/{}.png", id)),
                },
            );
            self.chain_urls.insert(*id, url.clone());
        }
    }

    fn check(&self, url: String, id: Option<u32>) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(ApiError::Request {
                url,
                reason: "offline".to_string(),
            });
        }
        if id.is_some_and(|id| self.failing_ids.contains(&id)) {
            return Err(ApiError::Status { url, status: 500 });
        }
        Ok(())
    }

    fn not_found(url: String) -> ApiError {
        ApiError::Status { url, status: 404 }
    }
}

#[async_trait]
impl CreatureSource for FakeDex {
    async fn creature_by_id(&self, id: u32) -> ApiResult<CreatureInfo> {
        let url = format!("fake://pokemon/{}", id);
        self.check(url.clone(), Some(id))?;
        self.creatures.get(&id).cloned().ok_or_else(|| Self::not_found(url))
    }

    async fn creature_by_name(&self, name: &str) -> ApiResult<CreatureInfo> {
        let url = format!("fake://pokemon/{}", name);
        let found = self.creatures.values().find(|c| c.name == name).cloned();
        self.check(url.clone(), found.as_ref().map(|c| c.id))?;
        found.ok_or_else(|| Self::not_found(url))
    }

    async fn evolution_chain_url(&self, species_id: u32) -> ApiResult<String> {
        let url = format!("fake://pokemon-species/{}", species_id);
        self.check(url.clone(), Some(species_id))?;
        self.chain_urls
            .get(&species_id)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn evolution_chain(&self, url: &str) -> ApiResult<EvolutionChainNode> {
        self.check(url.to_string(), None)?;
        if self.failing_chain_urls.contains(url) {
            return Err(ApiError::Decode {
                url: url.to_string(),
                reason: "truncated body".to_string(),
            });
        }
        self.chains
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url.to_string()))
    }
}

/// Owned creature for building collections in tests
pub fn owned(id: u32, name: &str) -> Creature {
    Creature {
        id,
        name: name.to_string(),
        sprite: Some(format!("https://img/{}.png", id)),
        caught_date: "1/1/2025".to_string(),
    }
}

/// A source whose calls never complete, like a connection that stalls
#[derive(Debug, Default)]
pub struct StalledDex;

#[async_trait]
impl CreatureSource for StalledDex {
    async fn creature_by_id(&self, _id: u32) -> ApiResult<CreatureInfo> {
        std::future::pending().await
    }

    async fn creature_by_name(&self, _name: &str) -> ApiResult<CreatureInfo> {
        std::future::pending().await
    }

    async fn evolution_chain_url(&self, _species_id: u32) -> ApiResult<String> {
        std::future::pending().await
    }

    async fn evolution_chain(&self, _url: &str) -> ApiResult<EvolutionChainNode> {
        std::future::pending().await
    }
}
