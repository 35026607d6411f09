//! The subset of PokeAPI v2 response bodies the game reads.
//! Unknown fields are ignored by serde, so full payloads decode fine.

use crate::EvolutionChainNode;
use serde::{Deserialize, Serialize};

/// `GET /pokemon/{id or name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonResponse {
    pub id: u32,
    pub name: String,
    pub sprites: Sprites,
}

impl PokemonResponse {
    pub fn artwork_url(&self) -> Option<&str> {
        self.sprites
            .other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub front_default: Option<String>,
}

/// `GET /pokemon-species/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesResponse {
    pub evolution_chain: ResourceLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub url: String,
}

/// `GET {evolution_chain.url}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionChainResponse {
    pub chain: ChainLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

impl From<ChainLink> for EvolutionChainNode {
    fn from(link: ChainLink) -> Self {
        EvolutionChainNode {
            species_name: link.species.name,
            children: link.evolves_to.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<EvolutionChainResponse> for EvolutionChainNode {
    fn from(response: EvolutionChainResponse) -> Self {
        response.chain.into()
    }
}
