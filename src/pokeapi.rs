//! Creature data source.
//!
//! [`CreatureSource`] is the seam between the game and the network. The
//! production implementation, [`PokeApiClient`], reads the public PokeAPI over
//! `reqwest`; tests use an in-memory source instead.
//!
//! Calls are made once: no retry, no backoff, no client-side timeout. Any
//! non-success status is a hard failure for that call.

use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use schema::{EvolutionChainNode, EvolutionChainResponse, PokemonResponse, SpeciesResponse};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// The creature fields the game keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureInfo {
    pub id: u32,
    pub name: String,
    pub sprite: Option<String>,
}

impl From<PokemonResponse> for CreatureInfo {
    fn from(response: PokemonResponse) -> Self {
        let sprite = response.artwork_url().map(str::to_owned);
        Self {
            id: response.id,
            name: response.name,
            sprite,
        }
    }
}

/// Read-only access to creature, species and evolution-chain data.
#[async_trait]
pub trait CreatureSource: Send + Sync {
    /// Creature by National Dex id
    async fn creature_by_id(&self, id: u32) -> ApiResult<CreatureInfo>;

    /// Creature by species name, as found in evolution chains
    async fn creature_by_name(&self, name: &str) -> ApiResult<CreatureInfo>;

    /// URL of the evolution chain the species with this id belongs to
    async fn evolution_chain_url(&self, species_id: u32) -> ApiResult<String>;

    /// Evolution tree behind a chain URL
    async fn evolution_chain(&self, url: &str) -> ApiResult<EvolutionChainNode>;
}

/// [`CreatureSource`] backed by the PokeAPI REST endpoints.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn pokemon_url(&self, id_or_name: &str) -> String {
        format!("{}/pokemon/{}", self.base_url, id_or_name)
    }

    pub fn species_url(&self, id: u32) -> String {
        format!("{}/pokemon-species/{}", self.base_url, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!(url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CreatureSource for PokeApiClient {
    async fn creature_by_id(&self, id: u32) -> ApiResult<CreatureInfo> {
        let url = self.pokemon_url(&id.to_string());
        let response: PokemonResponse = self.get_json(&url).await?;
        Ok(response.into())
    }

    async fn creature_by_name(&self, name: &str) -> ApiResult<CreatureInfo> {
        let url = self.pokemon_url(name);
        let response: PokemonResponse = self.get_json(&url).await?;
        Ok(response.into())
    }

    async fn evolution_chain_url(&self, species_id: u32) -> ApiResult<String> {
        let url = self.species_url(species_id);
        let response: SpeciesResponse = self.get_json(&url).await?;
        Ok(response.evolution_chain.url)
    }

    async fn evolution_chain(&self, url: &str) -> ApiResult<EvolutionChainNode> {
        let response: EvolutionChainResponse = self.get_json(url).await?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::{Artwork, OtherSprites, Sprites};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one HTTP request with `response` and returns the base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/api/v2", addr)
    }

    #[test]
    fn test_urls() {
        let client = PokeApiClient::new("https://pokeapi.co/api/v2/");
        assert_eq!(client.base_url(), "https://pokeapi.co/api/v2");
        assert_eq!(client.pokemon_url("25"), "https://pokeapi.co/api/v2/pokemon/25");
        assert_eq!(client.pokemon_url("ivysaur"), "https://pokeapi.co/api/v2/pokemon/ivysaur");
        assert_eq!(client.species_url(1), "https://pokeapi.co/api/v2/pokemon-species/1");
    }

    #[test]
    fn test_creature_info_from_response() {
        let response = PokemonResponse {
            id: 25,
            name: "pikachu".to_string(),
            sprites: Sprites {
                other: Some(OtherSprites {
                    official_artwork: Some(Artwork {
                        front_default: Some("https://img/25.png".to_string()),
                    }),
                }),
            },
        };
        assert_eq!(
            CreatureInfo::from(response),
            CreatureInfo {
                id: 25,
                name: "pikachu".to_string(),
                sprite: Some("https://img/25.png".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        // Port 9 on localhost is the discard port; nothing listens there in CI.
        let client = PokeApiClient::new("http://127.0.0.1:9/api/v2");
        match client.creature_by_id(1).await {
            Err(ApiError::Request { url, .. }) => assert_eq!(url, "http://127.0.0.1:9/api/v2/pokemon/1"),
            other => panic!("expected a request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_status_error() {
        let base = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let client = PokeApiClient::new(base.clone());

        match client.creature_by_id(9999).await {
            Err(ApiError::Status { url, status }) => {
                assert_eq!(status, 404);
                assert_eq!(url, format!("{}/pokemon/9999", base));
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
        )
        .await;
        let client = PokeApiClient::new(base);

        assert!(matches!(
            client.evolution_chain_url(1).await,
            Err(ApiError::Decode { .. })
        ));
    }
}
