//! IGDB API integration.
//!
//! This module provides a client for the IGDB video game metadata API
//! (https://api.igdb.com). All endpoints take a plain-text Apicalypse
//! query in the POST body and authenticate with a Twitch Client-ID plus
//! an OAuth bearer token.

mod client;
mod error;
mod query;
mod responses;

pub use client::{IgdbClient, IgdbCredentials};
pub use error::IgdbError;
pub use query::Query;
pub use responses::{Character, Game, LookupEntry};

/// Lookup endpoints that resolve a numeric ID into a display name.
///
/// Only these two are reachable from the API and MCP surfaces, so request
/// input can never select an arbitrary IGDB endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupEndpoint {
    Gender,
    Species,
}

impl LookupEndpoint {
    /// IGDB endpoint path for this lookup
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupEndpoint::Gender => "character_genders",
            LookupEndpoint::Species => "character_species",
        }
    }
}

impl std::str::FromStr for LookupEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gender" | "character_genders" => Ok(LookupEndpoint::Gender),
            "species" | "character_species" => Ok(LookupEndpoint::Species),
            other => Err(format!("Unknown lookup endpoint: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_endpoint_parsing() {
        assert_eq!(
            "gender".parse::<LookupEndpoint>().unwrap(),
            LookupEndpoint::Gender
        );
        assert_eq!(
            "character_species".parse::<LookupEndpoint>().unwrap(),
            LookupEndpoint::Species
        );
        assert!("games".parse::<LookupEndpoint>().is_err());
    }

    #[test]
    fn test_lookup_endpoint_paths() {
        assert_eq!(LookupEndpoint::Gender.as_str(), "character_genders");
        assert_eq!(LookupEndpoint::Species.as_str(), "character_species");
    }
}
