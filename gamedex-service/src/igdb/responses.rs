//! Response types for the IGDB API.
//!
//! IGDB only returns fields that were requested, so everything beyond the
//! record ID and name is optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Reference into the character_genders lookup
    #[serde(default)]
    pub gender: Option<u64>,
    /// Reference into the character_species lookup
    #[serde(default)]
    pub species: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Entry in a lookup endpoint (character_genders, character_species)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupEntry {
    pub id: u64,
    pub name: String,
}
