//! Raw upstream payloads. Only the fields the normalizer reads are modelled;
//! everything else in the upstream documents is ignored.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub count: Option<u64>,
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct TypePayload {
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Deserialize)]
pub struct PokedexEntry {
    pub entry_number: u32,
    pub pokemon_species: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct PokedexPayload {
    pub pokemon_entries: Vec<PokedexEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RegionPayload {
    pub main_generation: Option<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationPayload {
    pub pokemon_species: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StatRef {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawStat {
    pub base_stat: u32,
    pub stat: StatRef,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawAbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
    pub slot: u8,
}

/// Front/back sprite set from the top level of the sprites document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawSprites {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_default: Option<String>,
    pub back_shiny: Option<String>,
    pub other: Option<OtherSprites>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork")]
    pub official_artwork: Option<ArtworkSprites>,
    pub home: Option<ArtworkSprites>,
    pub dream_world: Option<ArtworkSprites>,
    pub showdown: Option<ArtworkSprites>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtworkSprites {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawPokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<RawTypeSlot>,
    #[serde(default)]
    pub stats: Vec<RawStat>,
    #[serde(default)]
    pub abilities: Vec<RawAbilitySlot>,
    #[serde(default)]
    pub sprites: RawSprites,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LanguageRef {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawEffectEntry {
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub short_effect: String,
    pub language: LanguageRef,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawFlavorTextEntry {
    pub flavor_text: String,
    pub language: LanguageRef,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawAbility {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub effect_entries: Vec<RawEffectEntry>,
    #[serde(default)]
    pub flavor_text_entries: Vec<RawFlavorTextEntry>,
    pub generation: Option<NamedResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprites_tolerate_missing_sections() {
        let raw: RawPokemon = serde_json::from_value(serde_json::json!({
            "id": 132,
            "name": "ditto",
            "sprites": {
                "front_default": null,
                "other": {
                    "official-artwork": { "front_shiny": "https://img/132-shiny.png" }
                }
            }
        }))
        .unwrap();

        let other = raw.sprites.other.unwrap();
        assert_eq!(
            other.official_artwork.unwrap().front_shiny.as_deref(),
            Some("https://img/132-shiny.png")
        );
        assert!(other.home.is_none());
        assert!(raw.types.is_empty());
    }
}
