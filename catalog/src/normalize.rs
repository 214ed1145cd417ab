//! Raw upstream payloads to flat domain entities.
//!
//! Every function here is pure: the same raw input always produces the same
//! output, and nothing is fetched. Ability enrichment fetches through the
//! catalog and then hands the raw ability to [`normalize_ability`].

use crate::errors::Result;
use crate::types::{Ability, AbilityLite, Pokemon, Stats, resource_id};
use crate::upstream::payload::{
    RawAbility, RawAbilitySlot, RawPokemon, RawSprites, RawStat, RawTypeSlot,
};
use url::Url;

const PLACEHOLDER_BASE: &str = "https://placehold.co/256x256";
const ENGLISH: &str = "en";

pub fn normalize_pokemon(raw: &RawPokemon) -> Result<Pokemon> {
    Ok(Pokemon {
        id: raw.id,
        name: raw.name.clone(),
        types: extract_types(&raw.types),
        stats: extract_stats(&raw.stats),
        abilities_lite: extract_abilities_lite(&raw.abilities)?,
        abilities: None,
        image: resolve_image(&raw.sprites, &raw.name),
    })
}

/// Type names in input order. Upstream sends them by ascending slot; gaps and
/// duplicates are passed through as-is.
pub fn extract_types(types: &[RawTypeSlot]) -> Vec<String> {
    types.iter().map(|t| t.type_.name.clone()).collect()
}

pub fn extract_stats(stats: &[RawStat]) -> Stats {
    let mut out = Stats::default();
    for stat in stats {
        let slot = match stat.stat.name.as_str() {
            "hp" => &mut out.hp,
            "attack" => &mut out.attack,
            "defense" => &mut out.defense,
            "special-attack" => &mut out.special_attack,
            "special-defense" => &mut out.special_defense,
            "speed" => &mut out.speed,
            _ => continue,
        };
        *slot = stat.base_stat;
    }
    out
}

/// First available sprite in fixed preference order, falling back to a
/// placeholder keyed by `name`. Never returns an empty string.
pub fn resolve_image(sprites: &RawSprites, name: &str) -> String {
    let other = sprites.other.as_ref();
    let artwork = other.and_then(|o| o.official_artwork.as_ref());
    let home = other.and_then(|o| o.home.as_ref());
    let dream_world = other.and_then(|o| o.dream_world.as_ref());
    let showdown = other.and_then(|o| o.showdown.as_ref());

    let candidates = [
        sprites.front_default.as_ref(),
        sprites.front_shiny.as_ref(),
        sprites.back_default.as_ref(),
        sprites.back_shiny.as_ref(),
        artwork.and_then(|s| s.front_default.as_ref()),
        artwork.and_then(|s| s.front_shiny.as_ref()),
        home.and_then(|s| s.front_default.as_ref()),
        home.and_then(|s| s.front_shiny.as_ref()),
        dream_world.and_then(|s| s.front_default.as_ref()),
        showdown.and_then(|s| s.front_default.as_ref()),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .cloned()
        .unwrap_or_else(|| placeholder_image(name))
}

pub fn placeholder_image(name: &str) -> String {
    match Url::parse_with_params(PLACEHOLDER_BASE, &[("text", name)]) {
        Ok(url) => url.into(),
        Err(_) => PLACEHOLDER_BASE.to_string(),
    }
}

/// Ability relations in input order. A relation whose URL carries no numeric
/// id is a data integrity error.
pub fn extract_abilities_lite(abilities: &[RawAbilitySlot]) -> Result<Vec<AbilityLite>> {
    abilities
        .iter()
        .map(|a| {
            Ok(AbilityLite {
                id: resource_id(&a.ability.url)?,
                name: a.ability.name.clone(),
                slot: a.slot,
                is_hidden: a.is_hidden,
                url: a.ability.url.clone(),
            })
        })
        .collect()
}

/// Flattens an ability detail payload. English text is taken from the first
/// entry tagged `en`; missing text becomes an empty string. When `relation`
/// is given its slot and hidden flag are carried over.
pub fn normalize_ability(raw: &RawAbility, relation: Option<&AbilityLite>) -> Ability {
    let effect = raw
        .effect_entries
        .iter()
        .find(|e| e.language.name == ENGLISH);
    let flavor = raw
        .flavor_text_entries
        .iter()
        .find(|e| e.language.name == ENGLISH);

    Ability {
        id: raw.id,
        name: raw.name.clone(),
        effect: effect.map(|e| e.effect.clone()).unwrap_or_default(),
        short_effect: effect.map(|e| e.short_effect.clone()).unwrap_or_default(),
        flavor_text: flavor.map(|f| f.flavor_text.clone()).unwrap_or_default(),
        generation: raw
            .generation
            .as_ref()
            .map(|g| g.name.clone())
            .unwrap_or_default(),
        slot: relation.map(|r| r.slot),
        is_hidden: relation.map(|r| r.is_hidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CatalogError;
    use crate::testutils::pokemon_document;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawPokemon {
        serde_json::from_value(value).unwrap()
    }

    fn sprites(value: serde_json::Value) -> RawSprites {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_is_pure() {
        let raw = raw(pokemon_document(6, "charizard"));
        assert_eq!(normalize_pokemon(&raw), normalize_pokemon(&raw));
    }

    #[test]
    fn test_types_keep_input_order() {
        let raw = raw(json!({
            "id": 6,
            "name": "charizard",
            "types": [
                {"slot": 1, "type": {"name": "fire", "url": "https://pokeapi.co/api/v2/type/10/"}},
                {"slot": 2, "type": {"name": "flying", "url": "https://pokeapi.co/api/v2/type/3/"}}
            ]
        }));
        assert_eq!(extract_types(&raw.types), vec!["fire", "flying"]);
    }

    #[test]
    fn test_stats_default_missing_keys() {
        let raw = raw(json!({
            "id": 25,
            "name": "pikachu",
            "stats": [
                {"base_stat": 35, "stat": {"name": "hp"}},
                {"base_stat": 90, "stat": {"name": "speed"}},
                {"base_stat": 1, "stat": {"name": "accuracy"}}
            ]
        }));

        assert_eq!(
            extract_stats(&raw.stats),
            Stats {
                hp: 35,
                speed: 90,
                ..Stats::default()
            }
        );
    }

    #[test]
    fn test_image_only_artwork_shiny() {
        let sprites = sprites(json!({
            "front_default": null,
            "front_shiny": null,
            "back_default": null,
            "back_shiny": null,
            "other": {
                "official-artwork": {"front_default": null, "front_shiny": "https://img/artwork-shiny.png"},
                "home": {"front_default": null, "front_shiny": null},
                "dream_world": {"front_default": null},
                "showdown": {"front_default": null}
            }
        }));
        assert_eq!(resolve_image(&sprites, "ditto"), "https://img/artwork-shiny.png");
    }

    #[test]
    fn test_image_preference_order() {
        let sprites = sprites(json!({
            "back_shiny": "https://img/back-shiny.png",
            "other": {
                "home": {"front_default": "https://img/home.png"},
                "showdown": {"front_default": "https://img/showdown.png"}
            }
        }));
        assert_eq!(resolve_image(&sprites, "x"), "https://img/back-shiny.png");

        let sprites = sprites_without_top_level();
        assert_eq!(resolve_image(&sprites, "x"), "https://img/dream.png");
    }

    fn sprites_without_top_level() -> RawSprites {
        sprites(json!({
            "front_default": "",
            "other": {
                "dream_world": {"front_default": "https://img/dream.png"},
                "showdown": {"front_default": "https://img/showdown.png"}
            }
        }))
    }

    #[test]
    fn test_image_placeholder() {
        let image = resolve_image(&RawSprites::default(), "mr. mime");
        assert_eq!(image, "https://placehold.co/256x256?text=mr.+mime");
        assert!(!resolve_image(&RawSprites::default(), "").is_empty());
    }

    #[test]
    fn test_abilities_lite() {
        let raw = raw(json!({
            "id": 1,
            "name": "bulbasaur",
            "abilities": [
                {"ability": {"name": "chlorophyll", "url": "https://pokeapi.co/api/v2/ability/34/"}, "is_hidden": true, "slot": 3},
                {"ability": {"name": "overgrow", "url": "https://pokeapi.co/api/v2/ability/65/"}, "is_hidden": false, "slot": 1}
            ]
        }));

        let abilities = extract_abilities_lite(&raw.abilities).unwrap();
        assert_eq!(abilities.len(), 2);
        assert_eq!(abilities[0].id, 34);
        assert_eq!(abilities[0].slot, 3);
        assert!(abilities[0].is_hidden);
        assert_eq!(abilities[1].name, "overgrow");
    }

    #[test]
    fn test_ability_bad_url_is_integrity_error() {
        let raw = raw(json!({
            "id": 1,
            "name": "bulbasaur",
            "abilities": [
                {"ability": {"name": "overgrow", "url": "https://pokeapi.co/api/v2/ability/overgrow/"}, "is_hidden": false, "slot": 1}
            ]
        }));

        assert!(matches!(
            normalize_pokemon(&raw),
            Err(CatalogError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_normalize_ability_english_text() {
        let raw: RawAbility = serde_json::from_value(json!({
            "id": 65,
            "name": "overgrow",
            "effect_entries": [
                {"effect": "Wenn die KP...", "short_effect": "Kurz", "language": {"name": "de"}},
                {"effect": "Strengthens grass moves.", "short_effect": "Grass boost.", "language": {"name": "en"}}
            ],
            "flavor_text_entries": [
                {"flavor_text": "Ups GRASS moves in a pinch.", "language": {"name": "en"}},
                {"flavor_text": "Later text.", "language": {"name": "en"}}
            ],
            "generation": {"name": "generation-iii", "url": "https://pokeapi.co/api/v2/generation/3/"}
        }))
        .unwrap();

        let relation = AbilityLite {
            id: 65,
            name: "overgrow".into(),
            slot: 1,
            is_hidden: false,
            url: "https://pokeapi.co/api/v2/ability/65/".into(),
        };

        let ability = normalize_ability(&raw, Some(&relation));
        assert_eq!(ability.effect, "Strengthens grass moves.");
        assert_eq!(ability.short_effect, "Grass boost.");
        assert_eq!(ability.flavor_text, "Ups GRASS moves in a pinch.");
        assert_eq!(ability.generation, "generation-iii");
        assert_eq!(ability.slot, Some(1));

        let bare = normalize_ability(
            &RawAbility {
                effect_entries: vec![],
                flavor_text_entries: vec![],
                generation: None,
                ..raw
            },
            None,
        );
        assert_eq!(bare.effect, "");
        assert_eq!(bare.flavor_text, "");
        assert_eq!(bare.slot, None);
    }
}
