use serde::{Deserialize, Serialize};

/// Raw filter inputs as entered by the user. Any number of them may be set at
/// once; [`QueryContext::resolve`] picks the one that wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct QueryInputs {
    pub search: Option<String>,
    pub special: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub pokedex: Option<String>,
    pub region: Option<String>,
}

/// Which filter dimension a context selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Search,
    Special,
    Type,
    Pokedex,
    Region,
    Empty,
}

/// The single active filter. Values are stored trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryContext {
    Search(String),
    Special(String),
    Type(String),
    Pokedex(String),
    Region(String),
    Empty,
}

fn present(input: &Option<String>) -> Option<String> {
    input
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

impl QueryContext {
    /// Priority, highest first: search, special, type, pokedex, region.
    /// Blank or whitespace-only inputs count as unset.
    pub fn resolve(inputs: &QueryInputs) -> Self {
        if let Some(term) = present(&inputs.search) {
            QueryContext::Search(term)
        } else if let Some(tag) = present(&inputs.special) {
            QueryContext::Special(tag)
        } else if let Some(name) = present(&inputs.type_name) {
            QueryContext::Type(name)
        } else if let Some(name) = present(&inputs.pokedex) {
            QueryContext::Pokedex(name)
        } else if let Some(name) = present(&inputs.region) {
            QueryContext::Region(name)
        } else {
            QueryContext::Empty
        }
    }

    pub fn kind(&self) -> ContextKind {
        match self {
            QueryContext::Search(_) => ContextKind::Search,
            QueryContext::Special(_) => ContextKind::Special,
            QueryContext::Type(_) => ContextKind::Type,
            QueryContext::Pokedex(_) => ContextKind::Pokedex,
            QueryContext::Region(_) => ContextKind::Region,
            QueryContext::Empty => ContextKind::Empty,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            QueryContext::Search(v)
            | QueryContext::Special(v)
            | QueryContext::Type(v)
            | QueryContext::Pokedex(v)
            | QueryContext::Region(v) => Some(v),
            QueryContext::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryContext::Empty)
    }

    /// Heading for the result list.
    pub fn title(&self) -> String {
        match self {
            QueryContext::Search(term) => format!("Results for \"{term}\""),
            QueryContext::Special(tag) => format!("{} forms", display_name(tag)),
            QueryContext::Type(name) => format!("{}-type Pokémon", display_name(name)),
            QueryContext::Pokedex(name) => format!("{} Pokédex", display_name(name)),
            QueryContext::Region(name) => format!("Pokémon of {}", display_name(name)),
            QueryContext::Empty => String::new(),
        }
    }
}

/// `original-johto` -> `Original Johto`.
fn display_name(slug: &str) -> String {
    slug.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
