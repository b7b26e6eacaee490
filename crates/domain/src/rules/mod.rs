//! Rules tables for the ruleset.
//!
//! Pure data: the eight characteristic groups and their skills, the elemental
//! intensities, the sublimation types, and the level-based constants. Nothing in
//! here computes a derived value; see `formulas` for that.

use serde::{Deserialize, Serialize};

/// Defines a closed vocabulary enum keyed by a stable snake_case string.
///
/// The key is what appears in documents and JSON; the label is for display.
macro_rules! rules_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => ($key:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in table order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable key used in documents.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl $crate::rules::RuleKey for $name {
            const KIND: &'static str = $what;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn key(self) -> &'static str {
                $name::key(self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.key())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::rules::normalize_key(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.key() == wanted || $crate::rules::normalize_key(v.label()) == wanted)
                    .ok_or_else(|| {
                        $crate::error::DomainError::parse(format!("Unknown {}: {}", $what, s))
                    })
            }
        }
    };
}

mod characteristic;
mod element;
mod leveling;
mod skill;
mod sublimation;

pub use characteristic::Characteristic;
pub use element::Element;
pub use leveling::{level_from_xp, xp_for_level, LevelSource};
pub use skill::Skill;
pub use sublimation::SublimationType;

/// Lowest level a character can have.
pub const MIN_LEVEL: u32 = 1;

/// Highest level the ruleset defines caps for.
pub const MAX_LEVEL: u32 = 100;

/// Highest tier a sublimation can have, regardless of level.
pub const MAX_SUBLIMATION_TIER: u32 = 4;

/// Maximum points investable in a single characteristic group.
pub const CHARACTERISTIC_CAP: u32 = 10;

/// Hard ceiling applied while normalizing raw investments.
///
/// Keeps arithmetic bounded for hostile input; real characters never get close.
pub const MAX_INVESTMENT: u32 = 999;

/// Common surface of the keyed rule enums.
pub trait RuleKey: Copy + Ord + std::str::FromStr + 'static {
    /// Singular noun used in warnings ("skill", "element", ...).
    const KIND: &'static str;

    fn all() -> &'static [Self];

    fn key(self) -> &'static str;
}

/// Lowercases and folds spaces/hyphens to underscores so "Sleight of Hand",
/// "sleight-of-hand" and "sleight_of_hand" name the same skill.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

// =============================================================================
// Catalog
// =============================================================================

/// One entry of the catalog: a stable key and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub key: String,
    pub label: String,
}

impl CatalogEntry {
    fn of<K: RuleKey>(value: K, label: &str) -> Self {
        Self {
            key: value.key().to_string(),
            label: label.to_string(),
        }
    }
}

/// A characteristic group together with the skills it governs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGroup {
    pub key: String,
    pub label: String,
    pub skills: Vec<CatalogEntry>,
}

/// Everything a client needs to render pickers without hard-coding the tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesCatalog {
    pub groups: Vec<CatalogGroup>,
    pub elements: Vec<CatalogEntry>,
    pub sublimation_types: Vec<CatalogEntry>,
    pub max_sublimation_tier: u32,
    pub characteristic_cap: u32,
    pub min_level: u32,
    pub max_level: u32,
}

impl RulesCatalog {
    pub fn new() -> Self {
        let groups = Characteristic::ALL
            .iter()
            .map(|group| CatalogGroup {
                key: group.key().to_string(),
                label: group.label().to_string(),
                skills: group
                    .skills()
                    .map(|skill| CatalogEntry::of(skill, skill.label()))
                    .collect(),
            })
            .collect();

        Self {
            groups,
            elements: Element::ALL
                .iter()
                .map(|e| CatalogEntry::of(*e, e.label()))
                .collect(),
            sublimation_types: SublimationType::ALL
                .iter()
                .map(|t| CatalogEntry::of(*t, t.label()))
                .collect(),
            max_sublimation_tier: MAX_SUBLIMATION_TIER,
            characteristic_cap: CHARACTERISTIC_CAP,
            min_level: MIN_LEVEL,
            max_level: MAX_LEVEL,
        }
    }
}

impl Default for RulesCatalog {
    fn default() -> Self {
        Self::new()
    }
}
