//! The raw character document: what the player actually typed.
//!
//! Investments are kept keyed by raw strings so that a document loaded from
//! storage round-trips untouched, including keys the rules no longer know. The
//! aggregator decides what is valid; the document never rejects a value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rules::{Characteristic, Element, RuleKey, Skill, SublimationType};

/// A field as entered: either the expected type or whatever JSON was there.
///
/// Deserializing never fails on a malformed field; the raw JSON is kept so the
/// document round-trips, and the aggregator reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entered<T> {
    Valid(T),
    Malformed(serde_json::Value),
}

impl<T> Entered<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Entered::Valid(value) => Some(value),
            Entered::Malformed(_) => None,
        }
    }

    /// A missing field.
    pub fn missing() -> Self {
        Entered::Malformed(serde_json::Value::Null)
    }
}

impl<T> From<T> for Entered<T> {
    fn from(value: T) -> Self {
        Entered::Valid(value)
    }
}

impl<T: Default> Default for Entered<T> {
    fn default() -> Self {
        Entered::Valid(T::default())
    }
}

/// Points invested in a characteristic, skill or intensity.
pub type Points = Entered<i64>;

/// One equipped sublimation row as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SublimationSlot {
    /// Sublimation type key (see [`SublimationType`]).
    #[serde(rename = "type", default = "Entered::missing")]
    pub kind: Entered<String>,
    /// Tier as entered. Valid tiers are 0..=4.
    #[serde(default)]
    pub tier: Entered<i64>,
    /// Target skill key, only meaningful for Excellence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<Entered<String>>,
}

impl SublimationSlot {
    pub fn new(kind: SublimationType, tier: i64) -> Self {
        Self {
            kind: kind.key().to_string().into(),
            tier: tier.into(),
            skill: None,
        }
    }

    /// An Excellence sublimation aimed at `skill`.
    pub fn excellence(skill: Skill, tier: i64) -> Self {
        Self {
            kind: SublimationType::Excellence.key().to_string().into(),
            tier: tier.into(),
            skill: Some(skill.key().to_string().into()),
        }
    }

    /// Target skill key when it was entered as text.
    pub fn skill_key(&self) -> Option<&str> {
        self.skill.as_ref().and_then(Entered::valid).map(String::as_str)
    }
}

/// A character as stored and edited.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub biography: String,
    /// Level entered on the sheet. `None` derives the level from `xp`.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub characteristics: BTreeMap<String, Points>,
    #[serde(default)]
    pub skills: BTreeMap<String, Points>,
    #[serde(default)]
    pub intensities: BTreeMap<String, Points>,
    #[serde(default)]
    pub sublimations: Vec<SublimationSlot>,
}

impl CharacterDocument {
    /// A fresh level-1 character with every investment listed at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Some(1),
            characteristics: zeroed::<Characteristic>(),
            skills: zeroed::<Skill>(),
            intensities: zeroed::<Element>(),
            ..Self::default()
        }
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Typed setters
    // ──────────────────────────────────────────────────────────────────────────

    pub fn set_characteristic(&mut self, group: Characteristic, points: i64) {
        self.characteristics.insert(group.key().to_string(), points.into());
    }

    pub fn set_skill(&mut self, skill: Skill, points: i64) {
        self.skills.insert(skill.key().to_string(), points.into());
    }

    pub fn set_intensity(&mut self, element: Element, points: i64) {
        self.intensities.insert(element.key().to_string(), points.into());
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Builder-style methods (consume self, return new instance)
    // ──────────────────────────────────────────────────────────────────────────

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_xp(mut self, xp: u64) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_characteristic(mut self, group: Characteristic, points: i64) -> Self {
        self.set_characteristic(group, points);
        self
    }

    pub fn with_skill(mut self, skill: Skill, points: i64) -> Self {
        self.set_skill(skill, points);
        self
    }

    pub fn with_intensity(mut self, element: Element, points: i64) -> Self {
        self.set_intensity(element, points);
        self
    }

    pub fn with_sublimation(mut self, slot: SublimationSlot) -> Self {
        self.sublimations.push(slot);
        self
    }
}

fn zeroed<K: RuleKey>() -> BTreeMap<String, Points> {
    K::all().iter().map(|k| (k.key().to_string(), Points::Valid(0))).collect()
}
