//! The computed sheet: every derived value of a character.
//!
//! A sheet is a pure function of its document. It is rebuilt in full on every
//! recompute and never patched; storing one is a cache, not a source of truth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::formulas::IntensityDie;
use crate::rules::{Characteristic, Element, LevelSource, Skill, SublimationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicValues {
    pub invested: u32,
    pub score: i32,
    pub milestone: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillValues {
    pub invested: u32,
    pub base_value: i32,
    pub excellence_bonus: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensityValues {
    pub invested: u32,
    pub base_value: i32,
    /// `None` until the intensity has points and a positive base value.
    pub dice_expression: Option<IntensityDie>,
    /// Zero whenever `dice_expression` is `None`.
    pub dice_variance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budgets {
    pub characteristic_points_used: u32,
    pub characteristic_points_max: u32,
    pub skill_points_used: u32,
    pub skill_points_max: u32,
    pub skill_cap: u32,
    pub characteristic_cap: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SublimationSummary {
    pub slots_used: u32,
    pub slots_max: u32,
    pub tier_cap: u32,
    /// Summed (clamped) tiers per type, every type listed.
    pub tiers_by_type: BTreeMap<SublimationType, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub hp_max: i32,
    pub energy_max: i32,
    pub focus_max: i32,
    pub toxin_resist_max: i32,
    pub encumbrance_max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badges {
    pub movement: i32,
    pub initiative: i32,
    pub energy_turns: i32,
    pub condition_dc: i32,
}

/// Why a warning was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The document held something the rules cannot use as-is; it was
    /// normalized (clamped, dropped) before computing.
    InvalidInput,
    /// A value is over a level-based limit. Computation still used it.
    CapViolation,
}

/// A non-fatal problem tied to a document field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetWarning {
    /// Path of the offending field, e.g. `skills.athletics` or `sublimations[2].tier`.
    pub field: String,
    pub kind: WarningKind,
    pub message: String,
}

/// Every derived value for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedSheet {
    pub level: u32,
    pub level_source: LevelSource,
    /// Experience at which the next level starts; only when the level follows xp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_for_next_level: Option<u64>,
    pub characteristics: BTreeMap<Characteristic, CharacteristicValues>,
    pub skills: BTreeMap<Skill, SkillValues>,
    pub intensities: BTreeMap<Element, IntensityValues>,
    pub budgets: Budgets,
    pub sublimations: SublimationSummary,
    pub resources: Resources,
    pub badges: Badges,
    pub warnings: Vec<SheetWarning>,
}

impl ComputedSheet {
    pub fn characteristic(&self, group: Characteristic) -> Option<&CharacteristicValues> {
        self.characteristics.get(&group)
    }

    pub fn skill(&self, skill: Skill) -> Option<&SkillValues> {
        self.skills.get(&skill)
    }

    pub fn intensity(&self, element: Element) -> Option<&IntensityValues> {
        self.intensities.get(&element)
    }

    /// Warnings attached to one field path.
    pub fn warnings_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a SheetWarning> {
        self.warnings.iter().filter(move |w| w.field == field)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Paths of the top-level values that differ between two sheets.
    ///
    /// Used to report divergence between two computations of the same document.
    pub fn differing_sections(&self, other: &ComputedSheet) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.level != other.level || self.level_source != other.level_source {
            sections.push("level");
        }
        if self.xp_for_next_level != other.xp_for_next_level {
            sections.push("xpForNextLevel");
        }
        if self.characteristics != other.characteristics {
            sections.push("characteristics");
        }
        if self.skills != other.skills {
            sections.push("skills");
        }
        if self.intensities != other.intensities {
            sections.push("intensities");
        }
        if self.budgets != other.budgets {
            sections.push("budgets");
        }
        if self.sublimations != other.sublimations {
            sections.push("sublimations");
        }
        if self.resources != other.resources {
            sections.push("resources");
        }
        if self.badges != other.badges {
            sections.push("badges");
        }
        if self.warnings != other.warnings {
            sections.push("warnings");
        }
        sections
    }
}
