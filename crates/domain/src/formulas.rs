//! Formula library.
//!
//! Every derived number on a character sheet comes from one of these functions.
//! They are pure: no I/O and no state. The aggregator bounds their inputs and
//! composes them; nothing else re-derives a formula.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score of a characteristic before milestones: every group starts at 4.
pub fn score(invested: u32) -> i32 {
    to_i32(invested).saturating_add(4)
}

/// Ability modifier of a score: `floor((score - 10) / 2)`. Negative below 10.
pub fn milestone(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Milestones only ever help resources and badges.
pub fn positive_milestone(milestone: i32) -> i32 {
    milestone.max(0)
}

/// Excellence bonus a skill receives from its sublimations.
///
/// Never exceeds what the player invested in the skill itself, so a skill
/// cannot be carried entirely by equipment.
pub fn excellence_bonus(invested: u32, sublimation_tiers: u32) -> u32 {
    invested.min(sublimation_tiers)
}

/// Base value of a skill. The group milestone is applied signed.
pub fn skill_base(invested: u32, excellence_bonus: u32, group_milestone: i32) -> i32 {
    to_i32(invested) + to_i32(excellence_bonus) + group_milestone
}

/// Maximum points per skill at a level.
pub fn skill_cap_for_level(level: u32) -> u32 {
    match level {
        0..=9 => 3,
        10..=19 => 4,
        20..=29 => 5,
        30..=39 => 6,
        40..=49 => 7,
        _ => 8,
    }
}

/// Total characteristic points available at a level.
pub fn characteristic_point_budget(level: u32) -> u32 {
    22 + (level.saturating_sub(1) / 9) * 3
}

/// Total skill points available at a level.
pub fn skill_point_budget(level: u32) -> u32 {
    40 + level.saturating_sub(1) * 2
}

/// Number of sublimations a character can equip.
pub fn sublimation_slot_budget(presence_milestone: i32, level: u32) -> u32 {
    let from_presence = u32::try_from(positive_milestone(presence_milestone)).unwrap_or(0);
    from_presence * 2 + level / 10
}

/// Highest sublimation tier allowed at a level.
pub fn sublimation_tier_cap(level: u32) -> u32 {
    level.div_ceil(25)
}

/// Level-ups taken so far (`U` in the resource formulas).
pub fn level_ups(level: u32) -> i32 {
    to_i32(level.saturating_sub(1))
}

// =============================================================================
// Resources and badges
// =============================================================================
//
// Milestone arguments are raw (possibly negative) milestones; each formula
// applies `positive_milestone` itself. Sublimation arguments are summed tiers.

pub fn hp_max(level: u32, body: i32, willpower: i32, defense: u32) -> i32 {
    100 + level_ups(level)
        + 12 * positive_milestone(body)
        + 6 * positive_milestone(willpower)
        + 12 * to_i32(defense)
}

pub fn energy_max(level: u32, willpower: i32, magic: i32, endurance: u32) -> i32 {
    5 + level_ups(level) / 5
        + 2 * positive_milestone(willpower)
        + 4 * positive_milestone(magic)
        + 2 * to_i32(endurance)
}

pub fn focus_max(level: u32, willpower: i32, wisdom: i32, presence: i32, clarity: u32) -> i32 {
    2 + level_ups(level) / 5
        + positive_milestone(willpower)
        + positive_milestone(wisdom)
        + positive_milestone(presence)
        + to_i32(clarity)
}

pub fn movement(dexterity: i32, reflex: i32, speed: u32) -> i32 {
    4 + positive_milestone(dexterity) + positive_milestone(reflex) + to_i32(speed)
}

/// Initiative builds on movement, so Reflex counts twice.
pub fn initiative(movement: i32, reflex: i32) -> i32 {
    movement + positive_milestone(reflex)
}

/// Energy Turns (ET).
pub fn energy_turns(level: u32, magic: i32) -> i32 {
    1 + level_ups(level) / 9 + positive_milestone(magic)
}

pub fn condition_dc(level: u32, devastation: u32) -> i32 {
    6 + to_i32(level / 10) + to_i32(devastation)
}

/// Toxin resistance from the Resistance and Alchemy base values.
///
/// Negative base values contribute nothing.
pub fn toxin_resist_max(resistance_base: i32, alchemy_base: i32) -> i32 {
    resistance_base.max(0) + alchemy_base.max(0)
}

/// Weight of Athletics in the encumbrance formula.
pub const ENCUMBRANCE_ATHLETICS_WEIGHT: i32 = 5;

/// Weight of Spirit in the encumbrance formula.
pub const ENCUMBRANCE_SPIRIT_WEIGHT: i32 = 2;

/// Carrying capacity from the Athletics and Spirit base values.
///
/// Negative base values contribute nothing.
pub fn encumbrance_max(athletics_base: i32, spirit_base: i32) -> i32 {
    10 + athletics_base.max(0) * ENCUMBRANCE_ATHLETICS_WEIGHT
        + spirit_base.max(0) * ENCUMBRANCE_SPIRIT_WEIGHT
}

// =============================================================================
// Intensity dice
// =============================================================================

/// Damage die rolled for an elemental intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntensityDie {
    #[serde(rename = "1d4")]
    D4,
    #[serde(rename = "1d6")]
    D6,
    #[serde(rename = "1d8")]
    D8,
    #[serde(rename = "1d10")]
    D10,
    #[serde(rename = "1d12")]
    D12,
}

impl IntensityDie {
    /// Die size (sides).
    pub fn sides(self) -> u32 {
        match self {
            IntensityDie::D4 => 4,
            IntensityDie::D6 => 6,
            IntensityDie::D8 => 8,
            IntensityDie::D10 => 10,
            IntensityDie::D12 => 12,
        }
    }

    /// Variance step shown next to the die.
    pub fn variance(self) -> u32 {
        self.sides() / 2
    }

    /// Dice notation, e.g. `1d8`.
    pub fn expression(self) -> String {
        format!("1d{}", self.sides())
    }
}

impl fmt::Display for IntensityDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1d{}", self.sides())
    }
}

/// Die for an intensity base value. `None` when the base value is not positive.
pub fn intensity_die(base_value: i32) -> Option<IntensityDie> {
    match base_value {
        i32::MIN..=0 => None,
        1..=7 => Some(IntensityDie::D4),
        8..=11 => Some(IntensityDie::D6),
        12..=15 => Some(IntensityDie::D8),
        16..=17 => Some(IntensityDie::D10),
        _ => Some(IntensityDie::D12),
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
