//! Aggregator: turns a [`CharacterDocument`] into a [`ComputedSheet`].
//!
//! `compute` is the only place the formula library is composed. It is total
//! and referentially transparent: malformed input is normalized and reported
//! as a warning, never an error, and the same document always produces the
//! same sheet (all maps are ordered, nothing reads global state).

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::document::{CharacterDocument, Entered, Points, SublimationSlot};
use crate::formulas;
use crate::rules::{
    level_from_xp, xp_for_level, Characteristic, Element, LevelSource, RuleKey, Skill,
    SublimationType, CHARACTERISTIC_CAP, MAX_INVESTMENT, MAX_LEVEL, MAX_SUBLIMATION_TIER,
    MIN_LEVEL,
};
use crate::sheet::{
    Badges, Budgets, CharacteristicValues, ComputedSheet, IntensityValues, Resources,
    SheetWarning, SkillValues, SublimationSummary, WarningKind,
};

/// Compute every derived value of `document`.
pub fn compute(document: &CharacterDocument) -> ComputedSheet {
    let mut warnings = Warnings::default();

    // 1. Level
    let (level, level_source) = resolve_level(document, &mut warnings);
    let xp_for_next_level = match level_source {
        LevelSource::Experience if level < MAX_LEVEL => Some(xp_for_level(level + 1)),
        _ => None,
    };

    // 2. Characteristic scores and milestones
    let invested_groups =
        normalize::<Characteristic>(&document.characteristics, "characteristics", &mut warnings);
    let characteristics: BTreeMap<Characteristic, CharacteristicValues> = invested_groups
        .iter()
        .map(|(group, invested)| {
            let score = formulas::score(*invested);
            let values = CharacteristicValues {
                invested: *invested,
                score,
                milestone: formulas::milestone(score),
            };
            (*group, values)
        })
        .collect();
    let milestone_of = |group: Characteristic| {
        characteristics
            .get(&group)
            .map(|values| values.milestone)
            .unwrap_or_else(|| formulas::milestone(formulas::score(0)))
    };

    // 3. Sublimation tiers per type
    let tier_cap = formulas::sublimation_tier_cap(level);
    let tally = tally_sublimations(&document.sublimations, level, tier_cap, &mut warnings);

    // 4-5. Excellence bonuses and skill base values
    let invested_skills = normalize::<Skill>(&document.skills, "skills", &mut warnings);
    let skills: BTreeMap<Skill, SkillValues> = invested_skills
        .iter()
        .map(|(skill, invested)| {
            let tiers = tally.excellence.get(skill).copied().unwrap_or(0);
            let bonus = formulas::excellence_bonus(*invested, tiers);
            let values = SkillValues {
                invested: *invested,
                base_value: formulas::skill_base(*invested, bonus, milestone_of(skill.group())),
                excellence_bonus: bonus,
            };
            (*skill, values)
        })
        .collect();
    let base_of = |skill: Skill| skills.get(&skill).map(|v| v.base_value).unwrap_or(0);

    // 6. Intensity dice
    let invested_intensities =
        normalize::<Element>(&document.intensities, "intensities", &mut warnings);
    let intensities: BTreeMap<Element, IntensityValues> = invested_intensities
        .iter()
        .map(|(element, invested)| {
            // An element with nothing invested reports zeros across the board.
            let base_value = if *invested > 0 {
                formulas::skill_base(*invested, 0, milestone_of(element.group()))
            } else {
                0
            };
            let dice_expression = if *invested > 0 {
                formulas::intensity_die(base_value)
            } else {
                None
            };
            let values = IntensityValues {
                invested: *invested,
                base_value,
                dice_expression,
                dice_variance: dice_expression.map(|d| d.variance()).unwrap_or(0),
            };
            (*element, values)
        })
        .collect();

    // 7. Budgets, caps and resources
    let budgets = Budgets {
        characteristic_points_used: invested_groups.values().sum(),
        characteristic_points_max: formulas::characteristic_point_budget(level),
        skill_points_used: invested_skills.values().sum::<u32>()
            + invested_intensities.values().sum::<u32>(),
        skill_points_max: formulas::skill_point_budget(level),
        skill_cap: formulas::skill_cap_for_level(level),
        characteristic_cap: CHARACTERISTIC_CAP,
    };
    let sublimations = SublimationSummary {
        slots_used: tally.slots_used,
        slots_max: formulas::sublimation_slot_budget(
            milestone_of(Characteristic::Presence),
            level,
        ),
        tier_cap,
        tiers_by_type: tally.tiers_by_type,
    };
    let tiers = |kind: SublimationType| sublimations.tiers_by_type.get(&kind).copied().unwrap_or(0);

    let resources = Resources {
        hp_max: formulas::hp_max(
            level,
            milestone_of(Characteristic::Body),
            milestone_of(Characteristic::Willpower),
            tiers(SublimationType::Defense),
        ),
        energy_max: formulas::energy_max(
            level,
            milestone_of(Characteristic::Willpower),
            milestone_of(Characteristic::Magic),
            tiers(SublimationType::Endurance),
        ),
        focus_max: formulas::focus_max(
            level,
            milestone_of(Characteristic::Willpower),
            milestone_of(Characteristic::Wisdom),
            milestone_of(Characteristic::Presence),
            tiers(SublimationType::Clarity),
        ),
        toxin_resist_max: formulas::toxin_resist_max(
            base_of(Skill::Resistance),
            base_of(Skill::Alchemy),
        ),
        encumbrance_max: formulas::encumbrance_max(
            base_of(Skill::Athletics),
            base_of(Skill::Spirit),
        ),
    };

    let movement = formulas::movement(
        milestone_of(Characteristic::Dexterity),
        milestone_of(Characteristic::Reflex),
        tiers(SublimationType::Speed),
    );
    let badges = Badges {
        movement,
        initiative: formulas::initiative(movement, milestone_of(Characteristic::Reflex)),
        energy_turns: formulas::energy_turns(level, milestone_of(Characteristic::Magic)),
        condition_dc: formulas::condition_dc(level, tiers(SublimationType::Devastation)),
    };

    // 8. Cap violations
    check_caps(
        level,
        &invested_groups,
        &invested_skills,
        &invested_intensities,
        &budgets,
        &sublimations,
        &mut warnings,
    );

    ComputedSheet {
        level,
        level_source,
        xp_for_next_level,
        characteristics,
        skills,
        intensities,
        budgets,
        sublimations,
        resources,
        badges,
        warnings: warnings.into_vec(),
    }
}

impl CharacterDocument {
    /// Shorthand for [`compute`].
    pub fn compute(&self) -> ComputedSheet {
        compute(self)
    }
}

// =============================================================================
// Steps
// =============================================================================

fn resolve_level(document: &CharacterDocument, warnings: &mut Warnings) -> (u32, LevelSource) {
    match document.level {
        Some(level) if level > MAX_LEVEL => {
            warnings.invalid(
                "level",
                format!("Level {level} is above the maximum of {MAX_LEVEL}; using {MAX_LEVEL}"),
            );
            (MAX_LEVEL, LevelSource::Manual)
        }
        Some(level) if level >= MIN_LEVEL => (level, LevelSource::Manual),
        Some(level) => {
            warnings.invalid(
                "level",
                format!("Level {level} is not valid; level follows experience instead"),
            );
            (level_from_xp(document.xp), LevelSource::Experience)
        }
        None => (level_from_xp(document.xp), LevelSource::Experience),
    }
}

/// Parse raw keys, clamp raw points, and list every key of `K` (zero when absent).
fn normalize<K: RuleKey>(
    raw: &BTreeMap<String, Points>,
    section: &str,
    warnings: &mut Warnings,
) -> BTreeMap<K, u32> {
    let mut invested: BTreeMap<K, u32> = K::all().iter().map(|key| (*key, 0)).collect();
    let mut seen = BTreeSet::new();

    for (raw_key, raw_points) in raw {
        let field = format!("{section}.{raw_key}");
        let Ok(key) = raw_key.parse::<K>() else {
            warnings.invalid(&field, format!("Unknown {} '{raw_key}' ignored", K::KIND));
            continue;
        };
        if !seen.insert(key) {
            warnings.invalid(
                &field,
                format!("Duplicate entry for {} '{}' ignored", K::KIND, key.key()),
            );
            continue;
        }
        let points = read_whole(raw_points, &field, warnings);
        invested.insert(key, clamp_points(points, &field, warnings));
    }

    invested
}

/// Read an entered number. Fractions are truncated, numeric text is parsed,
/// anything else counts as 0; each coercion is reported.
fn read_whole(raw: &Entered<i64>, field: &str, warnings: &mut Warnings) -> i64 {
    let value = match raw {
        Entered::Valid(n) => return *n,
        Entered::Malformed(value) => value,
    };
    match value {
        // Above i64::MAX; the caller's clamp reports it.
        Value::Number(n) if n.is_u64() => i64::MAX,
        Value::Number(n) => {
            let whole = n.as_f64().map(|f| f.trunc() as i64).unwrap_or(0);
            warnings.invalid(field, format!("{n} is not a whole number; using {whole}"));
            whole
        }
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(n) => {
                warnings.invalid(field, format!("Text '{text}' read as {n}"));
                n
            }
            Err(_) => {
                warnings.invalid(field, format!("'{text}' is not a number; using 0"));
                0
            }
        },
        Value::Null => {
            warnings.invalid(field, "Missing value; using 0");
            0
        }
        other => {
            warnings.invalid(field, format!("{other} is not a number; using 0"));
            0
        }
    }
}

fn clamp_points(raw: i64, field: &str, warnings: &mut Warnings) -> u32 {
    if raw < 0 {
        warnings.invalid(field, format!("Negative investment {raw} treated as 0"));
        return 0;
    }
    match u32::try_from(raw) {
        Ok(points) if points <= MAX_INVESTMENT => points,
        _ => {
            warnings.invalid(
                field,
                format!("Investment {raw} is above {MAX_INVESTMENT}; using {MAX_INVESTMENT}"),
            );
            MAX_INVESTMENT
        }
    }
}

#[derive(Debug, Default)]
struct SublimationTally {
    slots_used: u32,
    tiers_by_type: BTreeMap<SublimationType, u32>,
    excellence: BTreeMap<Skill, u32>,
}

fn tally_sublimations(
    rows: &[SublimationSlot],
    level: u32,
    tier_cap: u32,
    warnings: &mut Warnings,
) -> SublimationTally {
    let mut tally = SublimationTally {
        tiers_by_type: SublimationType::ALL.iter().map(|t| (*t, 0)).collect(),
        ..SublimationTally::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let field = format!("sublimations[{index}]");
        let kind = match &row.kind {
            Entered::Valid(raw) => match raw.parse::<SublimationType>() {
                Ok(kind) => kind,
                Err(_) => {
                    warnings.invalid(
                        format!("{field}.type"),
                        format!("Unknown sublimation type '{raw}' ignored"),
                    );
                    continue;
                }
            },
            Entered::Malformed(Value::Null) => {
                warnings.invalid(format!("{field}.type"), "Sublimation has no type; row ignored");
                continue;
            }
            Entered::Malformed(other) => {
                warnings.invalid(
                    format!("{field}.type"),
                    format!("Sublimation type {other} is not text; row ignored"),
                );
                continue;
            }
        };

        let raw_tier = read_whole(&row.tier, &format!("{field}.tier"), warnings);
        let tier = clamp_tier(raw_tier, &field, warnings);
        if tier > tier_cap {
            warnings.over_cap(
                format!("{field}.tier"),
                format!("Tier {tier} exceeds the tier cap of {tier_cap} at level {level}"),
            );
        }

        tally.slots_used += 1;
        *tally.tiers_by_type.entry(kind).or_insert(0) += tier;

        if let Some(Entered::Malformed(raw)) = &row.skill {
            warnings.invalid(
                format!("{field}.skill"),
                format!("Skill {raw} is not text; ignored"),
            );
        }
        let target = row.skill_key().map(str::trim).filter(|s| !s.is_empty());
        match (kind.targets_skill(), target) {
            (true, Some(key)) => match key.parse::<Skill>() {
                Ok(skill) => *tally.excellence.entry(skill).or_insert(0) += tier,
                Err(_) => warnings.invalid(
                    format!("{field}.skill"),
                    format!("Unknown skill '{key}'; sublimation grants no bonus"),
                ),
            },
            // An Excellence row without a target is valid but grants nothing.
            (true, None) | (false, None) => {}
            (false, Some(key)) => warnings.invalid(
                format!("{field}.skill"),
                format!("Only Excellence sublimations target a skill; '{key}' ignored"),
            ),
        }
    }

    tally
}

fn clamp_tier(raw: i64, field: &str, warnings: &mut Warnings) -> u32 {
    if raw < 0 {
        warnings.invalid(
            format!("{field}.tier"),
            format!("Tier {raw} is below 0; using 0"),
        );
        return 0;
    }
    match u32::try_from(raw) {
        Ok(tier) if tier <= MAX_SUBLIMATION_TIER => tier,
        _ => {
            warnings.invalid(
                format!("{field}.tier"),
                format!("Tier {raw} is above {MAX_SUBLIMATION_TIER}; using {MAX_SUBLIMATION_TIER}"),
            );
            MAX_SUBLIMATION_TIER
        }
    }
}

fn check_caps(
    level: u32,
    groups: &BTreeMap<Characteristic, u32>,
    skills: &BTreeMap<Skill, u32>,
    intensities: &BTreeMap<Element, u32>,
    budgets: &Budgets,
    sublimations: &SublimationSummary,
    warnings: &mut Warnings,
) {
    for (group, invested) in groups {
        if *invested > budgets.characteristic_cap {
            warnings.over_cap(
                format!("characteristics.{}", group.key()),
                format!(
                    "{} has {invested} points; the cap is {}",
                    group.label(),
                    budgets.characteristic_cap
                ),
            );
        }
    }
    over_skill_cap(level, "skills", skills, Skill::label, budgets.skill_cap, warnings);
    over_skill_cap(
        level,
        "intensities",
        intensities,
        Element::label,
        budgets.skill_cap,
        warnings,
    );

    if budgets.characteristic_points_used > budgets.characteristic_points_max {
        warnings.over_cap(
            "characteristics",
            format!(
                "{} characteristic points spent; the budget at level {level} is {}",
                budgets.characteristic_points_used, budgets.characteristic_points_max
            ),
        );
    }
    if budgets.skill_points_used > budgets.skill_points_max {
        warnings.over_cap(
            "skills",
            format!(
                "{} skill points spent; the budget at level {level} is {}",
                budgets.skill_points_used, budgets.skill_points_max
            ),
        );
    }
    if sublimations.slots_used > sublimations.slots_max {
        warnings.over_cap(
            "sublimations",
            format!(
                "{} sublimations equipped; {} slots available",
                sublimations.slots_used, sublimations.slots_max
            ),
        );
    }
}

fn over_skill_cap<K: RuleKey>(
    level: u32,
    section: &str,
    invested: &BTreeMap<K, u32>,
    label: impl Fn(K) -> &'static str,
    cap: u32,
    warnings: &mut Warnings,
) {
    for (key, points) in invested {
        if *points > cap {
            warnings.over_cap(
                format!("{section}.{}", key.key()),
                format!(
                    "{} has {points} points; the cap at level {level} is {cap}",
                    label(*key)
                ),
            );
        }
    }
}

/// Warning collector. Order of insertion is the order of the steps above.
#[derive(Debug, Default)]
struct Warnings(Vec<SheetWarning>);

impl Warnings {
    fn invalid(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(field, WarningKind::InvalidInput, message);
    }

    fn over_cap(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(field, WarningKind::CapViolation, message);
    }

    fn push(&mut self, field: impl Into<String>, kind: WarningKind, message: impl Into<String>) {
        self.0.push(SheetWarning {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    fn into_vec(self) -> Vec<SheetWarning> {
        self.0
    }
}
