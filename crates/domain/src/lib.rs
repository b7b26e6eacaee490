//! SheetWright domain: rules tables, formula library and the aggregator.
//!
//! Everything here is pure and synchronous. Nothing in this crate performs I/O
//! or logs; the engine and the player both link it so that a sheet computed on
//! either side is the same sheet.

pub mod aggregator;
pub mod document;
pub mod edit;
pub mod error;
pub mod formulas;
pub mod ids;
pub mod rules;
pub mod sheet;

pub use aggregator::compute;
pub use document::{CharacterDocument, Entered, Points, SublimationSlot};
pub use edit::DocumentEdit;
pub use error::DomainError;
pub use formulas::IntensityDie;
pub use ids::CharacterId;
pub use rules::{
    Characteristic, Element, LevelSource, RuleKey, RulesCatalog, Skill, SublimationType,
};
pub use sheet::{
    Badges, Budgets, CharacteristicValues, ComputedSheet, IntensityValues, Resources,
    SheetWarning, SkillValues, SublimationSummary, WarningKind,
};
