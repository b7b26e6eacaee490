//! Incremental edits to a [`CharacterDocument`].
//!
//! An editing session mutates the document one field at a time; each edit is a
//! value so it can be sent across a channel or logged.

use serde::{Deserialize, Serialize};

use crate::document::{CharacterDocument, SublimationSlot};
use crate::error::DomainError;

/// A single field change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocumentEdit {
    SetName { name: String },
    SetAvatar { avatar: Option<String> },
    SetBiography { biography: String },
    /// `None` hands the level back to the experience curve.
    SetLevel { level: Option<u32> },
    SetXp { xp: u64 },
    SetCharacteristic { key: String, points: i64 },
    SetSkill { key: String, points: i64 },
    SetIntensity { key: String, points: i64 },
    AddSublimation { slot: SublimationSlot },
    UpdateSublimation { index: usize, slot: SublimationSlot },
    RemoveSublimation { index: usize },
}

impl DocumentEdit {
    /// Short name for logs.
    pub fn op(&self) -> &'static str {
        match self {
            DocumentEdit::SetName { .. } => "set_name",
            DocumentEdit::SetAvatar { .. } => "set_avatar",
            DocumentEdit::SetBiography { .. } => "set_biography",
            DocumentEdit::SetLevel { .. } => "set_level",
            DocumentEdit::SetXp { .. } => "set_xp",
            DocumentEdit::SetCharacteristic { .. } => "set_characteristic",
            DocumentEdit::SetSkill { .. } => "set_skill",
            DocumentEdit::SetIntensity { .. } => "set_intensity",
            DocumentEdit::AddSublimation { .. } => "add_sublimation",
            DocumentEdit::UpdateSublimation { .. } => "update_sublimation",
            DocumentEdit::RemoveSublimation { .. } => "remove_sublimation",
        }
    }
}

impl CharacterDocument {
    /// Apply an edit in place.
    ///
    /// Values are stored as given, out-of-range numbers included; only a
    /// sublimation index that does not exist is refused.
    pub fn apply(&mut self, edit: DocumentEdit) -> Result<(), DomainError> {
        match edit {
            DocumentEdit::SetName { name } => self.name = name,
            DocumentEdit::SetAvatar { avatar } => self.avatar = avatar,
            DocumentEdit::SetBiography { biography } => self.biography = biography,
            DocumentEdit::SetLevel { level } => self.level = level,
            DocumentEdit::SetXp { xp } => self.xp = xp,
            DocumentEdit::SetCharacteristic { key, points } => {
                self.characteristics.insert(key, points.into());
            }
            DocumentEdit::SetSkill { key, points } => {
                self.skills.insert(key, points.into());
            }
            DocumentEdit::SetIntensity { key, points } => {
                self.intensities.insert(key, points.into());
            }
            DocumentEdit::AddSublimation { slot } => self.sublimations.push(slot),
            DocumentEdit::UpdateSublimation { index, slot } => {
                let len = self.sublimations.len();
                let row = self
                    .sublimations
                    .get_mut(index)
                    .ok_or_else(|| DomainError::sublimation_index(index, len))?;
                *row = slot;
            }
            DocumentEdit::RemoveSublimation { index } => {
                if index >= self.sublimations.len() {
                    return Err(DomainError::sublimation_index(
                        index,
                        self.sublimations.len(),
                    ));
                }
                self.sublimations.remove(index);
            }
        }
        Ok(())
    }
}
