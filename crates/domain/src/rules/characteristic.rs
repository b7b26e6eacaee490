//! The eight characteristic groups.

use super::Skill;

rules_enum! {
    /// A characteristic group. Each skill belongs to exactly one group and adds
    /// the group's milestone to its base value.
    Characteristic, "characteristic" {
        Reflex => ("reflex", "Reflex"),
        Dexterity => ("dexterity", "Dexterity"),
        Body => ("body", "Body"),
        Willpower => ("willpower", "Willpower"),
        Magic => ("magic", "Magic"),
        Presence => ("presence", "Presence"),
        Wisdom => ("wisdom", "Wisdom"),
        Tech => ("tech", "Tech"),
    }
}

impl Characteristic {
    /// Skills governed by this group, in table order.
    pub fn skills(self) -> impl Iterator<Item = Skill> {
        Skill::ALL.iter().copied().filter(move |skill| skill.group() == self)
    }
}
