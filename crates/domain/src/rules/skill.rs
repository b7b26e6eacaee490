//! The 33 skills and the group each one belongs to.

use super::Characteristic;

rules_enum! {
    /// A trainable skill.
    Skill, "skill" {
        // Reflex
        Acrobatics => ("acrobatics", "Acrobatics"),
        Evasion => ("evasion", "Evasion"),
        Reaction => ("reaction", "Reaction"),
        Stealth => ("stealth", "Stealth"),
        // Dexterity
        Archery => ("archery", "Archery"),
        Finesse => ("finesse", "Finesse"),
        SleightOfHand => ("sleight_of_hand", "Sleight of Hand"),
        Throwing => ("throwing", "Throwing"),
        // Body
        Athletics => ("athletics", "Athletics"),
        Brawling => ("brawling", "Brawling"),
        Might => ("might", "Might"),
        Resistance => ("resistance", "Resistance"),
        // Willpower
        Composure => ("composure", "Composure"),
        Courage => ("courage", "Courage"),
        Discipline => ("discipline", "Discipline"),
        Spirit => ("spirit", "Spirit"),
        // Magic
        Arcana => ("arcana", "Arcana"),
        Channeling => ("channeling", "Channeling"),
        Ritual => ("ritual", "Ritual"),
        Warding => ("warding", "Warding"),
        // Presence
        Deception => ("deception", "Deception"),
        Intimidation => ("intimidation", "Intimidation"),
        Leadership => ("leadership", "Leadership"),
        Performance => ("performance", "Performance"),
        Persuasion => ("persuasion", "Persuasion"),
        // Wisdom
        Insight => ("insight", "Insight"),
        Lore => ("lore", "Lore"),
        Medicine => ("medicine", "Medicine"),
        Perception => ("perception", "Perception"),
        Survival => ("survival", "Survival"),
        // Tech
        Alchemy => ("alchemy", "Alchemy"),
        Crafting => ("crafting", "Crafting"),
        Engineering => ("engineering", "Engineering"),
    }
}

impl Skill {
    /// The characteristic group whose milestone feeds this skill.
    pub fn group(self) -> Characteristic {
        use Skill::*;
        match self {
            Acrobatics | Evasion | Reaction | Stealth => Characteristic::Reflex,
            Archery | Finesse | SleightOfHand | Throwing => Characteristic::Dexterity,
            Athletics | Brawling | Might | Resistance => Characteristic::Body,
            Composure | Courage | Discipline | Spirit => Characteristic::Willpower,
            Arcana | Channeling | Ritual | Warding => Characteristic::Magic,
            Deception | Intimidation | Leadership | Performance | Persuasion => {
                Characteristic::Presence
            }
            Insight | Lore | Medicine | Perception | Survival => Characteristic::Wisdom,
            Alchemy | Crafting | Engineering => Characteristic::Tech,
        }
    }
}
