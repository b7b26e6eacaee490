//! Sublimation types.

rules_enum! {
    /// Kind of an equipped sublimation. Only `Excellence` targets a skill.
    SublimationType, "sublimation type" {
        Excellence => ("excellence", "Excellence"),
        Defense => ("defense", "Defense"),
        Endurance => ("endurance", "Endurance"),
        Clarity => ("clarity", "Clarity"),
        Speed => ("speed", "Speed"),
        Devastation => ("devastation", "Devastation"),
        Precision => ("precision", "Precision"),
        Fortune => ("fortune", "Fortune"),
    }
}

impl SublimationType {
    /// Whether rows of this type carry a target skill.
    pub fn targets_skill(self) -> bool {
        matches!(self, SublimationType::Excellence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_excellence_targets_a_skill() {
        let targeting: Vec<_> = SublimationType::ALL
            .iter()
            .filter(|t| t.targets_skill())
            .collect();
        assert_eq!(targeting, vec![&SublimationType::Excellence]);
    }
}
