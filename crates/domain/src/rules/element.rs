//! Elemental intensities.

rules_enum! {
    /// An elemental aptitude. Intensities behave like Magic-linked skills but
    /// resolve to a damage die rather than a flat bonus.
    Element, "element" {
        Fire => ("fire", "Fire"),
        Water => ("water", "Water"),
        Earth => ("earth", "Earth"),
        Wind => ("wind", "Wind"),
        Lightning => ("lightning", "Lightning"),
        Moon => ("moon", "Moon"),
        Sun => ("sun", "Sun"),
        Ki => ("ki", "Ki"),
    }
}

impl Element {
    /// Intensities draw on the Magic group.
    pub fn group(self) -> super::Characteristic {
        super::Characteristic::Magic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_elements() {
        assert_eq!(Element::ALL.len(), 8);
        assert_eq!("KI".parse::<Element>().ok(), Some(Element::Ki));
    }
}
