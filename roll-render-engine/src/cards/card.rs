use constants::card::REROLL_SENTINEL;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CardId(pub u32);

/// An initiative card. `roll` and `re_roll` hold modified totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    id: CardId,
    pub name: String,
    pub image_src: Option<String>,
    pub modifier: i32,
    pub roll: i32,
    pub re_roll: Option<i32>,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<String>, modifier: i32) -> Self {
        Self {
            id,
            name: name.into(),
            image_src: None,
            modifier,
            roll: 0,
            re_roll: None,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn update_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn update_modifier(&mut self, modifier: i32) {
        self.modifier = modifier;
    }

    pub fn set_picture(&mut self, src: impl Into<String>) {
        self.image_src = Some(src.into());
    }

    pub fn record_roll(&mut self, roll: i32, re_roll: Option<i32>) {
        self.roll = roll;
        self.re_roll = re_roll;
    }

    /// The unmodified die result behind `roll`.
    pub fn roll_display(&self) -> i64 {
        i64::from(self.roll) - i64::from(self.modifier)
    }

    /// The unmodified re-roll, or the sentinel when there was none.
    pub fn reroll_display(&self) -> String {
        match self.re_roll {
            Some(re_roll) => (i64::from(re_roll) - i64::from(self.modifier)).to_string(),
            None => REROLL_SENTINEL.to_string(),
        }
    }

    pub fn view(&self) -> CardView {
        CardView {
            id: self.id,
            name: self.name.clone(),
            image_src: self.image_src.clone(),
            modifier: self.modifier,
            roll: self.roll_display().to_string(),
            re_roll: self.reroll_display(),
        }
    }
}

/// What the editor and the page see of a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub name: String,
    pub image_src: Option<String>,
    pub modifier: i32,
    pub roll: String,
    pub re_roll: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn roll_display_removes_modifier() {
        let mut card = Card::new(CardId(0), "Rogue", 4);
        card.record_roll(17, None);
        assert_eq!(card.roll_display(), 13);
        assert_eq!(card.reroll_display(), "x");
    }

    #[test]
    fn reroll_display_removes_modifier_when_set() {
        let mut card = Card::new(CardId(0), "Fighter", -2);
        card.record_roll(9, Some(0));
        assert_eq!(card.reroll_display(), "2");
    }

    #[test]
    fn zero_reroll_is_a_recorded_reroll() {
        let mut card = Card::new(CardId(0), "Cleric", 3);
        card.record_roll(12, Some(0));
        assert_eq!(card.reroll_display(), "-3");
        assert_ne!(card.reroll_display(), REROLL_SENTINEL);
        assert_eq!(card.view().re_roll, "-3");

        card.record_roll(12, None);
        assert_eq!(card.view().re_roll, REROLL_SENTINEL);
    }

    #[test]
    fn displays_hold_for_arbitrary_integers() {
        let mut rng = StdRng::seed_from_u64(33);
        let mut card = Card::new(CardId(1), "Any", 0);
        for _ in 0..1000 {
            let roll = rng.r#gen::<i32>();
            let modifier = rng.r#gen::<i32>();
            let re_roll = rng.r#gen::<i32>();
            card.update_modifier(modifier);
            card.record_roll(roll, Some(re_roll));

            assert_eq!(card.roll_display(), i64::from(roll) - i64::from(modifier));
            assert_eq!(
                card.reroll_display(),
                (i64::from(re_roll) - i64::from(modifier)).to_string()
            );
        }
        for (modifier, roll) in [(i32::MIN, i32::MAX), (i32::MAX, i32::MIN)] {
            card.update_modifier(modifier);
            card.record_roll(roll, None);
            assert_eq!(card.roll_display(), i64::from(roll) - i64::from(modifier));
        }
    }

    #[test]
    fn view_serialises_for_the_page() {
        let mut card = Card::new(CardId(3), "Cleric", 1);
        card.set_picture("data:image/jpeg;base64,AAAA");
        card.record_roll(12, Some(15));

        let json = serde_json::to_value(card.view()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["roll"], "11");
        assert_eq!(json["re_roll"], "14");
        assert_eq!(json["image_src"], "data:image/jpeg;base64,AAAA");
    }
}
