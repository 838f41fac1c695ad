use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{card::Card, rules::RuleError};

/// 牌堆：剩余未发出的牌，末尾即牌顶。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// A full 52-card deck, shuffled.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::new(Card::standard_set());
        deck.shuffle(rng);
        deck
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    /// Uniform Fisher-Yates permutation of the whole deck.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Result<Card, RuleError> {
        self.cards.pop().ok_or(RuleError::EmptyDeck)
    }

    pub fn return_and_reshuffle<R, I>(&mut self, returned: I, rng: &mut R)
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = Card>,
    {
        self.cards.extend(returned);
        self.shuffle(rng);
    }

    /// Swaps `incoming` into the slot held by `outgoing`, keeping the deck size fixed.
    #[cfg(test)]
    pub(crate) fn exchange(&mut self, outgoing: Card, incoming: Card) -> bool {
        match self.cards.iter().position(|card| *card == outgoing) {
            Some(pos) => {
                self.cards[pos] = incoming;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{Suit, Value};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn shuffled_deck_is_a_permutation_of_the_standard_set() {
        let mut rng = SmallRng::seed_from_u64(7);
        let deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.len(), 52);
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn draw_takes_from_the_end() {
        let ace = Card::new(Value::Ace, Suit::Spades);
        let king = Card::new(Value::King, Suit::Hearts);
        let mut deck = Deck::new(vec![ace, king]);

        assert_eq!(deck.draw(), Ok(king));
        assert_eq!(deck.draw(), Ok(ace));
        assert_eq!(deck.draw(), Err(RuleError::EmptyDeck));
        assert!(deck.is_empty());
    }

    #[test]
    fn returned_cards_join_the_deck() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut deck = Deck::shuffled(&mut rng);
        let drawn: Vec<Card> = (0..5).map(|_| deck.draw().expect("deck has cards")).collect();
        assert_eq!(deck.len(), 47);

        deck.return_and_reshuffle(drawn.clone(), &mut rng);

        assert_eq!(deck.len(), 52);
        assert!(drawn.iter().all(|card| deck.contains(card)));
    }

    #[test]
    fn shuffle_places_cards_uniformly() {
        let cards = vec![
            Card::new(Value::Two, Suit::Clubs),
            Card::new(Value::Three, Suit::Clubs),
            Card::new(Value::Four, Suit::Clubs),
            Card::new(Value::Five, Suit::Clubs),
        ];
        let trials = 24_000;
        let mut counts = [[0u32; 4]; 4];
        let mut rng = SmallRng::seed_from_u64(2024);

        for _ in 0..trials {
            let mut deck = Deck::new(cards.clone());
            deck.shuffle(&mut rng);
            for (position, card) in deck.cards().iter().enumerate() {
                let index = cards
                    .iter()
                    .position(|candidate| candidate == card)
                    .expect("card comes from the input");
                counts[index][position] += 1;
            }
        }

        // expected 6000 per slot, standard deviation ~67
        for row in counts {
            for count in row {
                assert!(
                    (5_600..=6_400).contains(&count),
                    "position frequency {count} is far from uniform"
                );
            }
        }
    }
}
