use std::collections::VecDeque;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub type Queue = VecDeque<Hand>;

/// 手势。`Masked` 只出现在展示给玩家的敌方队列里，从不参与结算。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Rock,
    Scissors,
    Paper,
    Masked,
}

impl Hand {
    pub const PLAYABLE: [Hand; 3] = [Hand::Rock, Hand::Scissors, Hand::Paper];

    pub fn is_masked(self) -> bool {
        matches!(self, Hand::Masked)
    }

    pub fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Scissors, Hand::Paper) | (Hand::Paper, Hand::Rock)
        )
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Hand::Rock => "👊🏻",
            Hand::Scissors => "✌🏻",
            Hand::Paper => "🖐🏻",
            Hand::Masked => "❓",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

pub fn format_queue(queue: &Queue) -> String {
    queue
        .iter()
        .map(|hand| hand.glyph())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 发牌来源。测试里可以换成固定脚本。
pub trait HandSource {
    fn next_hand(&mut self) -> Hand;

    fn fill(&mut self, len: usize) -> Queue {
        (0..len).map(|_| self.next_hand()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct HandGenerator<R = SmallRng> {
    rng: R,
}

impl<R: Rng> HandGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl HandGenerator<SmallRng> {
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl Default for HandGenerator<SmallRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> HandSource for HandGenerator<R> {
    fn next_hand(&mut self) -> Hand {
        Hand::PLAYABLE[self.rng.gen_range(0..Hand::PLAYABLE.len())]
    }
}

/// 循环发出固定脚本，空脚本一直发石头。
#[derive(Debug, Clone, Default)]
pub struct ScriptedHands {
    script: Vec<Hand>,
    cursor: usize,
}

impl ScriptedHands {
    pub fn new(script: impl IntoIterator<Item = Hand>) -> Self {
        Self {
            script: script.into_iter().filter(|hand| !hand.is_masked()).collect(),
            cursor: 0,
        }
    }
}

impl HandSource for ScriptedHands {
    fn next_hand(&mut self) -> Hand {
        if self.script.is_empty() {
            return Hand::Rock;
        }
        let hand = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        hand
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn beats_is_a_cycle() {
        assert!(Hand::Rock.beats(Hand::Scissors));
        assert!(Hand::Scissors.beats(Hand::Paper));
        assert!(Hand::Paper.beats(Hand::Rock));

        for hand in Hand::PLAYABLE {
            assert!(!hand.beats(hand), "{hand:?} must not beat itself");
        }
        assert!(!Hand::Scissors.beats(Hand::Rock));
        assert!(!Hand::Rock.beats(Hand::Paper));
    }

    #[test]
    fn generator_never_deals_masked_and_covers_alphabet() {
        let mut generator = HandGenerator::with_seed(7);
        let dealt = generator.fill(300);
        assert_eq!(dealt.len(), 300);
        assert!(dealt.iter().all(|hand| !hand.is_masked()));

        let distinct: HashSet<Hand> = dealt.into_iter().collect();
        assert_eq!(distinct.len(), 3, "all three hands should show up");
    }

    #[test]
    fn fill_zero_is_empty() {
        let mut generator = HandGenerator::with_seed(1);
        assert!(generator.fill(0).is_empty());
    }

    #[test]
    fn same_seed_same_hands() {
        let a = HandGenerator::with_seed(42).fill(16);
        let b = HandGenerator::with_seed(42).fill(16);
        assert_eq!(a, b);
    }

    #[test]
    fn scripted_hands_wrap_and_skip_masked() {
        let mut source = ScriptedHands::new([Hand::Paper, Hand::Masked, Hand::Rock]);
        let dealt: Vec<Hand> = source.fill(5).into_iter().collect();
        assert_eq!(
            dealt,
            vec![Hand::Paper, Hand::Rock, Hand::Paper, Hand::Rock, Hand::Paper]
        );
    }

    #[test]
    fn hand_serializes_lowercase() {
        let json = serde_json::to_string(&Hand::Scissors).expect("hand should serialize");
        assert_eq!(json, "\"scissors\"");
    }
}
