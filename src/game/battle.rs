use std::fmt;

use serde::{Deserialize, Serialize};

use super::hand::{format_queue, Hand, Queue};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Player,
    Enemy,
    Draw,
}

impl Verdict {
    pub fn of(player: Hand, enemy: Hand) -> Self {
        if player == enemy {
            Verdict::Draw
        } else if player.beats(enemy) {
            Verdict::Player
        } else {
            Verdict::Enemy
        }
    }
}

/// 单回合记录：交手的两只手势、结果，以及淘汰之后双方队列的快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRecord {
    pub round: u32,
    pub player_hand: Hand,
    pub enemy_hand: Hand,
    pub verdict: Verdict,
    pub player_queue: Queue,
    pub enemy_queue: Queue,
}

impl fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self.verdict {
            Verdict::Player => "player wins",
            Verdict::Enemy => "enemy wins",
            Verdict::Draw => "draw",
        };
        write!(
            f,
            "round {}: {} vs {} ({result}) | player: [{}] enemy: [{}]",
            self.round,
            self.player_hand,
            self.enemy_hand,
            format_queue(&self.player_queue),
            format_queue(&self.enemy_queue),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleTally {
    pub rounds: u32,
    pub player_wins: u32,
    pub enemy_wins: u32,
    pub draws: u32,
    // 按剩余队列长度判定，不看回合胜场。
    pub winner: Verdict,
    pub player_damage_dealt: u32,
    pub enemy_damage_dealt: u32,
    pub remaining_player: Queue,
    pub remaining_enemy: Queue,
}

/// 逐回合淘汰。每回合至少移除一个队首，最多 `player.len() + enemy.len()` 回合。
#[derive(Debug, Clone)]
pub struct Rounds {
    player: Queue,
    enemy: Queue,
    round: u32,
    player_wins: u32,
    enemy_wins: u32,
    draws: u32,
}

impl Rounds {
    pub fn new(player: Queue, enemy: Queue) -> Self {
        Self {
            player,
            enemy,
            round: 0,
            player_wins: 0,
            enemy_wins: 0,
            draws: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.player.is_empty() || self.enemy.is_empty()
    }

    pub fn finish(mut self) -> BattleTally {
        self.by_ref().for_each(drop);

        let player_left = self.player.len();
        let enemy_left = self.enemy.len();
        let winner = match player_left.cmp(&enemy_left) {
            std::cmp::Ordering::Greater => Verdict::Player,
            std::cmp::Ordering::Less => Verdict::Enemy,
            std::cmp::Ordering::Equal => Verdict::Draw,
        };

        BattleTally {
            rounds: self.round,
            player_wins: self.player_wins,
            enemy_wins: self.enemy_wins,
            draws: self.draws,
            winner,
            player_damage_dealt: player_left as u32,
            enemy_damage_dealt: enemy_left as u32,
            remaining_player: self.player,
            remaining_enemy: self.enemy,
        }
    }
}

impl Iterator for Rounds {
    type Item = RoundRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let player_hand = *self.player.front()?;
        let enemy_hand = *self.enemy.front()?;
        let verdict = Verdict::of(player_hand, enemy_hand);

        match verdict {
            Verdict::Player => {
                self.enemy.pop_front();
                self.player_wins += 1;
            }
            Verdict::Enemy => {
                self.player.pop_front();
                self.enemy_wins += 1;
            }
            Verdict::Draw => {
                self.player.pop_front();
                self.enemy.pop_front();
                self.draws += 1;
            }
        }
        self.round += 1;

        Some(RoundRecord {
            round: self.round,
            player_hand,
            enemy_hand,
            verdict,
            player_queue: self.player.clone(),
            enemy_queue: self.enemy.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_finished() {
            return (0, Some(0));
        }
        (1, Some(self.player.len() + self.enemy.len()))
    }
}

impl std::iter::FusedIterator for Rounds {}

/// 一次性结算整场战斗，传入的队列不会被修改。
pub fn resolve(player: &Queue, enemy: &Queue) -> (BattleTally, Vec<RoundRecord>) {
    let mut rounds = Rounds::new(player.clone(), enemy.clone());
    let records: Vec<RoundRecord> = rounds.by_ref().collect();
    (rounds.finish(), records)
}
