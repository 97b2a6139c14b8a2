use serde::{Deserialize, Serialize};

use super::battle::Verdict;
use super::config::GameConfig;
use super::hand::Queue;
use super::swap::SwapSelection;

/// 对战阶段。`Battling` 只在一次同步结算内部短暂出现。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BattlePhase {
    Setup,
    Battling,
    Victory,
    Defeat,
    Stalemate,
}

impl Default for BattlePhase {
    fn default() -> Self {
        Self::Setup
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SessionEvent {
    GameReset {
        player_hp: u32,
        enemy_hp: u32,
    },
    SlotsGenerated {
        level: u32,
        player_slots: usize,
        enemy_slots: usize,
        masked: usize,
    },
    SwapApplied {
        first: usize,
        second: usize,
        swaps_left: u32,
    },
    BattleStarted {
        level: u32,
        player_hp: u32,
        max_player_hp: u32,
        enemy_hp: u32,
        max_enemy_hp: u32,
    },
    DamageApplied {
        dealt_by_player: u32,
        dealt_by_enemy: u32,
        player_hp: u32,
        enemy_hp: u32,
        winner: Verdict,
    },
    PlayerDefeated {
        level: u32,
    },
    EnemyDefeated {
        level: u32,
    },
    BattleStalemate {
        player_hp: u32,
        enemy_hp: u32,
    },
    LevelAdvanced {
        level: u32,
        max_enemy_hp: u32,
        max_player_hp: u32,
    },
    SubBattlePrepared {
        level: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    InvalidLevel,
    ConflictingFlags,
    PhaseMismatch {
        phase: BattlePhase,
        expected: BattlePhase,
    },
    HpAboveMax { side: Verdict, value: u32, max: u32 },
    MaskedInTrueQueue,
    SwapsAboveBudget { value: u32, max: u32 },
    InvalidSelection { picked: Vec<usize>, queue_len: usize },
}

/// 跨战斗保存的进度状态，只由 `SessionController` 修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub level: u32,
    pub player_hp: u32,
    pub max_player_hp: u32,
    pub enemy_hp: u32,
    pub max_enemy_hp: u32,
    pub swaps_left: u32,
    pub max_swaps: u32,
    pub game_over: bool,
    pub can_continue: bool,
    pub ready_for_next_level: bool,
    #[serde(default)]
    pub phase: BattlePhase,
    #[serde(default)]
    pub player_queue: Queue,
    #[serde(default)]
    pub enemy_queue: Queue,
    #[serde(default)]
    pub masked_enemy_queue: Queue,
    #[serde(default)]
    pub masks_revealed: bool,
    #[serde(default)]
    pub selection: SwapSelection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<SessionEvent>,
}

impl SessionState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            level: 1,
            player_hp: config.max_player_hp(1),
            max_player_hp: config.max_player_hp(1),
            enemy_hp: config.max_enemy_hp(1),
            max_enemy_hp: config.max_enemy_hp(1),
            swaps_left: config.max_swaps,
            max_swaps: config.max_swaps,
            game_over: false,
            can_continue: false,
            ready_for_next_level: false,
            phase: BattlePhase::Setup,
            player_queue: Queue::new(),
            enemy_queue: Queue::new(),
            masked_enemy_queue: Queue::new(),
            masks_revealed: false,
            selection: SwapSelection::new(),
            event_log: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: SessionEvent) {
        self.event_log.push(event);
    }

    pub fn enemy_display(&self) -> &Queue {
        if self.masks_revealed {
            &self.enemy_queue
        } else {
            &self.masked_enemy_queue
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level,
            player_hp: self.player_hp,
            max_player_hp: self.max_player_hp,
            enemy_hp: self.enemy_hp,
            max_enemy_hp: self.max_enemy_hp,
            swaps_left: self.swaps_left,
            max_swaps: self.max_swaps,
            game_over: self.game_over,
            can_continue: self.can_continue,
            ready_for_next_level: self.ready_for_next_level,
            phase: self.phase,
            player_queue: self.player_queue.clone(),
            enemy_display: self.enemy_display().clone(),
            selected: self.selection.indices(),
        }
    }

    /// 阶段由结算标志唯一决定，`Battling` 不会出现在两次操作之间。
    fn expected_phase(&self) -> BattlePhase {
        if self.game_over {
            BattlePhase::Defeat
        } else if self.ready_for_next_level {
            BattlePhase::Victory
        } else if self.can_continue {
            BattlePhase::Stalemate
        } else {
            BattlePhase::Setup
        }
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.level == 0 {
            return Err(IntegrityError::InvalidLevel);
        }
        let flags_set = [self.game_over, self.ready_for_next_level, self.can_continue]
            .into_iter()
            .filter(|flag| *flag)
            .count();
        if flags_set > 1 {
            return Err(IntegrityError::ConflictingFlags);
        }
        let expected = self.expected_phase();
        if self.phase != expected {
            return Err(IntegrityError::PhaseMismatch {
                phase: self.phase,
                expected,
            });
        }
        if self.player_hp > self.max_player_hp {
            return Err(IntegrityError::HpAboveMax {
                side: Verdict::Player,
                value: self.player_hp,
                max: self.max_player_hp,
            });
        }
        if self.enemy_hp > self.max_enemy_hp {
            return Err(IntegrityError::HpAboveMax {
                side: Verdict::Enemy,
                value: self.enemy_hp,
                max: self.max_enemy_hp,
            });
        }
        if self.swaps_left > self.max_swaps {
            return Err(IntegrityError::SwapsAboveBudget {
                value: self.swaps_left,
                max: self.max_swaps,
            });
        }
        let masked_in_truth = self
            .player_queue
            .iter()
            .chain(self.enemy_queue.iter())
            .any(|hand| hand.is_masked());
        if masked_in_truth {
            return Err(IntegrityError::MaskedInTrueQueue);
        }
        if !self.selection.fits(self.player_queue.len()) {
            return Err(IntegrityError::InvalidSelection {
                picked: self.selection.indices(),
                queue_len: self.player_queue.len(),
            });
        }
        Ok(())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub level: u32,
    pub player_hp: u32,
    pub max_player_hp: u32,
    pub enemy_hp: u32,
    pub max_enemy_hp: u32,
    pub swaps_left: u32,
    pub max_swaps: u32,
    pub game_over: bool,
    pub can_continue: bool,
    pub ready_for_next_level: bool,
    pub phase: BattlePhase,
    pub player_queue: Queue,
    pub enemy_display: Queue,
    pub selected: Vec<usize>,
}
