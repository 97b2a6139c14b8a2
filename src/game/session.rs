use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    battle::{resolve, BattleTally, RoundRecord},
    config::GameConfig,
    hand::{HandGenerator, HandSource, Queue},
    masking::{mask_queue, masked_count},
    state::{BattlePhase, IntegrityError, SessionEvent, SessionSnapshot, SessionState},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    GenerateSlots,
    SelectForSwap,
    Swap,
    StartBattle,
    NextLevel,
    ContinueGame,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionAction::GenerateSlots => "generate_slots",
            SessionAction::SelectForSwap => "select_for_swap",
            SessionAction::Swap => "swap",
            SessionAction::StartBattle => "start_battle",
            SessionAction::NextLevel => "next_level",
            SessionAction::ContinueGame => "continue_game",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SessionError {
    #[error("the game is over, reset to play again")]
    GameOver,
    #[error("both queues need at least one hand to battle")]
    EmptyQueue,
    #[error("{action} is not allowed in phase {phase:?}")]
    InvalidTransition {
        action: SessionAction,
        phase: BattlePhase,
    },
    #[error("slot {index} is out of range for a queue of {len}")]
    SlotOutOfRange { index: usize, len: usize },
    #[error("a swap needs exactly two selected slots, {selected} selected")]
    SwapSelectionIncomplete { selected: usize },
    #[error("no swaps left this battle")]
    NoSwapsLeft,
    #[error("session state is inconsistent: {error:?}")]
    IntegrityViolation { error: IntegrityError },
}

/// 一场战斗的结果，字段与前端展示所需保持一致。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleOutcome {
    #[serde(flatten)]
    pub tally: BattleTally,
    pub player_hp: u32,
    pub enemy_hp: u32,
    pub level: u32,
    pub game_over: bool,
    pub next_level: bool,
    pub can_continue: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub rounds: Vec<RoundRecord>,
    pub events: Vec<SessionEvent>,
}

/// 关卡状态机。被拒绝的操作不会改动状态。
pub struct SessionController<S = HandGenerator> {
    config: GameConfig,
    source: S,
    state: SessionState,
}

impl SessionController<HandGenerator> {
    pub fn new(config: GameConfig) -> Self {
        Self::with_source(config, HandGenerator::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_source(config, HandGenerator::with_seed(seed))
    }
}

impl<S: HandSource> SessionController<S> {
    pub fn with_source(config: GameConfig, source: S) -> Self {
        let state = SessionState::new(&config);
        let mut controller = Self {
            config,
            source,
            state,
        };
        controller.reset_game();
        controller
    }

    pub fn from_state(
        config: GameConfig,
        source: S,
        state: SessionState,
    ) -> Result<Self, SessionError> {
        Self::ensure_integrity(&state)?;
        Ok(Self {
            config,
            source,
            state,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn player_queue(&self) -> &Queue {
        &self.state.player_queue
    }

    pub fn enemy_queue(&self) -> &Queue {
        &self.state.enemy_queue
    }

    pub fn enemy_display(&self) -> &Queue {
        self.state.enemy_display()
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn player_hp(&self) -> u32 {
        self.state.player_hp
    }

    pub fn enemy_hp(&self) -> u32 {
        self.state.enemy_hp
    }

    pub fn swaps_left(&self) -> u32 {
        self.state.swaps_left
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn can_continue(&self) -> bool {
        self.state.can_continue
    }

    fn ensure_integrity(state: &SessionState) -> Result<(), SessionError> {
        state
            .integrity_check()
            .map_err(|error| SessionError::IntegrityViolation { error })
    }

    fn ensure_not_over(&self) -> Result<(), SessionError> {
        if self.state.game_over {
            return Err(SessionError::GameOver);
        }
        Ok(())
    }

    fn ensure_phase(
        &self,
        action: SessionAction,
        expected: BattlePhase,
    ) -> Result<(), SessionError> {
        if self.state.phase != expected {
            return Err(SessionError::InvalidTransition {
                action,
                phase: self.state.phase,
            });
        }
        Ok(())
    }

    fn rejected(action: SessionAction, error: SessionError) -> SessionError {
        warn!(%action, %error, "session action rejected");
        error
    }

    fn deal_slots(&mut self) {
        let level = self.state.level;
        let enemy_len = self.config.enemy_slots(level);

        self.state.player_queue = self.source.fill(self.config.player_slots);
        self.state.enemy_queue = self.source.fill(enemy_len);
        self.state.masked_enemy_queue =
            mask_queue(level, self.config.mask_from_level, &self.state.enemy_queue);
        self.state.masks_revealed = false;
        self.state.swaps_left = self.state.max_swaps;
        self.state.selection.clear();

        let masked = masked_count(level, self.config.mask_from_level, enemy_len);
        debug!(level, enemy_len, masked, "slots dealt");
        self.state.record_event(SessionEvent::SlotsGenerated {
            level,
            player_slots: self.state.player_queue.len(),
            enemy_slots: enemy_len,
            masked,
        });
    }

    fn events_since(&self, from: usize) -> Vec<SessionEvent> {
        self.state.event_log[from..].to_vec()
    }

    pub fn reset_game(&mut self) -> Vec<SessionEvent> {
        self.state = SessionState::new(&self.config);
        self.state.record_event(SessionEvent::GameReset {
            player_hp: self.state.player_hp,
            enemy_hp: self.state.enemy_hp,
        });
        self.deal_slots();
        info!(level = self.state.level, "game reset");
        self.state.event_log.clone()
    }

    pub fn generate_random_slots(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let action = SessionAction::GenerateSlots;
        self.ensure_not_over()
            .and_then(|_| self.ensure_phase(action, BattlePhase::Setup))
            .map_err(|error| Self::rejected(action, error))?;

        self.state.event_log.clear();
        self.deal_slots();
        Ok(self.state.event_log.clone())
    }

    pub fn select_for_swap(&mut self, index: usize) -> Result<(), SessionError> {
        let action = SessionAction::SelectForSwap;
        self.ensure_not_over()
            .and_then(|_| self.ensure_phase(action, BattlePhase::Setup))
            .map_err(|error| Self::rejected(action, error))?;

        let len = self.state.player_queue.len();
        if index >= len {
            return Err(Self::rejected(action, SessionError::SlotOutOfRange { index, len }));
        }
        self.state.selection.toggle(index);
        Ok(())
    }

    pub fn swap(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let action = SessionAction::Swap;
        self.ensure_not_over()
            .and_then(|_| self.ensure_phase(action, BattlePhase::Setup))
            .map_err(|error| Self::rejected(action, error))?;

        let (first, second) = self.state.selection.pair().ok_or_else(|| {
            Self::rejected(
                action,
                SessionError::SwapSelectionIncomplete {
                    selected: self.state.selection.len(),
                },
            )
        })?;
        if self.state.swaps_left == 0 {
            return Err(Self::rejected(action, SessionError::NoSwapsLeft));
        }

        self.state.player_queue.swap(first, second);
        self.state.swaps_left -= 1;
        self.state.selection.clear();
        debug!(first, second, swaps_left = self.state.swaps_left, "slots swapped");

        let event = SessionEvent::SwapApplied {
            first,
            second,
            swaps_left: self.state.swaps_left,
        };
        self.state.record_event(event.clone());
        Ok(vec![event])
    }

    pub fn start_battle(&mut self) -> Result<BattleReport, SessionError> {
        let action = SessionAction::StartBattle;
        Self::ensure_integrity(&self.state)
            .and_then(|_| self.ensure_not_over())
            .and_then(|_| self.ensure_phase(action, BattlePhase::Setup))
            .map_err(|error| Self::rejected(action, error))?;
        if self.state.player_queue.is_empty() || self.state.enemy_queue.is_empty() {
            return Err(Self::rejected(action, SessionError::EmptyQueue));
        }

        let state = &mut self.state;
        state.phase = BattlePhase::Battling;
        state.masks_revealed = true;
        state.selection.clear();
        state.event_log.clear();
        state.record_event(SessionEvent::BattleStarted {
            level: state.level,
            player_hp: state.player_hp,
            max_player_hp: state.max_player_hp,
            enemy_hp: state.enemy_hp,
            max_enemy_hp: state.max_enemy_hp,
        });

        let (tally, rounds) = resolve(&state.player_queue, &state.enemy_queue);

        state.player_hp = state.player_hp.saturating_sub(tally.enemy_damage_dealt);
        state.enemy_hp = state.enemy_hp.saturating_sub(tally.player_damage_dealt);
        state.record_event(SessionEvent::DamageApplied {
            dealt_by_player: tally.player_damage_dealt,
            dealt_by_enemy: tally.enemy_damage_dealt,
            player_hp: state.player_hp,
            enemy_hp: state.enemy_hp,
            winner: tally.winner,
        });

        // Player defeat wins over a simultaneous enemy knockout.
        if state.player_hp == 0 {
            state.game_over = true;
            state.phase = BattlePhase::Defeat;
            state.record_event(SessionEvent::PlayerDefeated { level: state.level });
        } else if state.enemy_hp == 0 {
            state.ready_for_next_level = true;
            state.phase = BattlePhase::Victory;
            state.record_event(SessionEvent::EnemyDefeated { level: state.level });
        } else {
            state.can_continue = true;
            state.phase = BattlePhase::Stalemate;
            state.record_event(SessionEvent::BattleStalemate {
                player_hp: state.player_hp,
                enemy_hp: state.enemy_hp,
            });
        }

        state.player_queue = tally.remaining_player.clone();
        state.enemy_queue = tally.remaining_enemy.clone();
        state.masked_enemy_queue = tally.remaining_enemy.clone();

        info!(
            level = state.level,
            rounds = tally.rounds,
            winner = ?tally.winner,
            player_hp = state.player_hp,
            enemy_hp = state.enemy_hp,
            phase = ?state.phase,
            "battle resolved"
        );

        let outcome = BattleOutcome {
            player_hp: state.player_hp,
            enemy_hp: state.enemy_hp,
            level: state.level,
            game_over: state.game_over,
            next_level: state.ready_for_next_level,
            can_continue: state.can_continue,
            tally,
        };

        Ok(BattleReport {
            outcome,
            rounds,
            events: state.event_log.clone(),
        })
    }

    pub fn next_level(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let action = SessionAction::NextLevel;
        Self::ensure_integrity(&self.state)
            .and_then(|_| self.ensure_not_over())
            .map_err(|error| Self::rejected(action, error))?;
        if !self.state.ready_for_next_level {
            return Err(Self::rejected(
                action,
                SessionError::InvalidTransition {
                    action,
                    phase: self.state.phase,
                },
            ));
        }

        let state = &mut self.state;
        state.level += 1;
        state.max_enemy_hp = self.config.max_enemy_hp(state.level);
        state.max_player_hp = self.config.max_player_hp(state.level);
        state.enemy_hp = state.max_enemy_hp;
        state.player_hp = state.max_player_hp;
        state.ready_for_next_level = false;
        state.can_continue = false;
        state.phase = BattlePhase::Setup;
        state.event_log.clear();
        state.record_event(SessionEvent::LevelAdvanced {
            level: state.level,
            max_enemy_hp: state.max_enemy_hp,
            max_player_hp: state.max_player_hp,
        });
        info!(
            level = state.level,
            max_enemy_hp = state.max_enemy_hp,
            "level advanced"
        );

        self.deal_slots();
        Ok(self.state.event_log.clone())
    }

    pub fn continue_game(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let action = SessionAction::ContinueGame;
        Self::ensure_integrity(&self.state)
            .and_then(|_| self.ensure_not_over())
            .map_err(|error| Self::rejected(action, error))?;
        if !self.state.can_continue {
            return Err(Self::rejected(
                action,
                SessionError::InvalidTransition {
                    action,
                    phase: self.state.phase,
                },
            ));
        }

        let from = self.state.event_log.len();
        self.state.can_continue = false;
        self.state.phase = BattlePhase::Setup;
        self.state.record_event(SessionEvent::SubBattlePrepared {
            level: self.state.level,
        });
        debug!(level = self.state.level, "sub-battle prepared");

        self.deal_slots();
        Ok(self.events_since(from))
    }
}
