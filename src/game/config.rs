use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PLAYER_SLOTS: usize = 4;
const DEFAULT_BASE_ENEMY_SLOTS: usize = 4;
const DEFAULT_SLOT_GROWTH_LEVELS: u32 = 3;
const DEFAULT_INITIAL_HP: u32 = 4;
const DEFAULT_ENEMY_HP_PER_LEVEL: u32 = 1;
const DEFAULT_PLAYER_HP_PER_LEVEL: u32 = 0;
const DEFAULT_MAX_SWAPS: u32 = 1;
const DEFAULT_MASK_FROM_LEVEL: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: u64 },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// 关卡与数值配置。所有字段都有默认值，前端可以只传需要覆盖的部分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub player_slots: usize,
    pub base_enemy_slots: usize,
    pub slot_growth_levels: u32,
    pub initial_hp: u32,
    pub enemy_hp_per_level: u32,
    pub player_hp_per_level: u32,
    pub max_swaps: u32,
    pub mask_from_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_slots: DEFAULT_PLAYER_SLOTS,
            base_enemy_slots: DEFAULT_BASE_ENEMY_SLOTS,
            slot_growth_levels: DEFAULT_SLOT_GROWTH_LEVELS,
            initial_hp: DEFAULT_INITIAL_HP,
            enemy_hp_per_level: DEFAULT_ENEMY_HP_PER_LEVEL,
            player_hp_per_level: DEFAULT_PLAYER_HP_PER_LEVEL,
            max_swaps: DEFAULT_MAX_SWAPS,
            mask_from_level: DEFAULT_MASK_FROM_LEVEL,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, u64); 5] = [
            ("player_slots", self.player_slots as u64),
            ("base_enemy_slots", self.base_enemy_slots as u64),
            ("slot_growth_levels", self.slot_growth_levels as u64),
            ("initial_hp", self.initial_hp as u64),
            ("mask_from_level", self.mask_from_level as u64),
        ];
        for (field, value) in checks {
            if value < 1 {
                return Err(ConfigError::TooSmall { field, min: 1 });
            }
        }
        Ok(())
    }

    pub fn enemy_slots(&self, level: u32) -> usize {
        let grown = level.min(self.slot_growth_levels).max(1) - 1;
        self.base_enemy_slots + grown as usize
    }

    pub fn max_enemy_hp(&self, level: u32) -> u32 {
        let levels_gained = level.saturating_sub(1);
        self.initial_hp
            .saturating_add(self.enemy_hp_per_level.saturating_mul(levels_gained))
    }

    pub fn max_player_hp(&self, level: u32) -> u32 {
        let levels_gained = level.saturating_sub(1);
        self.initial_hp
            .saturating_add(self.player_hp_per_level.saturating_mul(levels_gained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_slots_cap_after_growth_levels() {
        let config = GameConfig::default();
        assert_eq!(config.enemy_slots(1), 4);
        assert_eq!(config.enemy_slots(2), 5);
        assert_eq!(config.enemy_slots(3), 6);
        assert_eq!(config.enemy_slots(4), 6);
        assert_eq!(config.enemy_slots(50), 6);
    }

    #[test]
    fn hp_keeps_growing_past_slot_cap() {
        let config = GameConfig::default();
        assert_eq!(config.max_enemy_hp(1), 4);
        assert_eq!(config.max_enemy_hp(5), 8);
        assert_eq!(config.max_player_hp(5), 4);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "max_swaps": 3 }"#).expect("valid config");
        assert_eq!(config.max_swaps, 3);
        assert_eq!(config.player_slots, DEFAULT_PLAYER_SLOTS);
    }

    #[test]
    fn rejects_zero_hp() {
        let error = GameConfig::from_json(r#"{ "initial_hp": 0 }"#).expect_err("zero hp");
        assert!(matches!(error, ConfigError::TooSmall { field: "initial_hp", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = GameConfig::from_json("{ nope").expect_err("malformed");
        assert!(matches!(error, ConfigError::Json(_)));
    }
}
