pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::{Function, Promise};

pub use game::{
    mask_queue, masked_count, resolve, BattleOutcome, BattlePhase, BattleReport, BattleTally,
    ConfigError, GameConfig, Hand, HandGenerator, HandSource, IntegrityError, Queue, RoundRecord,
    Rounds, ScriptedHands, SessionAction, SessionController, SessionError, SessionEvent,
    SessionSnapshot, SessionState, SwapSelection, Verdict,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: SessionError) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&error.to_string()));
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(serde_to_js_error)
}

#[derive(Serialize)]
struct Resolution {
    tally: BattleTally,
    rounds: Vec<RoundRecord>,
}

/// 面向前端的会话对象。所有返回值都是 JSON 字符串，错误为带 `type` 字段的对象。
#[wasm_bindgen]
pub struct BattleQueueEngine {
    controller: SessionController,
}

#[wasm_bindgen]
impl BattleQueueEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        seed: Option<u32>,
    ) -> Result<BattleQueueEngine, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => GameConfig::default(),
        };
        let controller = match seed {
            Some(seed) => SessionController::with_seed(config, u64::from(seed)),
            None => SessionController::new(config),
        };
        Ok(BattleQueueEngine { controller })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.controller.snapshot())
    }

    pub fn player_queue_json(&self) -> Result<String, JsValue> {
        to_json(self.controller.player_queue())
    }

    pub fn enemy_queue_json(&self) -> Result<String, JsValue> {
        to_json(self.controller.enemy_queue())
    }

    pub fn enemy_display_json(&self) -> Result<String, JsValue> {
        to_json(self.controller.enemy_display())
    }

    pub fn level(&self) -> u32 {
        self.controller.level()
    }

    pub fn player_hp(&self) -> u32 {
        self.controller.player_hp()
    }

    pub fn enemy_hp(&self) -> u32 {
        self.controller.enemy_hp()
    }

    pub fn swaps_left(&self) -> u32 {
        self.controller.swaps_left()
    }

    pub fn game_over(&self) -> bool {
        self.controller.is_game_over()
    }

    pub fn can_continue(&self) -> bool {
        self.controller.can_continue()
    }

    pub fn reset_game(&mut self) -> Result<String, JsValue> {
        let events = self.controller.reset_game();
        to_json(&events)
    }

    pub fn generate_random_slots(&mut self) -> Result<String, JsValue> {
        let events = self
            .controller
            .generate_random_slots()
            .map_err(to_js_error)?;
        to_json(&events)
    }

    pub fn select_for_swap(&mut self, index: usize) -> Result<String, JsValue> {
        self.controller.select_for_swap(index).map_err(to_js_error)?;
        to_json(&self.controller.snapshot())
    }

    pub fn swap(&mut self) -> Result<String, JsValue> {
        let events = self.controller.swap().map_err(to_js_error)?;
        to_json(&events)
    }

    pub fn start_battle(&mut self) -> Result<String, JsValue> {
        let report = self.controller.start_battle().map_err(to_js_error)?;
        to_json(&report)
    }

    pub fn next_level(&mut self) -> Result<String, JsValue> {
        let events = self.controller.next_level().map_err(to_js_error)?;
        to_json(&events)
    }

    pub fn continue_game(&mut self) -> Result<String, JsValue> {
        let events = self.controller.continue_game().map_err(to_js_error)?;
        to_json(&events)
    }
}

/// 无状态结算：传入双方队列，返回统计与逐回合记录。
#[wasm_bindgen(js_name = "resolveBattle")]
pub fn resolve_battle(player: JsValue, enemy: JsValue) -> Result<JsValue, JsValue> {
    let player: Queue = from_value(player).map_err(JsValue::from)?;
    let enemy: Queue = from_value(enemy).map_err(JsValue::from)?;
    if player.iter().chain(enemy.iter()).any(|hand| hand.is_masked()) {
        return Err(JsValue::from_str("masked hands cannot be resolved"));
    }
    let (tally, rounds) = resolve(&player, &enemy);
    to_value(&Resolution { tally, rounds }).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "maskEnemyQueue")]
pub fn mask_enemy_queue(
    level: u32,
    enemy: JsValue,
    mask_from_level: Option<u32>,
) -> Result<JsValue, JsValue> {
    let enemy: Queue = from_value(enemy).map_err(JsValue::from)?;
    let threshold = mask_from_level.unwrap_or_else(|| GameConfig::default().mask_from_level);
    to_value(&mask_queue(level, threshold, &enemy)).map_err(JsValue::from)
}

/// 按 `delay_ms` 间隔把已结算的回合逐个交给 `on_round`，结束时返回回合数。
#[wasm_bindgen(js_name = "replayRounds")]
pub fn replay_rounds(rounds: JsValue, delay_ms: Option<u32>, on_round: Function) -> Promise {
    let rounds: Result<Vec<RoundRecord>, JsValue> = from_value(rounds).map_err(JsValue::from);
    let delay = delay_ms.unwrap_or(0);

    future_to_promise(async move {
        let rounds = rounds?;
        for (index, round) in rounds.iter().enumerate() {
            if index > 0 && delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let value = to_value(round).map_err(JsValue::from)?;
            on_round.call1(&JsValue::NULL, &value)?;
        }
        Ok(JsValue::from(rounds.len() as u32))
    })
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
