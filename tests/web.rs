//! 浏览器冒烟测试：`wasm-pack test --headless`。
#![cfg(target_arch = "wasm32")]

use battle_queue::BattleQueueEngine;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn engine_runs_a_battle() {
    let mut engine = BattleQueueEngine::new(None, Some(11)).expect("default config is valid");
    assert_eq!(engine.level(), 1);

    let report = engine.start_battle().expect("fresh engine can battle");
    assert!(report.contains("\"rounds\""));
    assert!(engine.start_battle().is_err());
}

#[wasm_bindgen_test]
fn engine_rejects_bad_config() {
    assert!(BattleQueueEngine::new(Some("{ \"initial_hp\": 0 }".into()), None).is_err());
}
