//! 通过状态机连续打多场的场景测试。

use battle_queue::{
    BattlePhase, GameConfig, Hand, HandSource, Queue, SessionController, SessionError,
    SessionEvent, Verdict,
};

// 交替发全石头和全剪刀队列，控制器总是先发玩家队列。
#[derive(Default)]
struct PlayerAlwaysWins {
    enemy_turn: bool,
}

impl HandSource for PlayerAlwaysWins {
    fn next_hand(&mut self) -> Hand {
        if self.enemy_turn {
            Hand::Scissors
        } else {
            Hand::Rock
        }
    }

    fn fill(&mut self, len: usize) -> Queue {
        let queue = (0..len).map(|_| self.next_hand()).collect();
        self.enemy_turn = !self.enemy_turn;
        queue
    }
}

fn winning_controller(config: GameConfig) -> SessionController<PlayerAlwaysWins> {
    SessionController::with_source(config, PlayerAlwaysWins::default())
}

#[test]
fn rock_queue_sweeps_scissors_queue() {
    let mut controller = winning_controller(GameConfig::default());

    assert!(controller.player_queue().iter().all(|hand| *hand == Hand::Rock));
    assert!(controller.enemy_queue().iter().all(|hand| *hand == Hand::Scissors));

    let report = controller.start_battle().expect("battle should resolve");
    let outcome = &report.outcome;

    assert_eq!(report.rounds.len(), 4);
    assert!(report.rounds.iter().all(|round| round.verdict == Verdict::Player));
    assert!(controller.enemy_queue().is_empty());
    assert_eq!(outcome.tally.player_damage_dealt, 4);
    assert_eq!(outcome.tally.enemy_damage_dealt, 0);
    assert_eq!(outcome.tally.winner, Verdict::Player);
}

#[test]
fn enemy_queue_caps_while_enemy_hp_keeps_growing() {
    // Enough player hands to clear any enemy HP pool in one battle.
    let config = GameConfig {
        player_slots: 12,
        ..GameConfig::default()
    };
    let mut controller = winning_controller(config);

    let mut max_enemy_hp = controller.state().max_enemy_hp;
    for expected_level in 2..=5u32 {
        let report = controller.start_battle().expect("battle should resolve");
        assert!(report.outcome.next_level, "player should knock out the enemy");

        controller.next_level().expect("knockout allows advancing");
        assert_eq!(controller.level(), expected_level);
        assert_eq!(controller.state().max_enemy_hp, max_enemy_hp + 1);
        assert_eq!(controller.enemy_hp(), controller.state().max_enemy_hp);
        max_enemy_hp = controller.state().max_enemy_hp;

        let expected_len = (4 + expected_level as usize - 1).min(6);
        assert_eq!(controller.enemy_queue().len(), expected_len);
    }

    assert_eq!(controller.level(), 5);
    assert_eq!(controller.enemy_queue().len(), 6);
    assert_eq!(controller.state().max_enemy_hp, 8);

    // Level five hides min(5 - 2, 6) trailing enemy slots.
    let display = controller.enemy_display();
    assert_eq!(display.iter().filter(|hand| hand.is_masked()).count(), 3);
    assert!(display.iter().take(3).all(|hand| !hand.is_masked()));
}

#[test]
fn flags_are_never_both_set() {
    let mut controller = SessionController::with_seed(GameConfig::default(), 2024);

    for _ in 0..200 {
        if controller.is_game_over() {
            controller.reset_game();
            continue;
        }
        let report = controller.start_battle().expect("setup phase after every transition");
        let outcome = &report.outcome;
        assert!(!(outcome.game_over && outcome.can_continue));
        assert!(controller.state().integrity_check().is_ok());

        match controller.state().phase {
            BattlePhase::Victory => {
                controller.next_level().expect("victory allows advancing");
            }
            BattlePhase::Stalemate => {
                controller.continue_game().expect("stalemate allows continuing");
            }
            BattlePhase::Defeat => {
                assert!(controller.is_game_over());
            }
            phase => panic!("unexpected phase after battle: {phase:?}"),
        }
    }
}

#[test]
fn reset_clears_terminal_state() {
    let mut controller = SessionController::with_seed(GameConfig::default(), 5);
    for _ in 0..10_000 {
        if controller.is_game_over() {
            break;
        }
        controller.start_battle().expect("battle should resolve");
        if controller.can_continue() {
            controller.continue_game().expect("stalemate");
        } else if controller.state().ready_for_next_level {
            controller.next_level().expect("victory");
        }
    }
    assert!(controller.is_game_over(), "a fixed player HP pool runs out eventually");

    assert_eq!(controller.start_battle().unwrap_err(), SessionError::GameOver);

    let events = controller.reset_game();
    assert!(!controller.is_game_over());
    assert_eq!(controller.level(), 1);
    assert_eq!(controller.player_hp(), 4);
    assert!(matches!(events.first(), Some(SessionEvent::GameReset { .. })));
    controller.start_battle().expect("fresh game can battle");
}
