//! 对战核心逻辑（手势生成、遮蔽、结算、关卡状态机）。

pub mod battle;
pub mod config;
pub mod hand;
pub mod masking;
pub mod session;
pub mod state;
pub mod swap;

pub use battle::{resolve, BattleTally, RoundRecord, Rounds, Verdict};
pub use config::{ConfigError, GameConfig};
pub use hand::{format_queue, Hand, HandGenerator, HandSource, Queue, ScriptedHands};
pub use masking::{mask_queue, masked_count};
pub use session::{
    BattleOutcome,
    BattleReport,
    SessionAction,
    SessionController,
    SessionError,
};
pub use state::{BattlePhase, IntegrityError, SessionEvent, SessionSnapshot, SessionState};
pub use swap::SwapSelection;
