#![forbid(unsafe_code)]

pub mod mastery;
pub mod model;
pub mod selection;
pub mod session;
pub mod time;

pub use mastery::{MasteryInput, MasteryModel, MasteryPolicy, update_mastery};
pub use selection::select_next;
pub use session::{QuizSession, SessionProgress, SessionState, TurnOutcome};
pub use time::Clock;
