mod ids;
mod purpose;
mod question;
mod review;
mod topic;

pub use ids::{LearnerId, ParseIdError, QuestionId, SessionId, TopicId};
pub use purpose::{Purpose, SelectionResult};
pub use question::{Answer, Difficulty, QuestionMeta};
pub use review::ReviewItem;
pub use topic::{TopicError, TopicSnapshot};
