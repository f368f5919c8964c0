pub mod events;
pub mod feedback;
pub mod session;
pub mod ticker;

pub use events::EngineEvent;
pub use feedback::{FeedbackCollector, FeedbackDraft, FeedbackError};
pub use session::{
    ActivationOutcome, ActivationSession, SessionError, SessionSettings, SessionState,
};
