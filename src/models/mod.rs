mod dialogue;
mod event;
pub mod prompts;
mod record;
mod reply;
mod row;
mod submitter;

pub use dialogue::{ConfirmationPhase, Dialogue, DialogueState, Effect, Step};
pub use event::{Action, Event, Inbound};
pub use record::{Purchase, SessionRecord};
pub use reply::{InlineButton, Keyboard, Reply};
pub use row::{Cell, SubmissionRow};
pub use submitter::Submitter;
