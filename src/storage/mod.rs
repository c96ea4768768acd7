mod session_storage;

pub use session_storage::{SessionSlot, SessionStorage};
