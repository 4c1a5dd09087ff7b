pub mod history;
pub mod session;

pub use history::{build_outbound, Message, Sender};
pub use session::{ChatSession, PendingSend, SendOutcome, SessionState, APOLOGY_REPLY};
