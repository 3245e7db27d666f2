pub mod comment_store;
pub mod compose;
pub mod library_cache;
pub mod notify;
pub mod player;
pub mod session;
pub mod ticker;
#[cfg(test)]
pub(crate) mod test_support;

pub use session::{ReviewSession, SessionHandle};
