pub mod store;

pub use store::{FileSlot, MemorySlot, SessionStore, TokenSlot};
