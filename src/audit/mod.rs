pub mod logger;
pub mod reader;
pub mod types;

pub use logger::{JournalLogger, SharedJournal};
pub use reader::JournalReader;
pub use types::*;
