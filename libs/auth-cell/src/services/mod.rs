pub mod directory;
pub mod session;

pub use directory::UserDirectoryService;
pub use session::{FileStorage, MemoryStorage, SessionHolder, SessionStorage, SharedSession};
