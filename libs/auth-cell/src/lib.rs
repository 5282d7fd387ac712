pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::AuthState;
pub use services::{SessionHolder, SharedSession, UserDirectoryService};
