pub mod activities;
pub mod auth;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod session;

pub use auth::AppState;
pub use error::ApiError;
pub use gateway::{Authorized, Gateway};
pub use password::Passwords;
pub use routes::router;
pub use session::{MemorySessionStore, Session, SessionStore};
