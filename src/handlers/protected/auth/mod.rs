// handlers/protected/auth/mod.rs - Session checks for authenticated callers
pub mod session;

pub use session::elevated_get;
pub use session::status_get;
