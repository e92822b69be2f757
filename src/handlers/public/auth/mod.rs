// handlers/public/auth/mod.rs - Token acquisition endpoints
pub mod login; // POST /auth/login - authenticate and get JWT
pub mod register; // POST /auth/register - create account and get JWT

pub use login::login_post;
pub use register::register_post;
