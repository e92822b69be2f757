// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: No /api prefix (e.g., /auth/*, /products/*)
// Middleware: None
pub mod auth;
pub mod products;
pub mod seed;
