// handlers/protected/mod.rs - Handlers behind resolve_principal
//
// Every route here sees a verified `Principal` in its request extensions. The role guard for
// each route is attached where the router is built.
pub mod auth;
pub mod products;
