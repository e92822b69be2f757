// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token, then a per-route role guard)
pub mod protected; // Tier 2: /api/*, resolved principal plus required roles
pub mod public; // Tier 1: token acquisition, catalog reads, seeding
