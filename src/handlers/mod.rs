// handlers/mod.rs - two-tier handler layout
//
// Public (no token) → Protected (admin token present)
pub mod public;
pub mod protected;
