// handlers/public/mod.rs - Public handlers (no admin token required)
//
// The verification page and the admin login entry point.

pub mod auth;
pub mod verify;

pub use verify::{home, verify_post};
