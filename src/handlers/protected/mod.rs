// handlers/protected/mod.rs - Gated handlers (admin token required)
//
// Every route here runs behind admin_guard_middleware, which redirects to
// /admin without a token and otherwise attaches the caller's AdminSession.

pub mod dashboard;

pub use dashboard::*;
