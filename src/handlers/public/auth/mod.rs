// handlers/public/auth/mod.rs - admin login and logout
//
// These routes sit outside the route guard: they are how a token gets
// persisted in the first place, and how it is removed again.

pub mod login;
pub mod session;

pub use login::{login_get, login_post};
pub use session::logout_post;
