// ABOUTME: Tauri command module exports
// ABOUTME: Desktop counterparts of the console's login form and query buttons

pub mod session;

pub use session::*;
