//! Fingerdash - Two-foot sprint game backend
//!
//! The game core lives in [`game`]: stride alternation, momentum physics,
//! race timing and a persisted top-3 leaderboard. With the `desktop`
//! feature the core is exposed to the webview frontend as Tauri commands.

pub mod game;

#[cfg(feature = "desktop")]
mod desktop;

#[cfg(feature = "desktop")]
pub use desktop::run;
