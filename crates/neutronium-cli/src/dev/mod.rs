//! Watch-mode development support.
//!
//! - [`watcher`] turns filesystem events into qualifying [`FileChange`]s
//! - [`debounce`] coalesces bursts of changes into one rebuild
//! - [`server`] serves the build output over HTTP
//! - [`reload`] pushes a reload token to every open page after a rebuild

pub mod browser;
pub mod debounce;
pub mod reload;
pub mod server;
pub mod watcher;

pub use browser::open_browser;
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use reload::{BroadcastReport, ClientId, ReloadChannel};
pub use server::{DevServer, ServerState, bind};
pub use watcher::{ChangeFilter, FileChange, FileWatcher};
