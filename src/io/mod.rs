pub mod item_store;
pub mod lock;
pub mod store;
pub mod watcher;
pub mod workspace_io;
