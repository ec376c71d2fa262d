pub mod config;
pub mod directory;
pub mod item;
pub mod vocab;
pub mod workspace;

pub use config::*;
pub use directory::*;
pub use item::*;
pub use vocab::*;
pub use workspace::*;
