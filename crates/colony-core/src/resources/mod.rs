//! Zone resources: what a zone owns, what plans ask for, and what is left
//! to hand out as rounds commit.

pub mod bundle;
pub mod catalog;
pub mod manager;

pub use bundle::{aggregate, ResourceBundle};
pub use catalog::snapshot;
pub use manager::ResourceManager;
