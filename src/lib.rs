pub mod commands;
pub mod core;
pub mod utils;

pub use crate::core::repository::Repository;
pub use crate::core::error::{RepoError, Result};
pub use crate::core::object::{ObjectStore, ObjectType};
pub use crate::core::commit::Commit;
pub use crate::core::tree::Tree;
pub use crate::core::branch::Branch;
pub use crate::core::config::Config;
pub use crate::core::merge::MergeOutcome;
pub use crate::core::status::Status;
