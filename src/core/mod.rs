pub mod error;
pub mod object;
pub mod tree;
pub mod commit;
pub mod graph;
pub mod branch;
pub mod index;
pub mod worktree;
pub mod config;
pub mod repository;
pub mod status;
pub mod merge;
pub mod remote;

pub use error::{ErrorClass, RepoError, Result};
pub use object::{ObjectStore, ObjectType};
pub use tree::Tree;
pub use commit::Commit;
pub use graph::CommitGraph;
pub use branch::{Branch, BranchTable};
pub use index::StagingArea;
pub use worktree::WorkTree;
pub use config::Config;
pub use repository::Repository;
pub use status::{Change, Status};
pub use merge::MergeOutcome;
pub use remote::{Remotes, TransferSummary};
