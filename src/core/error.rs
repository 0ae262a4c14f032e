use thiserror::Error;

/// Broad category of a [`RepoError`], used by callers that only care about
/// how a failure should be treated rather than which check tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed invocation; reported verbatim.
    Usage,
    /// A check that runs before any mutation failed; nothing was changed.
    Precondition,
    /// A stored object or the repository record is missing or damaged.
    NotFound,
    /// The filesystem refused an operation.
    Io,
}

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Not in an initialized sprig directory.")]
    NotARepo,
    #[error("A sprig version-control system already exists in the current directory.")]
    AlreadyExists,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Repository corrupted: {0}")]
    Corrupted(String),
    #[error("Object {0} not found")]
    ObjectNotFound(String),

    #[error("Please enter a commit message.")]
    EmptyMessage,
    #[error("Path '{0}' is outside the repository.")]
    PathOutsideRepo(String),
    #[error("Commit id '{0}' is ambiguous.")]
    AmbiguousCommit(String),

    #[error("File does not exist.")]
    FileNotFound(String),
    #[error("No changes added to the commit.")]
    NothingToCommit,
    #[error("No reason to remove the file.")]
    NothingToRemove(String),
    #[error("File does not exist in that commit.")]
    FileNotInCommit(String),
    #[error("No commit with that id exists.")]
    UnknownCommit(String),
    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),
    #[error("A branch with that name already exists.")]
    BranchExists(String),
    #[error("A branch with that name does not exist.")]
    UnknownBranch(String),
    #[error("No need to checkout the current branch.")]
    AlreadyCurrent(String),
    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrent(String),
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedInTheWay(String),
    #[error("'{0}' would have to be both a file and a directory.")]
    PathConflict(String),
    #[error("You have uncommitted changes.")]
    UncommittedChanges,
    #[error("Cannot merge a branch with itself.")]
    SelfMerge,
    #[error("A remote with that name already exists.")]
    RemoteExists(String),
    #[error("A remote with that name does not exist.")]
    UnknownRemote(String),
    #[error("Remote directory not found.")]
    RemoteNotFound(String),
    #[error("That remote does not have that branch.")]
    RemoteBranchNotFound(String),
    #[error("Please pull down remote changes before pushing.")]
    NeedsPull,
}

impl RepoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RepoError::EmptyMessage
            | RepoError::PathOutsideRepo(_)
            | RepoError::AmbiguousCommit(_) => ErrorClass::Usage,
            RepoError::Io(_) => ErrorClass::Io,
            RepoError::Json(_) | RepoError::Corrupted(_) | RepoError::ObjectNotFound(_) => {
                ErrorClass::NotFound
            }
            _ => ErrorClass::Precondition,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_failures() {
        assert_eq!(RepoError::NeedsPull.class(), ErrorClass::Precondition);
        assert_eq!(RepoError::SelfMerge.class(), ErrorClass::Precondition);
        assert_eq!(RepoError::EmptyMessage.class(), ErrorClass::Usage);
        assert_eq!(
            RepoError::ObjectNotFound("abcd1234".into()).class(),
            ErrorClass::NotFound
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            RepoError::CannotRemoveCurrent("master".into()).to_string(),
            "Cannot remove the current branch."
        );
    }
}
