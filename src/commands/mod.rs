pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod init;
pub mod log;
pub mod merge;
pub mod remote;
pub mod reset;
pub mod rm;
pub mod status;

use crate::core::Repository;

/// Open the repository rooted at the current directory.
pub fn open_repo() -> anyhow::Result<Repository> {
    Ok(Repository::open(".")?)
}
