use super::open_repo;
use crate::core::commit::short_hash;
use colored::*;

pub fn run(name: Option<String>) -> anyhow::Result<()> {
    let mut repo = open_repo()?;

    let Some(name) = name else {
        for branch in repo.branches().list() {
            let prefix = if branch.is_current { "* " } else { "  " };
            let display = if branch.is_current {
                branch.name.green().bold()
            } else {
                branch.name.normal()
            };
            println!("{}{} {}", prefix, display, short_hash(&branch.head).bright_yellow());
        }
        return Ok(());
    };

    repo.branch(&name)?;
    repo.save()?;
    Ok(())
}

pub fn run_remove(name: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    repo.rm_branch(&name)?;
    repo.save()?;
    Ok(())
}
