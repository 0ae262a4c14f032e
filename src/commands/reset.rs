use super::open_repo;
use crate::core::commit::short_hash;
use colored::*;

pub fn run(commit: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let id = repo.reset(&commit)?;
    repo.save()?;

    let head = repo.get_commit(&id)?;
    println!(
        "{} {} {}",
        "HEAD is now at".green(),
        short_hash(&id).bright_yellow(),
        head.short_message()
    );
    Ok(())
}
