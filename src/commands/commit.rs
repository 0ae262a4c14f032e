use super::open_repo;
use crate::core::commit::short_hash;
use colored::*;

pub fn run(message: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let id = repo.commit(&message)?;
    repo.save()?;

    let branch = repo.branches().current_name().to_string();
    let first_line = message.lines().next().unwrap_or_default();
    println!(
        "[{} {}] {}",
        branch.bright_cyan(),
        short_hash(&id).bright_yellow(),
        first_line
    );
    Ok(())
}
