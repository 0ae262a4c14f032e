use super::open_repo;
use crate::core::commit::short_hash;
use crate::core::TransferSummary;
use colored::*;
use std::path::PathBuf;

pub fn add(name: String, path: PathBuf) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    repo.add_remote(&name, &path)?;
    repo.save()?;
    Ok(())
}

pub fn remove(name: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    repo.rm_remote(&name)?;
    repo.save()?;
    Ok(())
}

pub fn list() -> anyhow::Result<()> {
    let repo = open_repo()?;
    for (name, path) in repo.remotes().iter() {
        println!("{}\t{}", name.bright_cyan(), path.display());
    }
    Ok(())
}

fn print_transfer(verb: &str, summary: &TransferSummary) {
    println!(
        "{} {} {} {}",
        verb.green(),
        summary.branch.bright_cyan(),
        format!("at {}", short_hash(&summary.head)).bright_yellow(),
        format!("({} commits, {} objects)", summary.commits, summary.objects).bright_black()
    );
}

pub fn fetch(remote: String, branch: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let summary = repo.fetch(&remote, &branch)?;
    repo.save()?;
    print_transfer("Fetched", &summary);
    Ok(())
}

pub fn push(remote: String, branch: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let summary = repo.push(&remote, &branch)?;
    repo.save()?;
    print_transfer("Pushed", &summary);
    Ok(())
}

pub fn pull(remote: String, branch: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let outcome = repo.pull(&remote, &branch)?;
    repo.save()?;
    super::merge::report(&outcome);
    Ok(())
}
