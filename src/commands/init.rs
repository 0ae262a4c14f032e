use crate::core::Repository;
use colored::*;

pub fn run(branch: Option<String>) -> anyhow::Result<()> {
    let repo = match branch {
        Some(name) => Repository::init_with_branch(".", &name)?,
        None => Repository::init(".")?,
    };

    println!(
        "{} {} {}",
        "Initialized empty sprig repository in".green(),
        repo.git_dir.display().to_string().bright_cyan(),
        format!("(branch {})", repo.branches().current_name()).bright_black()
    );
    Ok(())
}
