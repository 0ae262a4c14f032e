use super::open_repo;
use crate::core::Status;
use colored::*;

pub fn run() -> anyhow::Result<()> {
    let repo = open_repo()?;
    let status = repo.status()?;
    print_status(&status);
    Ok(())
}

fn print_status(status: &Status) {
    println!("{}", "=== Branches ===".cyan().bold());
    for branch in &status.branches {
        if branch.is_current {
            println!("*{}", branch.name.green().bold());
        } else {
            println!("{}", branch.name);
        }
    }

    println!("\n{}", "=== Staged Files ===".cyan().bold());
    for path in &status.staged {
        println!("{}", path.green());
    }

    println!("\n{}", "=== Removed Files ===".cyan().bold());
    for path in &status.removed {
        println!("{}", path.red());
    }

    println!("\n{}", "=== Modifications Not Staged For Commit ===".cyan().bold());
    for (path, change) in &status.unstaged {
        println!("{}", format!("{} ({})", path, change.as_str()).yellow());
    }

    println!("\n{}", "=== Untracked Files ===".cyan().bold());
    for path in &status.untracked {
        println!("{}", path.bright_black());
    }
    println!();
}
