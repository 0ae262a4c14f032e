use super::open_repo;
use anyhow::bail;
use colored::*;

/// `checkout -- <file>`, `checkout <commit> -- <file>` or `checkout <branch>`.
pub fn run(target: Option<String>, file: Option<String>) -> anyhow::Result<()> {
    let mut repo = open_repo()?;

    match (target, file) {
        (commit, Some(file)) => {
            repo.checkout_file(commit.as_deref(), &file)?;
        }
        (Some(branch), None) => {
            repo.checkout_branch(&branch)?;
            repo.save()?;
            println!("{} {}", "Switched to branch".green(), branch.bright_cyan());
        }
        (None, None) => bail!("Incorrect operands."),
    }
    Ok(())
}
