use super::open_repo;
use crate::core::MergeOutcome;
use colored::*;

pub fn run(branch: String) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let outcome = repo.merge(&branch)?;
    repo.save()?;
    report(&outcome);
    Ok(())
}

/// Print the user-facing notice for a finished merge or pull.
pub fn report(outcome: &MergeOutcome) {
    match outcome {
        MergeOutcome::UpToDate => {
            println!("{}", "Given branch is an ancestor of the current branch.".green());
        }
        MergeOutcome::FastForward { .. } => {
            println!("{}", "Current branch fast-forwarded.".green());
        }
        MergeOutcome::Merged { conflicts, .. } if !conflicts.is_empty() => {
            println!("{}", "Encountered a merge conflict.".red().bold());
            for path in conflicts {
                println!("  {} {}", "both modified:".red(), path);
            }
        }
        MergeOutcome::Merged { .. } => {}
    }
}
