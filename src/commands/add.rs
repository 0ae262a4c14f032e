use super::open_repo;
use colored::*;

pub fn run(files: Vec<String>) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    let staged = repo.add_all(&files)?;
    repo.save()?;

    for (file, staged) in files.iter().zip(staged) {
        if !staged {
            println!("{} {}", "unchanged:".bright_black(), file);
        }
    }
    Ok(())
}
