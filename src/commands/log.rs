use super::open_repo;
use crate::core::Commit;

fn print_entries(entries: &[(String, Commit)]) {
    for (id, commit) in entries {
        println!("{}", commit.format_for_log(id));
        println!();
    }
}

pub fn run() -> anyhow::Result<()> {
    let repo = open_repo()?;
    print_entries(&repo.log()?);
    Ok(())
}

pub fn run_global() -> anyhow::Result<()> {
    let repo = open_repo()?;
    print_entries(&repo.global_log()?);
    Ok(())
}

pub fn run_find(message: String) -> anyhow::Result<()> {
    let repo = open_repo()?;
    for id in repo.find(&message)? {
        println!("{}", id);
    }
    Ok(())
}
