use super::open_repo;

pub fn run(files: Vec<String>) -> anyhow::Result<()> {
    let mut repo = open_repo()?;
    repo.rm_all(&files)?;
    repo.save()?;
    Ok(())
}
