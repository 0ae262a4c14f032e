use clap::{Parser, Subcommand};
use colored::*;
use sprig::commands;
use sprig::commands::config::ConfigAction;
use sprig::core::{Config, Repository};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprig")]
#[command(about = "A small single-user version control system")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository in the current directory
    Init {
        /// Name of the first branch (defaults to init.defaultBranch)
        #[arg(short, long)]
        branch: Option<String>,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Stage files for the next commit
    Add {
        #[arg(required = true)]
        files: Vec<String>,
    },
    Commit {
        message: String,
    },
    /// Unstage a file, or stage a tracked file for removal
    Rm {
        #[arg(required = true)]
        files: Vec<String>,
    },
    Log,
    GlobalLog,
    /// Print ids of commits with exactly this message
    Find {
        message: String,
    },
    Status,
    /// `checkout <branch>`, `checkout -- <file>` or `checkout <commit> -- <file>`
    Checkout {
        target: Option<String>,
        #[arg(last = true)]
        file: Option<String>,
    },
    /// Create a branch at the current head, or list branches
    Branch {
        name: Option<String>,
    },
    RmBranch {
        name: String,
    },
    Reset {
        commit: String,
    },
    Merge {
        branch: String,
    },
    AddRemote {
        name: String,
        path: PathBuf,
    },
    RmRemote {
        name: String,
    },
    Remotes,
    Push {
        remote: String,
        branch: String,
    },
    Fetch {
        remote: String,
        branch: String,
    },
    Pull {
        remote: String,
        branch: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPRIG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn apply_color_setting() {
    let config = match Repository::open(".") {
        Ok(repo) => repo.config().unwrap_or_default(),
        Err(_) => Config::load_global().unwrap_or_default(),
    };
    if !config.color_enabled() {
        colored::control::set_override(false);
    }
}

fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init { branch } => commands::init::run(branch),
        Commands::Config { action } => commands::config::run(action),
        Commands::Add { files } => commands::add::run(files),
        Commands::Commit { message } => commands::commit::run(message),
        Commands::Rm { files } => commands::rm::run(files),
        Commands::Log => commands::log::run(),
        Commands::GlobalLog => commands::log::run_global(),
        Commands::Find { message } => commands::log::run_find(message),
        Commands::Status => commands::status::run(),
        Commands::Checkout { target, file } => commands::checkout::run(target, file),
        Commands::Branch { name } => commands::branch::run(name),
        Commands::RmBranch { name } => commands::branch::run_remove(name),
        Commands::Reset { commit } => commands::reset::run(commit),
        Commands::Merge { branch } => commands::merge::run(branch),
        Commands::AddRemote { name, path } => commands::remote::add(name, path),
        Commands::RmRemote { name } => commands::remote::remove(name),
        Commands::Remotes => commands::remote::list(),
        Commands::Push { remote, branch } => commands::remote::push(remote, branch),
        Commands::Fetch { remote, branch } => commands::remote::fetch(remote, branch),
        Commands::Pull { remote, branch } => commands::remote::pull(remote, branch),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    apply_color_setting();

    if let Err(e) = dispatch(cli.command) {
        eprintln!("{}", e.to_string().red());
        std::process::exit(1);
    }
}
