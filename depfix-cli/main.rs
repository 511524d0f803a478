use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use depfix::{
    BASE_DIR_ENV, Config, Io, Outcome, RealSystem, depfile::Dependencies,
    make_paths_relative_in_output_dep, read_depfile, rewrite_source_paths,
};
use depfix_fs::Absolute;
use owo_colors::OwoColorize as _;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling log output, e.g. `DEPFIX_LOG=debug`.
const LOG_ENV: &str = "DEPFIX_LOG";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to a TOML config file. The only setting is `base_dir`.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Make absolute paths under this directory relative. Overrides the
    /// config file and the `DEPFIX_BASEDIR` environment variable.
    #[clap(long, global = true)]
    pub base_dir: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the targets and prerequisites of a depfile, one per line.
    Tokenize { depfile: PathBuf },
    /// Print the prerequisites of a depfile. When a base directory is
    /// configured, paths under it are printed relative to the current
    /// directory.
    Deps { depfile: PathBuf },
    /// Make absolute paths under the base directory relative, in place.
    Rewrite {
        depfile: PathBuf,
        /// Print the rewritten depfile instead of writing it back.
        #[clap(long)]
        dry_run: bool,
    },
    /// Print file names escaped for use in a depfile.
    Escape {
        #[clap(required = true)]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    try_main(&RealSystem::new(), args)
}

fn try_main(io: &dyn Io, args: Args) -> Result<()> {
    let cwd = io.current_dir()?;
    let cwd_str = cwd
        .to_str()
        .and_then(Absolute::try_new_ref)
        .ok_or_else(|| anyhow::anyhow!("{} is not a valid UTF-8 path", cwd.display()))?;
    tracing::debug!("Working directory: {cwd_str}");

    match args.command {
        Command::Tokenize { ref depfile } => {
            let depfile = resolve(&cwd, depfile);
            let file_content = read_depfile(io, depfile.as_deref())?;
            for token in depfix::tokenize(&file_content) {
                anstream::println!("{token}");
            }
        }
        Command::Deps { ref depfile } => {
            let config = load_config(io, &cwd, &args)?;
            let depfile = resolve(&cwd, depfile);
            let file_content = read_depfile(io, depfile.as_deref())?;
            let deps =
                Dependencies::from_depfile(&config.relative_path_context(cwd_str), &file_content);
            for path in &deps.paths {
                anstream::println!("{path}");
            }
        }
        Command::Rewrite {
            ref depfile,
            dry_run,
        } => {
            let config = load_config(io, &cwd, &args)?;
            let depfile = resolve(&cwd, depfile);
            if dry_run {
                if config.base_dir.is_empty() {
                    anyhow::bail!("no base directory configured");
                }
                let file_content = read_depfile(io, depfile.as_deref())?;
                let ctx = config.relative_path_context(cwd_str);
                let new_content = rewrite_source_paths(&ctx, &file_content);
                anstream::print!("{}", new_content.as_deref().unwrap_or(&file_content));
            } else {
                let outcome =
                    make_paths_relative_in_output_dep(io, &config, cwd_str, depfile.as_deref());
                report(outcome, &depfile);
            }
        }
        Command::Escape { ref names } => {
            for name in names {
                anstream::println!("{}", depfix::escape_filename(name));
            }
        }
    }

    Ok(())
}

fn load_config(io: &dyn Io, cwd: &Absolute<PathBuf>, args: &Args) -> Result<Config> {
    let config_path = args.config.as_deref().map(|path| resolve(cwd, path));
    let mut config = Config::load(io, config_path.as_ref().map(|path| path.as_deref()))?;
    if let Some(ref base_dir) = args.base_dir {
        config.set_base_dir(base_dir.clone())?;
    }
    tracing::debug!("Base directory: {:?}", config.base_dir);
    Ok(config)
}

fn resolve(cwd: &Absolute<PathBuf>, path: &Path) -> Absolute<PathBuf> {
    // Joining onto an absolute path is always absolute.
    Absolute::new_unchecked(cwd.join(path))
}

fn report(outcome: Outcome, depfile: &Path) {
    let depfile = depfile.display();
    match outcome {
        Outcome::Rewritten => anstream::eprintln!("{} {depfile}", "Rewritten".green().bold()),
        Outcome::Unchanged => anstream::eprintln!("{} {depfile}", "Unchanged".bold()),
        Outcome::Disabled => anstream::eprintln!(
            "{} no base directory configured; use --base-dir, `base_dir` in the config file, or {BASE_DIR_ENV}",
            "warning:".yellow().bold()
        ),
        Outcome::ReadFailed => anstream::eprintln!(
            "{} could not read {depfile}",
            "warning:".yellow().bold()
        ),
        Outcome::WriteFailed => anstream::eprintln!(
            "{} could not write {depfile}",
            "warning:".yellow().bold()
        ),
    }
}
