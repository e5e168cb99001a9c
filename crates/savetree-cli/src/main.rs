use clap::Parser;
use std::error::Error as _;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use savetree_core::{Resource, ResourceConfig, print_tree};

#[derive(Parser, Debug)]
#[command(
    name = "savetree",
    about = "Print the directory tree of a save-data container",
    version
)]
struct Cli {
    /// Save container: an extracted save directory or a zip archive
    container: PathBuf,
    /// Resolve a relative container path against this directory
    #[arg(long, env = "SAVETREE_BASE_DIR", value_name = "DIR")]
    base_dir: Option<PathBuf>,
    /// Verbosity level (-v, -vv, -vvv); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        let mut msg = e.to_string();
        let mut src = e.source();
        while let Some(s) = src {
            msg.push_str(": ");
            msg.push_str(&s.to_string());
            src = s.source();
        }
        eprintln!("error: {}", msg);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> savetree_core::Result<()> {
    let resource = Resource::new(ResourceConfig {
        base_dir: cli.base_dir.clone(),
    })?;
    debug!(container = %cli.container.display(), "printing tree");
    let save = resource.open_save(&cli.container)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    print_tree(&save, &mut out)?;

    drop(save);
    drop(resource);
    Ok(())
}
