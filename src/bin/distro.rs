use std::path::PathBuf;

use clap::Parser;
use linux_distro::{Config, LinuxDistribution};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Reports the Linux distribution this host runs.")]
struct Args {
    /// Print the result as JSON
    #[arg(short, long)]
    json: bool,

    /// Log source lookups to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding os-release and distro-release files (default: $UNIXCONFDIR or /etc)
    #[arg(long)]
    root_dir: Option<PathBuf>,

    /// Read this os-release file instead of <root-dir>/os-release
    #[arg(long)]
    os_release_file: Option<PathBuf>,

    /// Read this distro-release file instead of searching <root-dir>
    #[arg(long)]
    distro_release_file: Option<PathBuf>,

    /// Do not run lsb_release
    #[arg(long)]
    no_lsb: bool,

    /// Do not fall back to uname
    #[arg(long)]
    no_uname: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::from_env()
        .include_lsb(!args.no_lsb)
        .include_uname(!args.no_uname);
    if let Some(dir) = args.root_dir {
        config = config.with_unix_conf_dir(dir);
    }
    if let Some(path) = args.os_release_file {
        config = config.with_os_release_file(path);
    }
    if let Some(path) = args.distro_release_file {
        config = config.with_distro_release_file(path);
    }

    let distro = LinuxDistribution::new(config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&distro.info(false, false))?);
    } else {
        println!("Name: {}", distro.name(true));
        println!("Version: {}", distro.version(true, false));
        println!("Codename: {}", distro.codename());
    }
    Ok(())
}
