use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use addonman::application::FailurePolicy;
use addonman::commands::{self, Config};
use addonman::domain::model::Action;
use addonman::runtime::RealRuntime;

/// addonman - Addon lifecycle manager
///
/// Install, upgrade and remove registry addons for a host application, and
/// pull updates for addons checked out on disk.
///
/// Examples:
///   addonman --host-root /srv/host add left-pad
///   addonman --host-root /srv/host update /srv/addons/my-addon
#[derive(Parser, Debug)]
#[command(author, version = env!("ADDONMAN_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Host application root (also via ADDONMAN_HOST_ROOT)
    #[arg(long, env = "ADDONMAN_HOST_ROOT", value_name = "PATH", global = true)]
    host_root: Option<PathBuf>,

    /// Package manager executable
    #[arg(long, env = "ADDONMAN_PACKAGE_MANAGER", default_value = "yarn", global = true)]
    package_manager: String,

    /// Host CLI used to register and unregister addons
    #[arg(long, env = "ADDONMAN_HOST_CLI", default_value = "hydrooj", global = true)]
    host_cli: String,

    /// Version control executable used for local addons
    #[arg(long, env = "ADDONMAN_VCS", default_value = "git", global = true)]
    vcs: String,

    /// Remote pulled from when updating a local addon
    #[arg(long, default_value = "origin", global = true)]
    git_remote: String,

    /// Branch pulled when updating a local addon
    #[arg(long, default_value = "main", global = true)]
    git_branch: String,

    /// State file listing installed addons, relative to the host root
    #[arg(long, default_value = "addon.json", global = true)]
    installed_file: String,

    /// State file listing addons that may not be removed, relative to the host root
    #[arg(long, default_value = "addon-locked.json", global = true)]
    locked_file: String,

    /// Run the second step of add/remove even if the first one fails
    #[arg(long, global = true)]
    keep_going: bool,

    /// Kill any single command that runs longer than this many seconds
    #[arg(long, env = "ADDONMAN_TIMEOUT", value_name = "SECS", global = true)]
    timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install an addon from the registry and register it with the host
    Add(PackageArgs),

    /// Upgrade a registry addon, or pull a local addon's checkout
    Update(PackageArgs),

    /// Uninstall an addon and unregister it from the host
    #[command(alias = "delete")]
    Remove(RemoveArgs),

    /// Show installed addons and which of them are locked
    Status,
}

#[derive(clap::Args, Debug)]
struct PackageArgs {
    /// Registry package name, or an absolute path for a local addon
    #[arg(value_name = "NAME")]
    name: String,

    /// Exact version to install or upgrade to (defaults to latest)
    #[arg(value_name = "VERSION")]
    version: Option<String>,
}

#[derive(clap::Args, Debug)]
struct RemoveArgs {
    /// Registry package name
    #[arg(value_name = "NAME")]
    name: String,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let Some(host_root) = self.host_root.clone() else {
            anyhow::bail!("No host root given. Pass --host-root or set ADDONMAN_HOST_ROOT.");
        };

        Ok(Config {
            host_root,
            installed_file: self.installed_file.clone(),
            locked_file: self.locked_file.clone(),
            package_manager: self.package_manager.clone(),
            host_cli: self.host_cli.clone(),
            vcs: self.vcs.clone(),
            git_remote: self.git_remote.clone(),
            git_branch: self.git_branch.clone(),
            policy: if self.keep_going {
                FailurePolicy::Continue
            } else {
                FailurePolicy::Abort
            },
            timeout: self.timeout.map(Duration::from_secs),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = cli.config()?;
    let runtime = Arc::new(RealRuntime);

    match cli.command {
        Commands::Status => {
            let state = commands::build_state(Arc::clone(&runtime), &config);
            commands::status(runtime.as_ref(), &state)?
        }
        Commands::Add(args) => {
            let manager = commands::build_manager(runtime, &config)?;
            commands::manage(&manager, Action::Add, &args.name, args.version.as_deref()).await?
        }
        Commands::Update(args) => {
            let manager = commands::build_manager(runtime, &config)?;
            commands::manage(&manager, Action::Update, &args.name, args.version.as_deref()).await?
        }
        Commands::Remove(args) => {
            let manager = commands::build_manager(runtime, &config)?;
            commands::manage(&manager, Action::Delete, &args.name, None).await?
        }
    }
    Ok(())
}
