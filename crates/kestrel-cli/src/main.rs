use anyhow::Result;
use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(author, version)]
#[command(
    about = "Manage isolated browser identity profiles",
    long_about = "Kestrel keeps independent browser profiles, each with its own \
                  directory, fingerprint, extensions and proxy settings. Profiles \
                  can be created, cloned, frozen into archives, thawed back and \
                  launched in an isolated engine instance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the data directory and an empty profile store
    Init,

    /// List all profiles
    List {
        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new profile
    Create {
        /// Display name, unique across profiles
        name: String,

        /// Free-form label shown in listings
        #[arg(long)]
        label: Option<String>,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Seed the directory from an existing profile
        #[arg(long, value_name = "PROFILE")]
        copy_from: Option<String>,

        /// Seed the directory from a template directory
        #[arg(long, value_name = "DIR", conflicts_with = "copy_from")]
        from_path: Option<PathBuf>,

        /// Engine the profile launches with (chromium, firefox)
        #[arg(long, default_value = "chromium")]
        engine: String,

        /// Skip fingerprint generation for this profile
        #[arg(long)]
        no_fingerprint: bool,
    },

    /// Register an existing directory as a profile
    Import {
        /// Directory to bring under management
        path: PathBuf,

        /// Display name for the imported profile
        name: String,

        /// Copy the directory into the profiles root instead of
        /// referencing it in place
        #[arg(long)]
        copy: bool,

        /// Free-form label shown in listings
        #[arg(long)]
        label: Option<String>,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Copy a profile's directory and settings under a new identity
    Clone {
        /// Profile to clone (id, name or id prefix)
        source: String,

        /// Name for the clone
        name: String,

        /// Free-form label shown in listings
        #[arg(long)]
        label: Option<String>,

        /// Tags for the clone; the source's tags are kept when omitted
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Pack a profile into an archive and remove its directory
    Freeze {
        /// Profile to freeze (id, name or id prefix)
        profile: String,
    },

    /// Restore a frozen profile's directory from its archive
    Thaw {
        /// Profile to thaw (id, name or id prefix)
        profile: String,
    },

    /// Delete profiles together with their directories or archives
    Remove {
        /// Profiles to remove (id, name or id prefix)
        #[arg(required = true)]
        profiles: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Pack a profile into an archive without changing its state
    Export {
        /// Profile to export (id, name or id prefix)
        profile: String,

        /// Archive file to write, or an existing directory for a
        /// default file name
        dest: PathBuf,
    },

    /// Add or remove tags on a profile
    Tag {
        /// Profile to tag (id, name or id prefix)
        profile: String,

        /// Comma-separated tags to add
        #[arg(value_delimiter = ',')]
        tags: Vec<String>,

        /// Comma-separated tags to remove
        #[arg(long, value_delimiter = ',')]
        remove: Vec<String>,
    },

    /// Change a profile's display name
    Rename {
        /// Profile to rename (id, name or id prefix)
        profile: String,

        /// New display name
        name: String,
    },

    /// Set a profile's usage kind
    Mark {
        /// Profile to mark (id, name or id prefix)
        profile: String,

        /// Usage kind (register, long-term, temp, other)
        #[arg(long)]
        kind: String,
    },

    /// Edit a profile's settings
    Update {
        /// Profile to update (id, name or id prefix)
        profile: String,

        #[command(flatten)]
        changes: commands::profile::UpdateOpts,
    },

    /// Inspect or replace a profile's fingerprint
    Fingerprint {
        #[command(subcommand)]
        action: FingerprintAction,
    },

    /// Manage the extensions staged into a profile
    Extensions {
        #[command(subcommand)]
        action: ExtensionsAction,
    },

    /// Organize profiles into named groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Show one profile in detail
    Info {
        /// Profile to inspect (id, name or id prefix)
        profile: String,

        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the browser for a profile and wait until it closes
    Launch {
        /// Profile to launch (id, name or id prefix)
        profile: String,

        /// Extra engine arguments, whitespace separated
        #[arg(long)]
        args: Option<String>,

        /// Engine binary to use for this launch only
        #[arg(long, value_name = "PATH")]
        engine_path: Option<PathBuf>,
    },

    /// Show or change tool-wide configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FingerprintAction {
    /// Print a profile's stored fingerprint
    Show {
        /// Profile to inspect (id, name or id prefix)
        profile: String,
    },

    /// Draw a fresh fingerprint for a profile
    Regenerate {
        /// Profile to update (id, name or id prefix)
        profile: String,
    },
}

#[derive(Subcommand)]
enum ExtensionsAction {
    /// List the extensions a profile uses
    Show {
        /// Profile to inspect (id, name or id prefix)
        profile: String,
    },

    /// Replace the profile's extension list
    Set {
        /// Profile to update (id, name or id prefix)
        profile: String,

        /// Extension names, as directories under the shared root
        #[arg(required = true, value_delimiter = ',')]
        names: Vec<String>,
    },

    /// Drop the profile's extension list and its staged copies
    Clear {
        /// Profile to update (id, name or id prefix)
        profile: String,
    },

    /// Stage the listed extensions from the shared root into the profile
    Sync {
        /// Profile to update (id, name or id prefix)
        profile: String,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    /// List all groups with their member counts
    List,

    /// Create a new group
    Create {
        /// Group name, unique across groups
        name: String,

        /// Display color
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a group, detaching its member profiles
    Remove {
        /// Group to delete (id or name)
        group: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,

    /// Change configuration values
    Set {
        /// Engine binary to launch (empty value to return to auto-detection)
        #[arg(long, value_name = "PATH", value_parser = OsStringValueParser::new().map(PathBuf::from))]
        engine_path: Option<PathBuf>,

        /// Directory holding shared extensions (empty value to unset)
        #[arg(long, value_name = "DIR")]
        extensions_root: Option<PathBuf>,

        /// Arguments appended to every launch, whitespace separated
        #[arg(long, allow_hyphen_values = true)]
        default_args: Option<String>,

        /// Environment variables for the engine process, KEY=VALUE pairs
        #[arg(long, value_delimiter = ',')]
        env: Vec<String>,

        /// Drop all configured environment variables first
        #[arg(long)]
        clear_env: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli.command))
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init => commands::init::execute().await,
        Commands::List { json } => commands::list::list(json).await,
        Commands::Create {
            name,
            label,
            tags,
            copy_from,
            from_path,
            engine,
            no_fingerprint,
        } => {
            commands::profile::create(name, label, tags, copy_from, from_path, engine, no_fingerprint)
                .await
        }
        Commands::Import {
            path,
            name,
            copy,
            label,
            tags,
        } => commands::profile::import(path, name, copy, label, tags).await,
        Commands::Clone {
            source,
            name,
            label,
            tags,
        } => commands::profile::clone(&source, name, label, tags).await,
        Commands::Freeze { profile } => commands::archive::freeze(&profile).await,
        Commands::Thaw { profile } => commands::archive::thaw(&profile).await,
        Commands::Remove { profiles, force } => commands::profile::remove(&profiles, force).await,
        Commands::Export { profile, dest } => commands::archive::export(&profile, &dest).await,
        Commands::Tag {
            profile,
            tags,
            remove,
        } => commands::profile::tag(&profile, &tags, &remove).await,
        Commands::Rename { profile, name } => commands::profile::rename(&profile, &name).await,
        Commands::Mark { profile, kind } => commands::profile::mark(&profile, &kind).await,
        Commands::Update { profile, changes } => {
            commands::profile::update(&profile, changes).await
        }
        Commands::Fingerprint { action } => match action {
            FingerprintAction::Show { profile } => commands::fingerprint::show(&profile).await,
            FingerprintAction::Regenerate { profile } => {
                commands::fingerprint::regenerate(&profile).await
            }
        },
        Commands::Extensions { action } => match action {
            ExtensionsAction::Show { profile } => commands::extensions::show(&profile).await,
            ExtensionsAction::Set { profile, names } => {
                commands::extensions::set(&profile, &names).await
            }
            ExtensionsAction::Clear { profile } => commands::extensions::clear(&profile).await,
            ExtensionsAction::Sync { profile } => commands::extensions::sync(&profile).await,
        },
        Commands::Group { action } => match action {
            GroupAction::List => commands::group::list().await,
            GroupAction::Create { name, color } => commands::group::create(&name, color).await,
            GroupAction::Remove { group } => commands::group::remove(&group).await,
        },
        Commands::Info { profile, json } => commands::list::info(&profile, json).await,
        Commands::Launch {
            profile,
            args,
            engine_path,
        } => commands::launch::execute(&profile, engine_path, args).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show().await,
            ConfigAction::Set {
                engine_path,
                extensions_root,
                default_args,
                env,
                clear_env,
            } => {
                commands::config::set(engine_path, extensions_root, default_args, env, clear_env)
                    .await
            }
        },
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kestrel=debug,kestrel_core=debug,kestrel_browser=debug")
    } else {
        EnvFilter::new("kestrel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
