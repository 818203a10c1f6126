//! CLI tool for wildbits archive operations.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use commands::{Context, CreateConfig, EditCommand};
use exit_codes::ExitCode;
use wildbits::options::DEFAULT_MAX_DEPTH;
use wildbits::{OpenOptions, SaveOptions};

/// Nested SARC archive and RSTB tool
#[derive(Parser)]
#[command(name = "wildbits")]
#[command(author, version, about = "Nested SARC archive and RSTB tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress informational output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Deepest nesting level probed for nested archives
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, global = true)]
    max_depth: usize,

    /// Write rebuilt archives uncompressed even if they were Yaz0-compressed
    #[arg(long, global = true)]
    no_recompress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the archive tree, including nested archives (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,
    },

    /// Show archive layout, or details about one entry (alias: i)
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,

        /// Virtual path of an entry
        path: Option<String>,
    },

    /// Print or save the contents of one entry
    Get {
        /// Archive file to read from
        archive: PathBuf,

        /// Virtual path of the entry
        path: String,

        /// Write to this file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Keep Yaz0 compression instead of decompressing
        #[arg(long)]
        raw: bool,
    },

    /// Extract the root archive's entries to a directory (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,
    },

    /// Rename an entry, keeping it in the same directory
    Rename {
        /// Archive file to edit
        archive: PathBuf,

        /// Virtual path of the entry
        path: String,

        /// New name (a single path segment)
        new_name: String,

        /// Save to this file instead of editing in place
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Delete one or more entries (alias: rm)
    #[command(alias = "rm")]
    Delete {
        /// Archive file to edit
        archive: PathBuf,

        /// Virtual paths to delete
        #[arg(required = true)]
        paths: Vec<String>,

        /// Save to this file instead of editing in place
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Add a host file as a new entry (alias: a)
    #[command(alias = "a")]
    Add {
        /// Archive file to edit
        archive: PathBuf,

        /// Virtual path of the new entry
        path: String,

        /// Host file to read
        file: PathBuf,

        /// Save to this file instead of editing in place
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Replace or add every file found in a host folder (alias: u)
    #[command(alias = "u")]
    Update {
        /// Archive file to edit
        archive: PathBuf,

        /// Folder mirroring the archive layout
        folder: PathBuf,

        /// Save to this file instead of editing in place
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Create a new archive from a host folder (alias: c)
    #[command(alias = "c")]
    Create {
        /// Archive file to create
        archive: PathBuf,

        /// Folder whose files become entries
        folder: PathBuf,

        /// Byte order of the new archive
        #[arg(short = 'e', long, value_enum, default_value = "little")]
        endian: ByteOrder,

        /// Payload alignment; 4 selects the modern layout
        #[arg(short = 'a', long, default_value_t = 4)]
        alignment: u32,

        /// Compress the archive with Yaz0
        #[arg(short = 'z', long)]
        yaz0: bool,
    },

    /// Show a resource-size table
    Rstb {
        /// RSTB file, optionally Yaz0-compressed
        table: PathBuf,

        /// Name list used to display hashes
        #[arg(short = 'n', long, env = "WILDBITS_RSTB_NAMES")]
        names: Option<PathBuf>,

        /// Only show these resource paths
        #[arg(short = 'l', long)]
        lookup: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ByteOrder {
    Big,
    Little,
}

fn main() {
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();

    let default_level = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let ctx = Context {
        format: cli.format,
        quiet: cli.quiet,
        open: OpenOptions::new().max_depth(cli.max_depth),
        save: SaveOptions::new().keep_compressed(!cli.no_recompress),
    };

    let exit_code = match cli.command {
        Commands::List { archive } => commands::list(&ctx, &archive),

        Commands::Info { archive, path } => commands::info(&ctx, &archive, path.as_deref()),

        Commands::Get {
            archive,
            path,
            output,
            raw,
        } => commands::get(&ctx, &archive, &path, output.as_deref(), raw),

        Commands::Extract { archive, output } => commands::extract(&ctx, &archive, &output),

        Commands::Rename {
            archive,
            path,
            new_name,
            output,
        } => commands::edit(
            &ctx,
            &archive,
            EditCommand::Rename {
                path: &path,
                new_name: &new_name,
            },
            output.as_deref(),
        ),

        Commands::Delete {
            archive,
            paths,
            output,
        } => commands::edit(
            &ctx,
            &archive,
            EditCommand::Delete { paths: &paths },
            output.as_deref(),
        ),

        Commands::Add {
            archive,
            path,
            file,
            output,
        } => commands::edit(
            &ctx,
            &archive,
            EditCommand::Add {
                path: &path,
                file: &file,
            },
            output.as_deref(),
        ),

        Commands::Update {
            archive,
            folder,
            output,
        } => commands::edit(
            &ctx,
            &archive,
            EditCommand::Update { folder: &folder },
            output.as_deref(),
        ),

        Commands::Create {
            archive,
            folder,
            endian,
            alignment,
            yaz0,
        } => commands::create(
            &ctx,
            &CreateConfig {
                archive_path: &archive,
                folder: &folder,
                byte_order: endian,
                alignment,
                yaz0,
            },
        ),

        Commands::Rstb {
            table,
            names,
            lookup,
        } => commands::rstb(&ctx, &table, names.as_deref(), &lookup),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
