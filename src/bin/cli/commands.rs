//! Command implementations for the CLI tool.

use std::io::Write;
use std::path::Path;

use wildbits::codec::yaz0;
use wildbits::rstb::{NameDictionary, ResourceSizeIndex, install_global};
use wildbits::{ArchiveHandle, ArchivePath, EditResult, Endian, OpenOptions, Result, SaveOptions};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{ArchiveSummary, SizeRow, create_formatter};
use crate::{ByteOrder, OutputFormat};

/// Settings shared by every command that opens an archive.
pub struct Context {
    pub format: OutputFormat,
    pub quiet: bool,
    pub open: OpenOptions,
    pub save: SaveOptions,
}

/// An edit to run against an opened archive.
pub enum EditCommand<'a> {
    Rename { path: &'a str, new_name: &'a str },
    Delete { paths: &'a [String] },
    Add { path: &'a str, file: &'a Path },
    Update { folder: &'a Path },
}

/// Configuration for the create command.
pub struct CreateConfig<'a> {
    pub archive_path: &'a Path,
    pub folder: &'a Path,
    pub byte_order: ByteOrder,
    pub alignment: u32,
    pub yaz0: bool,
}

/// List command implementation
pub fn list(ctx: &Context, archive_path: &Path) -> ExitCode {
    let archive = match open_archive(ctx, archive_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    print!("{}", create_formatter(ctx.format).format_tree(&archive.tree()));
    ExitCode::Success
}

/// Info command implementation
pub fn info(ctx: &Context, archive_path: &Path, entry: Option<&str>) -> ExitCode {
    let formatter = create_formatter(ctx.format);
    let archive = match open_archive(ctx, archive_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match entry {
        Some(path) => match archive.entry_info(path) {
            Ok(info) => print!("{}", formatter.format_entry(&info)),
            Err(e) => return report(&e),
        },
        None => {
            let size = std::fs::metadata(archive_path).map(|m| m.len()).unwrap_or(0);
            let summary = ArchiveSummary {
                meta: *archive.meta(),
                compressed: archive.is_compressed(),
                entries: archive.len(),
                nodes: archive.tree().iter().map(|n| n.total_nodes()).sum(),
                size,
            };
            print!("{}", formatter.format_summary(&summary));
        }
    }
    ExitCode::Success
}

/// Get command implementation
pub fn get(
    ctx: &Context,
    archive_path: &Path,
    entry: &str,
    output: Option<&Path>,
    raw: bool,
) -> ExitCode {
    let archive = match open_archive(ctx, archive_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data = match archive.read(entry, !raw) {
        Ok(d) => d,
        Err(e) => return report(&e),
    };

    let written = match output {
        Some(path) => std::fs::write(path, &data),
        None => std::io::stdout().lock().write_all(&data),
    };
    if let Err(e) = written {
        eprintln!("Error: {}", e);
        return ExitCode::IoError;
    }
    if let Some(path) = output {
        if !ctx.quiet {
            eprintln!("Wrote {} bytes to {}", data.len(), path.display());
        }
    }
    ExitCode::Success
}

/// Extract command implementation
pub fn extract(ctx: &Context, archive_path: &Path, output_dir: &Path) -> ExitCode {
    let archive = match open_archive(ctx, archive_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match archive.extract_to(output_dir) {
        Ok(result) => {
            if !ctx.quiet {
                print!(
                    "{}",
                    create_formatter(ctx.format).format_extract_result(&result)
                );
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Runs one edit and saves the archive to `output`, or in place.
pub fn edit(
    ctx: &Context,
    archive_path: &Path,
    command: EditCommand<'_>,
    output: Option<&Path>,
) -> ExitCode {
    let mut archive = match open_archive(ctx, archive_path) {
        Ok(a) => a.with_save_options(ctx.save),
        Err(code) => return code,
    };

    let result = run_edit(&mut archive, command)
        .and_then(|result| archive.save(output.unwrap_or(archive_path)).map(|()| result));
    match result {
        Ok(result) => {
            if !ctx.quiet {
                print!("{}", create_formatter(ctx.format).format_edit_result(&result));
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

fn run_edit(archive: &mut ArchiveHandle, command: EditCommand<'_>) -> Result<EditResult> {
    match command {
        EditCommand::Rename { path, new_name } => archive.rename(path, new_name),
        EditCommand::Delete { paths } => {
            let mut editor = archive.edit();
            for path in paths {
                editor.delete(path)?;
            }
            editor.apply()
        }
        EditCommand::Add { path, file } => {
            let data = std::fs::read(file)?;
            let mut editor = archive.edit();
            editor.add(ArchivePath::new(path)?, data)?;
            editor.apply()
        }
        EditCommand::Update { folder } => archive.sync_from_folder(folder),
    }
}

/// Create command implementation
pub fn create(ctx: &Context, config: &CreateConfig<'_>) -> ExitCode {
    let endian = match config.byte_order {
        ByteOrder::Big => Endian::Big,
        ByteOrder::Little => Endian::Little,
    };
    let mut archive = ArchiveHandle::new(endian, config.alignment);

    let built = archive.sync_from_folder(config.folder).and_then(|result| {
        let bytes = archive.to_bytes()?;
        let bytes = if config.yaz0 {
            yaz0::compress(&bytes)
        } else {
            bytes
        };
        std::fs::write(config.archive_path, &bytes)?;
        Ok((result, bytes.len()))
    });

    match built {
        Ok((result, size)) => {
            if !ctx.quiet {
                println!(
                    "Created {} with {} files ({}, alignment {}, {} bytes)",
                    config.archive_path.display(),
                    result.entries_added,
                    endian,
                    archive.alignment(),
                    size
                );
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// RSTB command implementation
pub fn rstb(
    ctx: &Context,
    table_path: &Path,
    names: Option<&Path>,
    lookup: &[String],
) -> ExitCode {
    if let Some(path) = names {
        let installed = NameDictionary::load_path(path).and_then(install_global);
        if let Err(e) = installed {
            return report(&e);
        }
    }

    let table = match std::fs::read(table_path)
        .map_err(wildbits::Error::from)
        .and_then(|bytes| ResourceSizeIndex::open(&bytes))
    {
        Ok(t) => t,
        Err(e) => return report(&e),
    };

    let rows: Vec<SizeRow> = if lookup.is_empty() {
        table
            .iter()
            .map(|(hash, size)| SizeRow {
                name: table.display_name(hash),
                size,
            })
            .chain(table.names().map(|(name, size)| SizeRow {
                name: name.to_string(),
                size,
            }))
            .collect()
    } else {
        let mut rows = Vec::new();
        for name in lookup {
            match table.size_of(name) {
                Some(size) => rows.push(SizeRow {
                    name: name.clone(),
                    size,
                }),
                None => {
                    eprintln!("Error: {} is not in the table", name);
                    return ExitCode::NotFound;
                }
            }
        }
        rows
    };

    print!(
        "{}",
        create_formatter(ctx.format).format_size_table(&rows, table.endian().is_big())
    );
    ExitCode::Success
}

fn open_archive(ctx: &Context, path: &Path) -> std::result::Result<ArchiveHandle, ExitCode> {
    ArchiveHandle::open_path(path, &ctx.open).map_err(|e| {
        eprintln!("Error opening archive: {}", e);
        error_to_exit_code(&e)
    })
}

fn report(error: &wildbits::Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}
