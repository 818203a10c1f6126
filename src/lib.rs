//! # wildbits
//!
//! Reading, editing and writing nested SARC archives, plus RSTB
//! resource-size tables.
//!
//! SARC archives routinely contain other SARC archives, often
//! Yaz0-compressed. This crate opens the whole nest as one tree, addresses
//! entries by `/`-separated virtual paths that cross archive boundaries, and
//! writes edits back by rebuilding only the archives that changed.
//!
//! ## Quick Start
//!
//! ### Browsing an Archive
//!
//! ```rust,no_run
//! use wildbits::{ArchiveHandle, OpenOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let archive = ArchiveHandle::open_path("TitleBG.pack", &OpenOptions::default())?;
//!     println!("{} byte order, alignment {}", archive.endian(), archive.alignment());
//!
//!     // Paths cross into nested archives transparently
//!     let info = archive.entry_info("Actor/Pack/Npc.sbactorpack/Actor/ActorLink/Npc.bxml")?;
//!     println!("{}: {:?} bytes", info.path, info.stored_size);
//!
//!     let bytes = archive.read("Actor/Pack/Npc.sbactorpack/Actor/ActorLink/Npc.bxml", true)?;
//!     assert_eq!(Some(bytes.len() as u64), info.decompressed_size);
//!     Ok(())
//! }
//! ```
//!
//! ### Editing
//!
//! ```rust,no_run
//! use wildbits::{ArchiveHandle, ArchivePath, OpenOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = ArchiveHandle::open_path("TitleBG.pack", &OpenOptions::default())?;
//!
//!     let mut editor = archive.edit();
//!     editor.rename("Actor/Pack/Npc.sbactorpack/Actor/ActorLink/Npc.bxml", "Npc2.bxml")?;
//!     editor.delete("Actor/Pack/Old.sbactorpack")?;
//!     editor.add(ArchivePath::new("Actor/Pack/New.txt")?, b"hello".to_vec())?;
//!     let result = editor.apply()?;
//!     println!("{} changes, {} archives rebuilt", result.total_changes(), result.archives_rebuilt);
//!
//!     archive.save("TitleBG.pack")?;
//!     Ok(())
//! }
//! ```
//!
//! Every edit is atomic: if any operation of a batch fails, the handle is
//! left exactly as it was.
//!
//! ### Resource-Size Tables
//!
//! ```rust,no_run
//! use wildbits::rstb::{NameDictionary, ResourceSizeIndex, install_global};
//!
//! # fn main() -> wildbits::Result<()> {
//! install_global(NameDictionary::load_path("names.txt")?)?;
//!
//! let table = ResourceSizeIndex::open(&std::fs::read("ResourceSizeTable.product.srsizetable")?)?;
//! for (hash, size) in table.iter() {
//!     println!("{}: {}", table.display_name(hash), size);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. [`Error`] has one variant per failure
//! and helpers that group them into broad kinds:
//!
//! ```rust,no_run
//! use wildbits::{ArchiveHandle, Error, OpenOptions};
//!
//! fn show(path: &str, entry: &str) -> wildbits::Result<()> {
//!     let archive = ArchiveHandle::open_path(path, &OpenOptions::default())?;
//!     match archive.read(entry, true) {
//!         Ok(bytes) => println!("{} bytes", bytes.len()),
//!         Err(e) if e.is_not_found() => eprintln!("no such entry: {}", entry),
//!         Err(Error::Decompression { reason }) => eprintln!("corrupt Yaz0 data: {}", reason),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! # fn main() {}
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | Yes | Detect nested archives of sibling entries with Rayon |
//! | `cli` | No | The `wildbits` command-line tool |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod archive;
pub mod archive_path;
pub mod codec;
pub mod edit;
pub mod error;
pub mod format;
pub mod fs;
pub mod hash;
pub mod options;
pub mod rstb;
pub mod safety;
pub mod tree;

pub use archive::ArchiveHandle;
pub use archive_path::ArchivePath;
pub use edit::{ArchiveEditor, EditResult, Operation, OperationBuilder};
pub use error::{Error, Result};
pub use format::{ArchiveMeta, ArchiveMode, Endian};
pub use fs::ExtractResult;
pub use options::{OpenOptions, SaveOptions};
pub use rstb::{NameDictionary, ResourceSizeIndex};
pub use safety::validate_extract_path;
pub use tree::view::{EntryInfo, NodeView};
pub use tree::{ArchiveLevel, ArchiveNode, NodeKind};
