//! Archive editing.
//!
//! Four operations modify an open archive, addressing entries by virtual
//! path even inside nested archives:
//! - Renaming entries
//! - Deleting entries
//! - Adding new files
//! - Replacing file contents (adding when absent)
//!
//! After a change deep inside nested archives, every archive between the
//! change and the root is re-serialized so the edit shows up in the root's
//! bytes. Archives off the edited path keep their stored bytes exactly.
//!
//! # Example
//!
//! ```rust,no_run
//! use wildbits::{ArchiveHandle, ArchivePath, OpenOptions};
//! use wildbits::edit::OperationBuilder;
//!
//! # fn main() -> wildbits::Result<()> {
//! let mut archive = ArchiveHandle::open_path("Title.pack", &OpenOptions::default())?;
//!
//! let ops = OperationBuilder::new()
//!     .rename(ArchivePath::new("Npc.sbactorpack/Model/Npc.bfres")?, "Npc_Old.bfres")
//!     .delete(ArchivePath::new("Unused.txt")?)
//!     .replace(ArchivePath::new("Npc.sbactorpack/Model/Npc.bfres")?, b"new model".to_vec())
//!     .build();
//!
//! let result = archive.apply(ops)?;
//! println!(
//!     "renamed {}, deleted {}, added {}, replaced {}",
//!     result.entries_renamed,
//!     result.entries_deleted,
//!     result.entries_added,
//!     result.entries_replaced
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Implementation Notes
//!
//! A batch is applied by:
//! 1. Cloning the current tree into a working copy
//! 2. Applying each operation in order, marking nested archives on each
//!    path dirty
//! 3. Re-serializing dirty nested archives, innermost first, each with its
//!    own byte order and alignment
//! 4. Serializing the root to confirm the result can be written
//! 5. Swapping the working copy in

mod editor;
mod operation;

pub(crate) use editor::apply_to;
pub use editor::{ArchiveEditor, EditResult};
pub use operation::{Operation, OperationBuilder};
