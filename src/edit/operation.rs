//! Archive modification operations.

use crate::ArchivePath;

/// A modification of an archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Rename an entry in place.
    Rename {
        /// Entry to rename.
        path: ArchivePath,
        /// New name (a single segment).
        new_name: String,
    },
    /// Delete an entry.
    Delete {
        /// Entry to delete.
        path: ArchivePath,
    },
    /// Add a new file; fails if the name is taken.
    Add {
        /// Path for the new file.
        path: ArchivePath,
        /// Stored bytes of the new file.
        data: Vec<u8>,
    },
    /// Overwrite a file or nested archive, or add it if absent.
    Replace {
        /// Path to overwrite.
        path: ArchivePath,
        /// Stored bytes of the file.
        data: Vec<u8>,
    },
}

impl Operation {
    /// Returns the path this operation addresses.
    pub fn target_path(&self) -> &ArchivePath {
        match self {
            Operation::Rename { path, .. }
            | Operation::Delete { path }
            | Operation::Add { path, .. }
            | Operation::Replace { path, .. } => path,
        }
    }

    /// Returns whether this operation carries new payload bytes.
    pub fn has_payload(&self) -> bool {
        matches!(self, Operation::Add { .. } | Operation::Replace { .. })
    }

    /// Returns the operation type as a string.
    pub fn operation_type(&self) -> &'static str {
        match self {
            Operation::Rename { .. } => "rename",
            Operation::Delete { .. } => "delete",
            Operation::Add { .. } => "add",
            Operation::Replace { .. } => "replace",
        }
    }
}

/// Builder for creating operations fluently.
#[derive(Debug, Default)]
pub struct OperationBuilder {
    operations: Vec<Operation>,
}

impl OperationBuilder {
    /// Creates a new operation builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rename operation.
    pub fn rename(mut self, path: ArchivePath, new_name: impl Into<String>) -> Self {
        self.operations.push(Operation::Rename {
            path,
            new_name: new_name.into(),
        });
        self
    }

    /// Adds a delete operation.
    pub fn delete(mut self, path: ArchivePath) -> Self {
        self.operations.push(Operation::Delete { path });
        self
    }

    /// Adds an add operation.
    pub fn add(mut self, path: ArchivePath, data: impl Into<Vec<u8>>) -> Self {
        self.operations.push(Operation::Add {
            path,
            data: data.into(),
        });
        self
    }

    /// Adds a replace operation.
    pub fn replace(mut self, path: ArchivePath, data: impl Into<Vec<u8>>) -> Self {
        self.operations.push(Operation::Replace {
            path,
            data: data.into(),
        });
        self
    }

    /// Returns the number of queued operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if no operations are queued.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Builds the list of operations.
    pub fn build(self) -> Vec<Operation> {
        self.operations
    }
}
