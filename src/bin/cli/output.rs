//! Output formatting for CLI operations.

use serde::Serialize;
use serde_json::json;
use wildbits::{ArchiveMeta, EditResult, EntryInfo, ExtractResult, NodeKind, NodeView};

/// Summary of an opened archive for the `info` command.
#[derive(Debug, Serialize)]
pub struct ArchiveSummary {
    #[serde(flatten)]
    pub meta: ArchiveMeta,
    pub compressed: bool,
    pub entries: usize,
    pub nodes: usize,
    pub size: u64,
}

/// One row of a size-table listing.
#[derive(Debug, Serialize)]
pub struct SizeRow {
    pub name: String,
    pub size: u32,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the archive tree
    fn format_tree(&self, tree: &[NodeView]) -> String;

    /// Formats archive information
    fn format_summary(&self, summary: &ArchiveSummary) -> String;

    /// Formats information about one entry
    fn format_entry(&self, info: &EntryInfo) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;

    /// Formats the outcome of an edit
    fn format_edit_result(&self, result: &EditResult) -> String;

    /// Formats a size-table listing
    fn format_size_table(&self, rows: &[SizeRow], big_endian: bool) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl HumanFormatter {
    fn push_node(output: &mut String, node: &NodeView, depth: usize) {
        let indent = "  ".repeat(depth);
        let marker = match node.kind {
            NodeKind::Directory => "/",
            NodeKind::Archive => " [archive]",
            NodeKind::File => "",
        };
        let size = node.size.map(humanize_bytes).unwrap_or_default();
        let yaz0 = if node.compressed { " yaz0" } else { "" };
        output.push_str(&format!(
            "{:>12}{:5} {}{}{}\n",
            size, yaz0, indent, node.name, marker
        ));
        for child in &node.children {
            Self::push_node(output, child, depth + 1);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_tree(&self, tree: &[NodeView]) -> String {
        let mut output = String::new();
        for node in tree {
            Self::push_node(&mut output, node, 0);
        }
        let total: usize = tree.iter().map(NodeView::total_nodes).sum();
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("{} nodes\n", total));
        output
    }

    fn format_summary(&self, summary: &ArchiveSummary) -> String {
        let mut output = String::new();

        output.push_str("Archive Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Byte order:     {}\n", summary.meta.endian));
        output.push_str(&format!("  Alignment:      {}\n", summary.meta.alignment));
        output.push_str(&format!("  Mode:           {:?}\n", summary.meta.mode));
        output.push_str(&format!(
            "  Yaz0:           {}\n",
            if summary.compressed { "Yes" } else { "No" }
        ));
        output.push_str(&format!("  Entries:        {}\n", summary.entries));
        output.push_str(&format!("  Tree nodes:     {}\n", summary.nodes));
        output.push_str(&format!(
            "  Size:           {}\n",
            humanize_bytes(summary.size)
        ));
        output
    }

    fn format_entry(&self, info: &EntryInfo) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} ({})\n", info.path, info.kind));
        if let Some(size) = info.stored_size {
            output.push_str(&format!("  Stored size:    {}\n", humanize_bytes(size)));
        }
        if let Some(size) = info.decompressed_size {
            output.push_str(&format!("  Decompressed:   {}\n", humanize_bytes(size)));
        }
        if info.compressed {
            output.push_str("  Yaz0:           Yes\n");
        }
        if info.child_count > 0 {
            output.push_str(&format!("  Children:       {}\n", info.child_count));
        }
        if let Some(meta) = &info.archive {
            output.push_str(&format!(
                "  Archive:        {}, alignment {}\n",
                meta.endian, meta.alignment
            ));
        }
        output
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let mut output = format!(
            "Extracted {} files ({})\n",
            result.files_written,
            humanize_bytes(result.bytes_written)
        );
        if result.files_skipped > 0 {
            output.push_str(&format!(
                "Skipped {} entries with unrepresentable names\n",
                result.files_skipped
            ));
        }
        output
    }

    fn format_edit_result(&self, result: &EditResult) -> String {
        let mut output = String::new();
        for (label, count) in [
            ("Renamed", result.entries_renamed),
            ("Deleted", result.entries_deleted),
            ("Added", result.entries_added),
            ("Replaced", result.entries_replaced),
        ] {
            if count > 0 {
                output.push_str(&format!("{:<9} {}\n", label, count));
            }
        }
        output.push_str(&format!(
            "Rebuilt {} nested archives, archive is now {}\n",
            result.archives_rebuilt,
            humanize_bytes(result.archive_size)
        ));
        output
    }

    fn format_size_table(&self, rows: &[SizeRow], big_endian: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} entries ({})\n",
            rows.len(),
            if big_endian { "big-endian" } else { "little-endian" }
        ));
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for row in rows {
            output.push_str(&format!("{:>10} {}\n", row.size, row.name));
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

impl OutputFormatter for JsonFormatter {
    fn format_tree(&self, tree: &[NodeView]) -> String {
        to_json(tree)
    }

    fn format_summary(&self, summary: &ArchiveSummary) -> String {
        to_json(summary)
    }

    fn format_entry(&self, info: &EntryInfo) -> String {
        to_json(info)
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        to_json(result)
    }

    fn format_edit_result(&self, result: &EditResult) -> String {
        to_json(result)
    }

    fn format_size_table(&self, rows: &[SizeRow], big_endian: bool) -> String {
        let table: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|row| (row.name.clone(), json!(row.size)))
            .collect();
        to_json(&json!({ "rstb": table, "be": big_endian }))
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
