//! Plain-text rendering of layouts and byte images.

use std::fmt::Write as _;

use uniforge_layout::{Layout, ResolvedField};

/// One row per flat field, members indented under their struct.
pub fn layout_table(layout: &Layout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:<24} {:>8} {:>6} {:>7} {:>7}", "field", "offset", "count", "stride", "bytes");
    for field in layout.fields() {
        write_rows(&mut out, field, 0);
    }
    let _ = writeln!(out, "  total: {} bytes", layout.size_bytes());
    out
}

fn write_rows(out: &mut String, field: &ResolvedField, depth: usize) {
    let name = format!("{}#{} {}", "  ".repeat(depth), field.id(), field.ty());
    let _ = writeln!(
        out,
        "  {:<24} {:>8} {:>6} {:>7} {:>7}",
        name,
        field.aligned_offset(),
        field.count(),
        field.stride(),
        field.size_bytes()
    );
    for child in field.children() {
        write_rows(out, child, depth + 1);
    }
}

/// Classic 16-bytes-per-row hex dump; one row per std140 slot.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "  {:04x} ", row * 16);
        for word in chunk.chunks(4) {
            out.push(' ');
            for b in word {
                let _ = write!(out, "{b:02x}");
            }
        }
        out.push('\n');
    }
    out
}
