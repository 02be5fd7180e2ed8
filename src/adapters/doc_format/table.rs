//! Aligned terminal table.
//!
//! Columns are padded to the widest cell plus two spaces; the last column is
//! left unpadded. Widths count characters.

use super::header;
use crate::domain::schema::TypeManifest;
use crate::ports::doc_port::DocFormatter;

const PADDING: usize = 2;
const SEPARATOR_WIDTH: usize = 80;
const EXAMPLE_MAX: usize = 30;
const EXAMPLE_KEEP: usize = 27;

pub struct TableFormatter;

impl DocFormatter for TableFormatter {
    fn format(&self, manifest: &TypeManifest) -> String {
        let mut output = header(&manifest.type_name, &manifest.description);

        let mut rows: Vec<[String; 5]> = vec![[
            "FIELD".to_string(),
            "TYPE".to_string(),
            "JSON".to_string(),
            "DESCRIPTION".to_string(),
            "EXAMPLE".to_string(),
        ]];
        for field in &manifest.fields {
            let name = if field.required {
                format!("{} *", field.name)
            } else {
                field.name.clone()
            };
            let json = if field.json_name.is_empty() {
                "-".to_string()
            } else {
                field.json_name.clone()
            };
            rows.push([
                name,
                field.type_name.clone(),
                json,
                field.description.clone(),
                truncate_example(&field.example),
            ]);
        }

        // Header and rows share one width set; the separator does not split them.
        let mut widths = [0usize; 4];
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        for (i, row) in rows.iter().enumerate() {
            output.push_str(&aligned(row, &widths));
            if i == 0 {
                output.push_str(&"-".repeat(SEPARATOR_WIDTH));
                output.push('\n');
            }
        }

        output.push('\n');
        output.push_str("* = required field\n");
        output
    }
}

fn aligned(row: &[String; 5], widths: &[usize; 4]) -> String {
    let mut line = String::new();
    for (cell, width) in row.iter().zip(widths.iter()) {
        line.push_str(cell);
        let pad = width + PADDING - cell.chars().count();
        line.push_str(&" ".repeat(pad));
    }
    line.push_str(&row[4]);
    line.push('\n');
    line
}

fn truncate_example(example: &str) -> String {
    if example.is_empty() {
        return "-".to_string();
    }
    if example.chars().count() > EXAMPLE_MAX {
        let kept: String = example.chars().take(EXAMPLE_KEEP).collect();
        return format!("{}...", kept);
    }
    example.to_string()
}
