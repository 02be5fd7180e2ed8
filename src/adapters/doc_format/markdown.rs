//! Markdown schema document.

use crate::domain::schema::{FieldDescriptor, TypeManifest};
use crate::ports::doc_port::DocFormatter;

pub struct MarkdownFormatter;

impl DocFormatter for MarkdownFormatter {
    fn format(&self, manifest: &TypeManifest) -> String {
        let mut output = format!("# {}\n\n", manifest.type_name);

        if !manifest.description.is_empty() {
            output.push_str(&format!("{}\n\n", manifest.description));
        }

        output.push_str("| Field | Type | Template Variable | Description | Example |\n");
        output.push_str("|-------|------|-------------------|-------------|----------|\n");

        for field in &manifest.fields {
            output.push_str(&row(field));
        }
        output
    }
}

fn template_variable(field: &FieldDescriptor) -> String {
    if field.json_name.is_empty() || field.json_name == "-" {
        format!("{{{{.{}}}}}", field.name)
    } else {
        format!("{{{{.{}}}}} or {{{{.{}}}}}", field.name, field.json_name)
    }
}

fn row(field: &FieldDescriptor) -> String {
    let required = if field.required { "✓ " } else { "" };
    format!(
        "| {} | {} | `{}` | {}{} | `{}` |\n",
        field.name,
        field.type_name,
        template_variable(field),
        required,
        field.description,
        field.example,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::doc_format::fixtures::{field, manifest};

    #[test]
    fn starts_with_title_and_header() {
        let out = MarkdownFormatter.format(&manifest());
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("# ExitPlan"));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(
            lines.next(),
            Some("| Field | Type | Template Variable | Description | Example |")
        );
    }

    #[test]
    fn one_row_per_field_in_order() {
        let m = manifest();
        let out = MarkdownFormatter.format(&m);
        let rows: Vec<&str> = out.lines().skip(4).collect();
        assert_eq!(rows.len(), m.fields.len());
        for (row, f) in rows.iter().zip(&m.fields) {
            assert!(row.starts_with(&format!("| {} |", f.name)));
        }
    }

    #[test]
    fn row_cells() {
        let out = MarkdownFormatter.format(&manifest());
        assert!(out.contains(
            "| profit_target | f64 | `{{.profit_target}} or {{.profit_target}}` | ✓ Take profit price | `48000.00` |\n"
        ));
        assert!(out.contains("| note | String | `{{.note}}` |  | `` |\n"));
    }

    #[test]
    fn dash_wire_name_has_single_variable() {
        let f = field("Skip", "-", "bool", "ignored", "", false);
        assert_eq!(template_variable(&f), "{{.Skip}}");
    }

    #[test]
    fn description_paragraph_when_present() {
        let mut m = manifest();
        m.description = "Exit strategy".into();
        assert!(MarkdownFormatter.format(&m).starts_with("# ExitPlan\n\nExit strategy\n\n| Field"));
    }
}
