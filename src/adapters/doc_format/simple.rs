//! One indented block per field.

use super::header;
use crate::domain::schema::TypeManifest;
use crate::ports::doc_port::DocFormatter;

pub struct SimpleFormatter;

impl DocFormatter for SimpleFormatter {
    fn format(&self, manifest: &TypeManifest) -> String {
        let mut output = header(&manifest.type_name, &manifest.description);

        for field in &manifest.fields {
            let required = if field.required { " (required)" } else { "" };
            output.push_str(&format!("{}{}\n", field.name, required));
            output.push_str(&format!("  Type: {}\n", field.type_name));
            if !field.json_name.is_empty() && field.json_name != "-" {
                output.push_str(&format!("  JSON: {}\n", field.json_name));
            }
            if !field.description.is_empty() {
                output.push_str(&format!("  Description: {}\n", field.description));
            }
            if !field.example.is_empty() {
                output.push_str(&format!("  Example: {}\n", field.example));
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::doc_format::fixtures::{field, manifest};

    #[test]
    fn blocks_per_field() {
        let out = SimpleFormatter.format(&manifest());
        let expected = "Type: ExitPlan\n\
                        \n\
                        profit_target (required)\n  Type: f64\n  JSON: profit_target\n  Description: Take profit price\n  Example: 48000.00\n\
                        \n\
                        note\n  Type: String\n\
                        \n";
        assert!(out.starts_with(expected), "{out}");
        assert!(out.ends_with("  Example: BTC breaks below $43000 on the daily close\n\n"));
    }

    #[test]
    fn dash_json_is_omitted() {
        let mut m = manifest();
        m.fields = vec![field("skip", "-", "bool", "", "", false)];
        assert_eq!(SimpleFormatter.format(&m), "Type: ExitPlan\n\nskip\n  Type: bool\n\n");
    }
}
