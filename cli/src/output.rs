//! Output formatting for parsed documents.

use sage_config_core::Document;
use serde::{Deserialize, Serialize};

/// Machine-readable formats for `parse`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Serializes a document in the requested format.
pub fn format_document(doc: &Document, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(doc)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(doc).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

/// Renders a plain-text overview of catalogs and packages.
pub fn summary_table(doc: &Document) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}  v{}", doc.meta.name, doc.meta.version));
    if !doc.meta.author.is_empty() {
        out.push_str(&format!("  by {}", doc.meta.author));
    }
    out.push('\n');

    if !doc.catalogs.is_empty() {
        let width = doc
            .catalogs
            .iter()
            .map(|c| c.id.len())
            .max()
            .unwrap_or(0)
            .max("CATALOG".len());
        out.push_str(&format!(
            "\n{:<width$}  {:<6}  {:>6}  {:>5}\n",
            "CATALOG", "TYPE", "FIELDS", "RULES"
        ));
        for catalog in &doc.catalogs {
            out.push_str(&format!(
                "{:<width$}  {:<6}  {:>6}  {:>5}\n",
                catalog.id,
                catalog.file_format.file_type.as_str(),
                catalog.fields.len(),
                catalog.rule_count(),
            ));
        }
    }

    if !doc.packages.is_empty() {
        let width = doc
            .packages
            .iter()
            .map(|p| p.id.len())
            .max()
            .unwrap_or(0)
            .max("PACKAGE".len());
        out.push_str(&format!(
            "\n{:<width$}  {:<6}  {:>5}  CATALOGS\n",
            "PACKAGE", "TYPE", "RULES"
        ));
        for package in &doc.packages {
            out.push_str(&format!(
                "{:<width$}  {:<6}  {:>5}  {}\n",
                package.id,
                package.file_format.file_type.as_str(),
                package.package_validation.len(),
                package.catalogs.join(", "),
            ));
        }
    }

    out.push_str(&format!(
        "\n{} catalog(s), {} package(s), {} field(s), {} rule(s)\n",
        doc.catalogs.len(),
        doc.packages.len(),
        doc.field_count(),
        doc.rule_count(),
    ));
    out
}

#[cfg(test)]
mod tests {
    use sage_config_core::{Catalog, Field, Package, ValidationRule};

    use super::*;

    fn sample() -> Document {
        let mut doc = Document::default();
        doc.meta.author = "Alice".into();
        doc.add_catalog(
            Catalog::new("ventas").with_field(
                Field::new("monto").with_rule(ValidationRule::new("positivo", "df['monto'] > 0")),
            ),
        );
        doc.add_package(Package::new("diario").with_catalog("ventas"));
        doc
    }

    #[test]
    fn test_format_document_json() {
        let out = format_document(&sample(), OutputFormat::Json).unwrap();
        assert!(out.contains("\"id\": \"ventas\""));
        assert!(out.contains("\"type\": \"CSV\""));
    }

    #[test]
    fn test_format_document_yaml() {
        let out = format_document(&sample(), OutputFormat::Yaml).unwrap();
        assert!(out.contains("id: ventas"));
        assert!(out.contains("severity: error"));
    }

    #[test]
    fn test_summary_table() {
        let table = summary_table(&sample());
        assert!(table.starts_with("Configuración SAGE  v1.0.0  by Alice\n"));
        assert!(table.contains("CATALOG  TYPE    FIELDS  RULES\n"));
        assert!(table.contains("ventas   CSV          1      1\n"));
        assert!(table.contains("diario   ZIP         0  ventas\n"));
        assert!(table.ends_with("1 catalog(s), 1 package(s), 1 field(s), 1 rule(s)\n"));
    }

    #[test]
    fn test_summary_table_empty_document() {
        let table = summary_table(&Document::default());
        assert!(!table.contains("CATALOG"));
        assert!(!table.contains("PACKAGE"));
        assert!(table.contains("0 catalog(s)"));
    }
}
