//! Writer for the SAGE configuration dialect.
//!
//! The output layout is the exact inverse of the parser: fixed key order,
//! fixed indentation, optional keys written only when they carry a value.
//! Regenerating a parsed generator output reproduces it byte for byte.

use std::borrow::Cow;
use std::io;

use sage_config_core::{Catalog, Document, Field, Package, ValidationRule};

/// Renders a document as dialect text.
///
/// # Examples
///
/// ```
/// use sage_config_core::{Catalog, Document};
///
/// let mut doc = Document::default();
/// doc.meta.name = "Demo".into();
/// doc.add_catalog(Catalog::new("ventas"));
///
/// let text = sage_config_dialect::generate(&doc);
/// assert!(text.starts_with("sage_yaml:\n  name: Demo\n"));
/// assert!(text.contains("  ventas:\n    name: ventas\n"));
/// assert!(text.contains("      delimiter: ','\n"));
/// assert!(text.ends_with("packages:\n"));
/// ```
pub fn generate(doc: &Document) -> String {
    let mut out = Emitter::default();

    out.line(0, "sage_yaml:");
    out.pair(2, "name", &doc.meta.name);
    out.pair(2, "description", &doc.meta.description);
    out.pair(2, "version", &doc.meta.version);
    out.pair(2, "author", &doc.meta.author);
    if has_text(&doc.meta.comments) {
        out.pair(2, "comments", &doc.meta.comments);
    }
    out.blank();

    out.line(0, "catalogs:");
    for catalog in &doc.catalogs {
        emit_catalog(&mut out, catalog);
    }
    out.blank();

    out.line(0, "packages:");
    for package in &doc.packages {
        emit_package(&mut out, package);
    }

    out.finish()
}

/// Writes [`generate`] output to `writer`.
///
/// # Errors
///
/// Propagates any error from `writer`.
pub fn write_document<W: io::Write>(doc: &Document, mut writer: W) -> io::Result<()> {
    writer.write_all(generate(doc).as_bytes())?;
    writer.flush()
}

fn emit_catalog(out: &mut Emitter, catalog: &Catalog) {
    out.line(2, format!("{}:", catalog.id));
    out.pair(4, "name", &catalog.name);
    if has_text(&catalog.description) {
        out.pair(4, "description", &catalog.description);
    }
    out.pair(4, "filename", &catalog.filename);

    let format = &catalog.file_format;
    out.line(4, "file_format:");
    out.pair(6, "type", format.file_type.as_str());
    if format.file_type.is_csv() {
        out.line(6, format!("delimiter: '{}'", single_line(&format.delimiter)));
    }
    out.line(6, format!("header: {}", format.header));

    if !catalog.fields.is_empty() {
        out.line(4, "fields:");
        for field in &catalog.fields {
            emit_field(out, field);
        }
    }

    emit_rules(out, 4, "row_validation", &catalog.row_validation);
    emit_rules(out, 4, "catalog_validation", &catalog.catalog_validation);
}

fn emit_field(out: &mut Emitter, field: &Field) {
    out.line(4, format!("- name: {}", scalar(&field.name)));
    out.pair(6, "type", &field.field_type);
    if field.required {
        out.line(6, "required: true");
    }
    if field.unique {
        out.line(6, "unique: true");
    }
    if has_text(&field.description) {
        out.pair(6, "description", &field.description);
    }
    if has_text(&field.default_value) {
        out.pair(6, "defaultValue", &field.default_value);
    }
    emit_rules(out, 6, "validation_rules", &field.validation_rules);
}

fn emit_package(out: &mut Emitter, package: &Package) {
    out.line(2, format!("{}:", package.id));
    out.pair(4, "name", &package.name);
    if has_text(&package.description) {
        out.pair(4, "description", &package.description);
    }
    out.line(4, "file_format:");
    out.pair(6, "type", package.file_format.file_type.as_str());

    if !package.catalogs.is_empty() {
        out.line(4, "catalogs:");
        for reference in &package.catalogs {
            if reference.is_empty() {
                out.line(4, "- ''");
            } else {
                out.line(4, format!("- {}", scalar(reference)));
            }
        }
    }

    emit_rules(out, 4, "package_validation", &package.package_validation);
}

/// Writes a rule list whose key and dash items sit at `indent`.
fn emit_rules(out: &mut Emitter, indent: usize, key: &str, rules: &[ValidationRule]) {
    if rules.is_empty() {
        return;
    }
    out.line(indent, format!("{key}:"));
    for rule in rules {
        out.line(indent, format!("- name: {}", scalar(&rule.name)));
        out.pair(indent + 2, "rule", &rule.rule);
        out.pair(indent + 2, "description", &rule.description);
        out.pair(indent + 2, "severity", &rule.severity.as_upper());
    }
}

/// Whether an optional value still says something once collapsed.
fn has_text(value: &str) -> bool {
    !single_line(value).is_empty()
}

/// Collapses embedded line breaks the way the parser folds continuation
/// lines: each physical line trimmed, joined by one space.
fn single_line(value: &str) -> Cow<'_, str> {
    if !value.contains(['\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let joined = value
        .lines()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Cow::Owned(joined)
}

/// Encodes a scalar so the parser reads back the same string.
///
/// Values with surrounding whitespace or a surrounding quote pair are
/// wrapped in one extra pair of quotes, which the parser strips.
fn scalar(value: &str) -> Cow<'_, str> {
    let value = single_line(value);
    if !needs_quotes(&value) {
        return value;
    }
    let quote = if value.starts_with('"') || value.ends_with('"') {
        '\''
    } else {
        '"'
    };
    Cow::Owned(format!("{quote}{value}{quote}"))
}

fn needs_quotes(value: &str) -> bool {
    if value.trim() != value {
        return true;
    }
    let bytes = value.as_bytes();
    bytes.len() >= 2
        && bytes[0] == bytes[bytes.len() - 1]
        && (bytes[0] == b'"' || bytes[0] == b'\'')
}

#[derive(Default)]
struct Emitter {
    buf: String,
}

impl Emitter {
    fn line(&mut self, indent: usize, content: impl AsRef<str>) {
        for _ in 0..indent {
            self.buf.push(' ');
        }
        self.buf.push_str(content.as_ref());
        self.buf.push('\n');
    }

    /// Writes `key: value`, or a bare `key:` when the value is empty.
    fn pair(&mut self, indent: usize, key: &str, value: &str) {
        let value = scalar(value);
        if value.is_empty() {
            self.line(indent, format!("{key}:"));
        } else {
            self.line(indent, format!("{key}: {value}"));
        }
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn finish(self) -> String {
        self.buf
    }
}
