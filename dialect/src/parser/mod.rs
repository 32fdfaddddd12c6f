//! Tolerant reader for the SAGE configuration dialect.
//!
//! The dialect is a fixed, indentation-sensitive subset of YAML:
//!
//! ```text
//! sage_yaml:
//!   name: Demo
//! catalogs:
//!   ventas:                 <- indent 2: catalog id
//!     filename: ventas.csv  <- indent 4: catalog property
//!     file_format:
//!       type: CSV           <- indent 6: nested property
//!     fields:
//!     - name: monto         <- indent 4: field item
//!       type: decimal
//!       validation_rules:
//!       - name: positivo    <- indent 6: field rule item
//!         rule: df['monto'] > 0
//! packages:
//!   diario:
//!     catalogs:
//!     - ventas
//! ```
//!
//! Parsing is a single forward pass. Lines that match no structural
//! pattern are skipped rather than rejected; [`DialectParser::strict`]
//! collects them for inspection. The only failures are conditions that make
//! the input unreadable as a whole (see [`ParseError`]).

mod line;
mod scan;
mod scope;

use std::fmt;
use std::path::Path;

use sage_config_core::Document;

use crate::error::{ParseError, Result};

/// Inputs with more lines than this are rejected without scanning.
pub const MAX_LINES: usize = 1_000_000;

/// Why a line was not applied to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Content before any `sage_yaml:`, `catalogs:` or `packages:` header.
    OutsideSection,
    /// Indentation contains a tab.
    TabIndentation,
    /// Property line with no catalog or package declared yet.
    NoOpenEntry,
    /// Key not part of the dialect at this position.
    UnknownKey(String),
    /// Rule or field list item without a leading `name:`.
    MissingName,
    /// Property line with no item to attach it to.
    NoOpenTarget,
    /// Line shape not recognized at this indentation.
    Unrecognized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OutsideSection => f.write_str("outside any section"),
            SkipReason::TabIndentation => f.write_str("tab in indentation"),
            SkipReason::NoOpenEntry => f.write_str("no catalog or package declared"),
            SkipReason::UnknownKey(key) => write!(f, "unknown key '{key}'"),
            SkipReason::MissingName => f.write_str("list item without 'name:'"),
            SkipReason::NoOpenTarget => f.write_str("nothing to attach property to"),
            SkipReason::Unrecognized => f.write_str("unrecognized line"),
        }
    }
}

/// A line the scanner did not apply, recorded in strict mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// Raw line text.
    pub text: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.text.trim(), self.reason)
    }
}

/// Result of a [`DialectParser`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// The parsed document.
    pub document: Document,
    /// Lines that were not applied; always empty in permissive mode.
    pub skipped: Vec<SkippedLine>,
}

impl ParseOutcome {
    /// Returns `true` when every meaningful line was applied.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Configurable entry point for the dialect reader.
///
/// # Examples
///
/// ```
/// use sage_config_dialect::DialectParser;
///
/// let text = "sage_yaml:\n  name: Demo\n  owner: Bob\ncatalogs:\n";
///
/// let outcome = DialectParser::new().strict(true).parse(text).unwrap();
/// assert_eq!(outcome.document.meta.name, "Demo");
/// assert_eq!(outcome.skipped.len(), 1);
/// assert_eq!(outcome.skipped[0].line, 3);
///
/// // Permissive mode drops the same line silently
/// let outcome = DialectParser::new().parse(text).unwrap();
/// assert!(outcome.is_complete());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectParser {
    strict: bool,
}

impl DialectParser {
    /// Creates a permissive parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables collection of skipped lines.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parses dialect text.
    ///
    /// A leading byte-order mark is ignored and `\r\n` line endings are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooManyLines`] for inputs over [`MAX_LINES`].
    pub fn parse(&self, text: &str) -> Result<ParseOutcome> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() > MAX_LINES {
            return Err(ParseError::TooManyLines { limit: MAX_LINES });
        }
        Ok(scan::Scanner::new(lines, self.strict).run())
    }

    /// Decodes UTF-8 and parses.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidUtf8`] if `bytes` is not UTF-8, plus the
    /// errors of [`parse`](DialectParser::parse).
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParseOutcome> {
        let text = std::str::from_utf8(bytes)?;
        self.parse(text)
    }

    /// Reads and parses a file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read, plus the errors
    /// of [`parse_bytes`](DialectParser::parse_bytes).
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseOutcome> {
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }
}

/// Parses dialect text in permissive mode.
///
/// # Examples
///
/// ```
/// let doc = sage_config_dialect::parse("catalogs:\n  ventas:\n    filename: v.csv\n").unwrap();
/// assert_eq!(doc.catalogs[0].id, "ventas");
/// assert_eq!(doc.catalogs[0].filename, "v.csv");
/// ```
pub fn parse(text: &str) -> Result<Document> {
    DialectParser::new().parse(text).map(|outcome| outcome.document)
}

/// Decodes UTF-8 bytes and parses them in permissive mode.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    DialectParser::new()
        .parse_bytes(bytes)
        .map(|outcome| outcome.document)
}

/// Reads and parses a file in permissive mode.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    DialectParser::new()
        .parse_file(path)
        .map(|outcome| outcome.document)
}

/// Replaces `target` with the document parsed from `input`.
///
/// On error `target` is left exactly as it was.
///
/// # Examples
///
/// ```
/// use sage_config_core::Document;
/// use sage_config_dialect::load_into;
///
/// let mut doc = Document::default();
/// load_into(&mut doc, "sage_yaml:\n  name: Nueva\n").unwrap();
/// assert_eq!(doc.meta.name, "Nueva");
///
/// let before = doc.clone();
/// assert!(load_into(&mut doc, [0xff_u8, 0xfe]).is_err());
/// assert_eq!(doc, before);
/// ```
pub fn load_into(target: &mut Document, input: impl AsRef<[u8]>) -> Result<()> {
    *target = parse_bytes(input.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sage_config_core::{FileType, Severity};

    use super::*;

    const FULL: &str = "\
sage_yaml:
  name: \"Ventas Chile\"
  description: Carga diaria
  version: '2.1.0'
  author: Equipo Datos
  comments: revisar semanalmente

catalogs:
  ventas:
    name: Ventas
    description: Registro de ventas
      por sucursal
      y canal
    filename: ventas.csv
    file_format:
      type: CSV
      delimiter: ';'
      header: false
    fields:
    - name: codigo
      type: entero
      required: true
      unique: true
      description: Identificador
      validation_rules:
      - name: positivo
        rule: df['codigo'] > 0
        description: Debe ser positivo
        severity: WARNING
      - name: no_nulo
        rule: df['codigo'].notnull()
    - name: monto
      type: decimal
      defaultValue: 0
    row_validation:
    - name: fila_valida
      rule: df['monto'] >= 0
      severity: error
    catalog_validation:
    - name: no_vacio
      rule: len(df) > 0
      description: Catalogo con datos
      severity: MESSAGE
  clientes:
    filename: clientes.xlsx
    file_format:
      type: EXCEL
      header: true

packages:
  mensual:
    name: Paquete mensual
    description: Todo junto
    file_format:
      type: ZIP
    catalogs:
    - ventas
    - 'clientes'
    package_validation:
    - name: ventas_con_clientes
      rule: True
      description: Referencias cruzadas
      severity: warning
";

    #[test]
    fn test_parse_full_document() {
        let doc = parse(FULL).unwrap();

        assert_eq!(doc.meta.name, "Ventas Chile");
        assert_eq!(doc.meta.version, "2.1.0");
        assert_eq!(doc.meta.comments, "revisar semanalmente");

        assert_eq!(doc.catalogs.len(), 2);
        let ventas = &doc.catalogs[0];
        assert_eq!(ventas.id, "ventas");
        assert_eq!(ventas.name, "Ventas");
        assert_eq!(ventas.description, "Registro de ventas por sucursal y canal");
        assert_eq!(ventas.file_format.file_type, FileType::Csv);
        assert_eq!(ventas.file_format.delimiter, ";");
        assert!(!ventas.file_format.header);

        assert_eq!(ventas.fields.len(), 2);
        let codigo = &ventas.fields[0];
        assert_eq!(codigo.field_type, "entero");
        assert!(codigo.required && codigo.unique);
        assert_eq!(codigo.description, "Identificador");
        assert_eq!(codigo.validation_rules.len(), 2);
        assert_eq!(codigo.validation_rules[0].rule, "df['codigo'] > 0");
        assert_eq!(codigo.validation_rules[0].severity, Severity::Warning);
        assert_eq!(codigo.validation_rules[1].severity, Severity::Error);
        assert!(codigo.validation_rules[1].description.is_empty());

        let monto = &ventas.fields[1];
        assert_eq!(monto.field_type, "decimal");
        assert_eq!(monto.default_value, "0");
        assert!(monto.validation_rules.is_empty());

        assert_eq!(ventas.row_validation.len(), 1);
        assert_eq!(ventas.row_validation[0].name, "fila_valida");
        assert_eq!(ventas.catalog_validation.len(), 1);
        assert_eq!(ventas.catalog_validation[0].severity, Severity::Message);

        let clientes = &doc.catalogs[1];
        assert_eq!(clientes.name, "clientes");
        assert_eq!(clientes.file_format.file_type, FileType::Excel);

        assert_eq!(doc.packages.len(), 1);
        let mensual = &doc.packages[0];
        assert_eq!(mensual.name, "Paquete mensual");
        assert_eq!(mensual.catalogs, ["ventas", "clientes"]);
        assert_eq!(mensual.package_validation.len(), 1);
        assert_eq!(mensual.package_validation[0].rule, "True");
    }

    #[test]
    fn test_full_document_is_complete_in_strict_mode() {
        let outcome = DialectParser::new().strict(true).parse(FULL).unwrap();
        assert!(outcome.is_complete(), "skipped: {:?}", outcome.skipped);
    }

    #[test]
    fn test_description_folds_continuation_lines() {
        let text = "\
catalogs:
  c:
    description:
      primera parte
      'segunda parte'
      tercera parte
    filename: c.csv
";
        let doc = parse(text).unwrap();
        assert_eq!(
            doc.catalogs[0].description,
            "primera parte segunda parte tercera parte"
        );
        assert_eq!(doc.catalogs[0].filename, "c.csv");
    }

    #[test]
    fn test_description_folding_continues_past_comments() {
        let text = "\
catalogs:
  c:
    description: antes
      # nota interna: no es texto
      despues
    filename: c.csv
";
        let outcome = DialectParser::new().strict(true).parse(text).unwrap();
        assert!(outcome.is_complete(), "skipped: {:?}", outcome.skipped);
        assert_eq!(outcome.document.catalogs[0].description, "antes despues");
        assert_eq!(outcome.document.catalogs[0].filename, "c.csv");
    }

    #[test]
    fn test_missing_author_defaults_to_empty() {
        let doc = parse("sage_yaml:\n  name: Demo\n  version: 3\n").unwrap();
        assert_eq!(doc.meta.author, "");
        assert_eq!(doc.meta.version, "3");
    }

    #[test]
    fn test_boolean_requires_literal_true() {
        let text = "\
catalogs:
  c:
    fields:
    - name: a
      required: yes
      unique: True
    - name: b
      required: true
";
        let doc = parse(text).unwrap();
        assert!(!doc.catalogs[0].fields[0].required);
        assert!(!doc.catalogs[0].fields[0].unique);
        assert!(doc.catalogs[0].fields[1].required);
    }

    #[test]
    fn test_field_properties_do_not_touch_file_format() {
        let text = "\
catalogs:
  c:
    file_format:
      type: EXCEL
    fields:
    - name: a
      type: fecha
";
        let doc = parse(text).unwrap();
        assert_eq!(doc.catalogs[0].file_format.file_type, FileType::Excel);
        assert_eq!(doc.catalogs[0].fields[0].field_type, "fecha");
    }

    #[test]
    fn test_validation_scopes_are_exclusive() {
        let text = "\
catalogs:
  c:
    row_validation:
    - name: r
      rule: a
    catalog_validation:
    - name: k
      rule: b
";
        let doc = parse(text).unwrap();
        let catalog = &doc.catalogs[0];
        assert_eq!(catalog.row_validation.len(), 1);
        assert_eq!(catalog.row_validation[0].name, "r");
        assert_eq!(catalog.catalog_validation.len(), 1);
        assert_eq!(catalog.catalog_validation[0].rule, "b");
        assert!(catalog.fields.is_empty());
    }

    #[test]
    fn test_rule_item_without_name_is_ignored() {
        let text = "\
catalogs:
  c:
    row_validation:
    - name: first
      rule: a
    - rule: orphan
      severity: warning
";
        let outcome = DialectParser::new().strict(true).parse(text).unwrap();
        let catalog = &outcome.document.catalogs[0];
        assert_eq!(catalog.row_validation.len(), 1);
        assert_eq!(catalog.row_validation[0].severity, Severity::Error);
        assert_eq!(
            outcome
                .skipped
                .iter()
                .map(|s| s.reason.clone())
                .collect::<Vec<_>>(),
            vec![SkipReason::MissingName, SkipReason::NoOpenTarget]
        );
    }

    #[test]
    fn test_package_catalog_references_are_plain_strings() {
        let text = "\
catalogs:
packages:
  p:
    catalogs:
    - cat_a
    - \"cat_b\"
";
        let doc = parse(text).unwrap();
        assert!(doc.catalogs.is_empty());
        assert_eq!(doc.packages[0].catalogs, ["cat_a", "cat_b"]);
    }

    #[test]
    fn test_bare_dash_is_an_empty_package_reference() {
        let text = "packages:\n  p:\n    catalogs:\n    - cat_a\n    -\n    - ''\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.packages[0].catalogs, ["cat_a", "", ""]);
    }

    #[test]
    fn test_package_defaults() {
        let doc = parse("packages:\n  solo:\n").unwrap();
        let package = &doc.packages[0];
        assert_eq!(package.name, "solo");
        assert_eq!(package.file_format.file_type, FileType::Zip);
        assert!(package.catalogs.is_empty());
    }

    #[test]
    fn test_prose_yields_default_document() {
        let text = "Querido equipo:\nadjunto la carga de hoy.\n\tSaludos";
        let outcome = DialectParser::new().strict(true).parse(text).unwrap();
        assert_eq!(outcome.document, Document::default());
        assert_eq!(outcome.skipped.len(), 3);
        assert_eq!(outcome.skipped[2].reason, SkipReason::TabIndentation);
    }

    #[test]
    fn test_crlf_and_bom_are_accepted() {
        let text = "\u{feff}sage_yaml:\r\n  name: Demo\r\ncatalogs:\r\n  c:\r\n    filename: c.csv\r\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.meta.name, "Demo");
        assert_eq!(doc.catalogs[0].filename, "c.csv");
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let err = parse_bytes(b"sage_yaml:\n  name: \xff\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidUtf8 { valid_up_to: 19 }));
    }

    #[test]
    fn test_properties_before_any_entry_are_skipped() {
        let text = "catalogs:\n    name: huerfano\n  c:\n";
        let outcome = DialectParser::new().strict(true).parse(text).unwrap();
        assert_eq!(outcome.document.catalogs.len(), 1);
        assert_eq!(outcome.document.catalogs[0].name, "c");
        assert_eq!(outcome.skipped[0].reason, SkipReason::NoOpenEntry);
    }

    #[test]
    fn test_comments_are_ignored() {
        let text = "# cabecera\nsage_yaml:\n  # nota\n  name: Demo\n";
        let outcome = DialectParser::new().strict(true).parse(text).unwrap();
        assert_eq!(outcome.document.meta.name, "Demo");
        assert!(outcome.is_complete());
    }
}
