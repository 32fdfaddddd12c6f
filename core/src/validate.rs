//! Post-parse document validation.
//!
//! The dialect parser is tolerant: unknown lines are skipped
//! and nothing is cross-checked. Callers that need a strict contract run
//! [`validate_document`] on the result, which reports every problem it
//! finds instead of stopping at the first one.
//!
//! # Examples
//!
//! ```
//! use sage_config_core::*;
//!
//! let mut doc = Document::default();
//! doc.meta.description = "Daily sales".into();
//! doc.meta.author = "Data team".into();
//! doc.add_catalog(Catalog::new("ventas").with_field(Field::new("monto")));
//! doc.add_package(Package::new("diario").with_catalog("ventas"));
//! assert!(validate_document(&doc, &ValidationPolicy::default()).is_empty());
//!
//! // A reference to an unknown catalog is an error
//! doc.packages[0].catalogs.push("clientes".into());
//! let issues = validate_document(&doc, &ValidationPolicy::default());
//! assert!(issues
//!     .iter()
//!     .any(|i| matches!(&i.kind, IssueKind::UnknownCatalogReference(id) if id == "clientes")));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Catalog, Document, FileType, Package, ValidationRule};

/// Ids must survive a trip through the dialect, which splits keys on
/// whitespace and colons.
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid id pattern"));

/// Section headers are recognized at any indentation, so an entry keyed
/// by one of these words would be read back as a section switch.
const SECTION_WORDS: [&str; 3] = ["sage_yaml", "catalogs", "packages"];

/// How serious a [`ValidationIssue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// The document should not be used as-is.
    Error,
    /// Suspicious but usable.
    Warning,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Error => f.write_str("error"),
            IssueLevel::Warning => f.write_str("warning"),
        }
    }
}

/// Specific problem found during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueKind {
    /// A required `sage_yaml` key is empty.
    #[error("missing required metadata: {0}")]
    MissingMeta(String),
    /// A catalog or package id is empty.
    #[error("id cannot be empty")]
    EmptyId,
    /// An id contains characters the dialect cannot represent.
    #[error("invalid id: {0:?}")]
    InvalidId(String),
    /// Two catalogs share an id.
    #[error("duplicate catalog id: {0}")]
    DuplicateCatalog(String),
    /// Two packages share an id.
    #[error("duplicate package id: {0}")]
    DuplicatePackage(String),
    /// Catalog file type not in the policy's allowed list.
    #[error("unsupported catalog file type: {0}")]
    UnsupportedCatalogType(String),
    /// Package file type not in the policy's allowed list.
    #[error("unsupported package file type: {0}")]
    UnsupportedPackageType(String),
    /// CSV catalog without a delimiter.
    #[error("CSV catalogs need a delimiter")]
    MissingDelimiter,
    /// Delimiter longer than one character.
    #[error("delimiter must be a single character, got {0:?}")]
    InvalidDelimiter(String),
    /// Package bundles several catalogs but is not a ZIP.
    #[error("packages with {count} catalogs must be ZIP, got {file_type}")]
    MultiCatalogNotZip {
        /// Number of referenced catalogs.
        count: usize,
        /// Declared package format.
        file_type: String,
    },
    /// Package references no catalogs.
    #[error("package references no catalogs")]
    EmptyPackage,
    /// Package references an id with no matching catalog.
    #[error("unknown catalog reference: {0}")]
    UnknownCatalogReference(String),
    /// Field with an empty name.
    #[error("field name cannot be empty")]
    EmptyFieldName,
    /// Two fields in one catalog share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    /// Rule with an empty name.
    #[error("rule name cannot be empty")]
    EmptyRuleName,
    /// Rule without an expression.
    #[error("rule {0} has no expression")]
    EmptyRuleExpression(String),
    /// Severity outside error / warning / message.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
}

/// One finding, located by a dotted path into the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{level}: {path}: {kind}")]
pub struct ValidationIssue {
    /// Seriousness.
    pub level: IssueLevel,
    /// Location, e.g. `catalogs.ventas.fields.monto`.
    pub path: String,
    /// What went wrong.
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn error(path: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            kind,
        }
    }

    fn warning(path: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            kind,
        }
    }
}

/// Tunable acceptance rules for [`validate_document`].
///
/// Deserializable from YAML so it can live in a tool configuration file.
///
/// # Examples
///
/// ```
/// use sage_config_core::{FileType, ValidationPolicy};
///
/// let policy: ValidationPolicy = serde_yaml::from_str(
///     "required_meta: [name]\nallowed_catalog_types: [CSV, PARQUET]\n",
/// )
/// .unwrap();
/// assert_eq!(policy.required_meta, ["name"]);
/// assert!(policy.allowed_catalog_types.contains(&FileType::Other("PARQUET".into())));
/// assert!(policy.require_zip_for_multi_catalog);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// `sage_yaml` keys that must be non-empty.
    pub required_meta: Vec<String>,
    /// File types accepted for catalogs.
    pub allowed_catalog_types: Vec<FileType>,
    /// File types accepted for packages.
    pub allowed_package_types: Vec<FileType>,
    /// Reject non-ZIP packages that bundle more than one catalog.
    pub require_zip_for_multi_catalog: bool,
    /// Reject packages with an empty catalog list.
    pub require_package_catalogs: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            required_meta: ["name", "description", "version", "author"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_catalog_types: vec![FileType::Csv, FileType::Excel],
            allowed_package_types: vec![FileType::Zip, FileType::Csv, FileType::Excel],
            require_zip_for_multi_catalog: true,
            require_package_catalogs: true,
        }
    }
}

/// Returns `true` if any issue is error-level.
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|issue| issue.level == IssueLevel::Error)
}

/// Validates a whole document against `policy`.
///
/// Issues are returned in document order: metadata first, then catalogs,
/// then packages.
pub fn validate_document(doc: &Document, policy: &ValidationPolicy) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for key in &policy.required_meta {
        let empty = doc
            .meta
            .get(key)
            .is_none_or(|value| value.trim().is_empty());
        if empty {
            issues.push(ValidationIssue::error(
                format!("sage_yaml.{key}"),
                IssueKind::MissingMeta(key.clone()),
            ));
        }
    }

    let mut seen_catalogs: HashSet<&str> = HashSet::new();
    for catalog in &doc.catalogs {
        let path = format!("catalogs.{}", catalog.id);
        if let Some(kind) = check_id(&catalog.id) {
            issues.push(ValidationIssue::error(&path, kind));
        } else if !seen_catalogs.insert(catalog.id.as_str()) {
            issues.push(ValidationIssue::error(
                &path,
                IssueKind::DuplicateCatalog(catalog.id.clone()),
            ));
        }
        validate_catalog(catalog, &path, policy, &mut issues);
    }

    let mut seen_packages: HashSet<&str> = HashSet::new();
    for package in &doc.packages {
        let path = format!("packages.{}", package.id);
        if let Some(kind) = check_id(&package.id) {
            issues.push(ValidationIssue::error(&path, kind));
        } else if !seen_packages.insert(package.id.as_str()) {
            issues.push(ValidationIssue::error(
                &path,
                IssueKind::DuplicatePackage(package.id.clone()),
            ));
        }
        validate_package(package, &path, &seen_catalogs, policy, &mut issues);
    }

    issues
}

fn check_id(id: &str) -> Option<IssueKind> {
    if id.trim().is_empty() {
        return Some(IssueKind::EmptyId);
    }
    if !ID_PATTERN.is_match(id) || SECTION_WORDS.contains(&id) {
        return Some(IssueKind::InvalidId(id.to_string()));
    }
    None
}

fn validate_catalog(
    catalog: &Catalog,
    path: &str,
    policy: &ValidationPolicy,
    issues: &mut Vec<ValidationIssue>,
) {
    let format = &catalog.file_format;
    if !policy.allowed_catalog_types.contains(&format.file_type) {
        issues.push(ValidationIssue::error(
            format!("{path}.file_format.type"),
            IssueKind::UnsupportedCatalogType(format.file_type.to_string()),
        ));
    }
    if format.file_type.is_csv() {
        match format.delimiter.chars().count() {
            0 => issues.push(ValidationIssue::error(
                format!("{path}.file_format.delimiter"),
                IssueKind::MissingDelimiter,
            )),
            1 => {}
            _ => issues.push(ValidationIssue::error(
                format!("{path}.file_format.delimiter"),
                IssueKind::InvalidDelimiter(format.delimiter.clone()),
            )),
        }
    }

    let mut seen_fields: HashSet<&str> = HashSet::new();
    for field in &catalog.fields {
        let field_path = format!("{path}.fields.{}", field.name);
        if field.name.trim().is_empty() {
            issues.push(ValidationIssue::error(&field_path, IssueKind::EmptyFieldName));
        } else if !seen_fields.insert(field.name.as_str()) {
            issues.push(ValidationIssue::error(
                &field_path,
                IssueKind::DuplicateField(field.name.clone()),
            ));
        }
        validate_rules(&field.validation_rules, &field_path, issues);
    }

    validate_rules(&catalog.row_validation, &format!("{path}.row_validation"), issues);
    validate_rules(
        &catalog.catalog_validation,
        &format!("{path}.catalog_validation"),
        issues,
    );
}

fn validate_package(
    package: &Package,
    path: &str,
    known_catalogs: &HashSet<&str>,
    policy: &ValidationPolicy,
    issues: &mut Vec<ValidationIssue>,
) {
    let file_type = &package.file_format.file_type;
    if !policy.allowed_package_types.contains(file_type) {
        issues.push(ValidationIssue::error(
            format!("{path}.file_format.type"),
            IssueKind::UnsupportedPackageType(file_type.to_string()),
        ));
    }

    if package.catalogs.is_empty() {
        if policy.require_package_catalogs {
            issues.push(ValidationIssue::error(
                format!("{path}.catalogs"),
                IssueKind::EmptyPackage,
            ));
        }
    } else if package.catalogs.len() > 1
        && policy.require_zip_for_multi_catalog
        && *file_type != FileType::Zip
    {
        issues.push(ValidationIssue::error(
            format!("{path}.file_format.type"),
            IssueKind::MultiCatalogNotZip {
                count: package.catalogs.len(),
                file_type: file_type.to_string(),
            },
        ));
    }

    for reference in &package.catalogs {
        if !known_catalogs.contains(reference.as_str()) {
            issues.push(ValidationIssue::error(
                format!("{path}.catalogs"),
                IssueKind::UnknownCatalogReference(reference.clone()),
            ));
        }
    }

    validate_rules(
        &package.package_validation,
        &format!("{path}.package_validation"),
        issues,
    );
}

fn validate_rules(rules: &[ValidationRule], path: &str, issues: &mut Vec<ValidationIssue>) {
    for rule in rules {
        let rule_path = format!("{path}.{}", rule.name);
        if rule.name.trim().is_empty() {
            issues.push(ValidationIssue::error(&rule_path, IssueKind::EmptyRuleName));
        }
        if rule.rule.trim().is_empty() {
            issues.push(ValidationIssue::error(
                &rule_path,
                IssueKind::EmptyRuleExpression(rule.name.clone()),
            ));
        }
        if !rule.severity.is_known() {
            issues.push(ValidationIssue::warning(
                &rule_path,
                IssueKind::UnknownSeverity(rule.severity.to_string()),
            ));
        }
    }
}
