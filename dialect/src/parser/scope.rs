//! Scan state for the line-oriented parser.

/// Top-level block the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Section {
    /// Before any recognized header.
    None,
    /// `sage_yaml:` metadata.
    Meta,
    /// `catalogs:` definitions.
    Catalogs,
    /// `packages:` definitions.
    Packages,
}

impl Section {
    /// Maps a trimmed header line to its section.
    pub(super) fn from_header(trimmed: &str) -> Option<Self> {
        match trimmed {
            "sage_yaml:" => Some(Section::Meta),
            "catalogs:" => Some(Section::Catalogs),
            "packages:" => Some(Section::Packages),
            _ => None,
        }
    }
}

/// Which nested block inside the open catalog or package receives the next
/// lines.
///
/// Exactly one scope is active at a time; it is set by the most recent
/// scope-introducing key and decides where list items are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// Directly under the entry; dash items at indent 4 start fields.
    None,
    /// Under `file_format:`; indent-6 keys are format properties.
    FileFormat,
    /// Inside a field item; indent-6 keys are field properties.
    Field,
    /// Under a field's `validation_rules:`.
    FieldRules,
    /// Under a catalog's `row_validation:`.
    RowValidation,
    /// Under a catalog's `catalog_validation:`.
    CatalogValidation,
    /// Under a package's `catalogs:`.
    PackageCatalogs,
    /// Under a package's `package_validation:`.
    PackageValidation,
}
