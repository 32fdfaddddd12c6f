//! Configuration document model.
//!
//! A SAGE configuration is a [`Document`] holding a metadata block, an
//! ordered list of [`Catalog`] definitions and an ordered list of
//! [`Package`] bundles. Order is significant everywhere: the dialect
//! generator emits items in vector order and the parser rebuilds them in
//! declaration order.
//!
//! Absent optional scalars are represented by empty strings or defaults,
//! never by `Option::None`, so a parsed document always carries every key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default `sage_yaml.name` for a fresh document.
pub const DEFAULT_DOCUMENT_NAME: &str = "Configuración SAGE";

/// Default `sage_yaml.version` for a fresh document.
pub const DEFAULT_DOCUMENT_VERSION: &str = "1.0.0";

/// Default type tag assigned to a field that declares none.
pub const DEFAULT_FIELD_TYPE: &str = "texto";

/// Default column delimiter for CSV catalogs.
pub const DEFAULT_DELIMITER: &str = ",";

/// File format tag for catalogs and packages.
///
/// The three formats the ingestion pipeline understands get their own
/// variants; any other tag is carried verbatim in [`FileType::Other`] so
/// that a round trip never rewrites user input.
///
/// # Examples
///
/// ```
/// use sage_config_core::FileType;
///
/// assert_eq!(FileType::from("CSV"), FileType::Csv);
/// assert_eq!(FileType::from("csv"), FileType::Other("csv".into()));
/// assert_eq!(FileType::Zip.as_str(), "ZIP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    /// Delimited text (`CSV`), the default for catalogs.
    #[default]
    Csv,
    /// Spreadsheet workbook (`EXCEL`).
    Excel,
    /// Compressed bundle (`ZIP`), the default for packages.
    Zip,
    /// Any other tag, kept exactly as written.
    Other(String),
}

impl FileType {
    /// Returns the dialect spelling of this tag.
    pub fn as_str(&self) -> &str {
        match self {
            FileType::Csv => "CSV",
            FileType::Excel => "EXCEL",
            FileType::Zip => "ZIP",
            FileType::Other(tag) => tag,
        }
    }

    /// Returns `true` for [`FileType::Csv`].
    pub fn is_csv(&self) -> bool {
        matches!(self, FileType::Csv)
    }
}

impl From<&str> for FileType {
    fn from(tag: &str) -> Self {
        match tag {
            "CSV" => FileType::Csv,
            "EXCEL" => FileType::Excel,
            "ZIP" => FileType::Zip,
            other => FileType::Other(other.to_string()),
        }
    }
}

impl From<String> for FileType {
    fn from(tag: String) -> Self {
        FileType::from(tag.as_str())
    }
}

impl From<FileType> for String {
    fn from(file_type: FileType) -> Self {
        file_type.as_str().to_string()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a [`ValidationRule`].
///
/// Parsing is case-insensitive and the stored spelling is lower-case; the
/// dialect writes severities upper-case via [`Severity::as_upper`].
///
/// # Examples
///
/// ```
/// use sage_config_core::Severity;
///
/// let severity = Severity::parse("Warning");
/// assert_eq!(severity, Severity::Warning);
/// assert_eq!(severity.as_str(), "warning");
/// assert_eq!(severity.as_upper(), "WARNING");
///
/// let custom = Severity::parse("CRITICAL");
/// assert_eq!(custom, Severity::Other("critical".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Blocks the file (the default).
    #[default]
    Error,
    /// Reported but does not block.
    Warning,
    /// Informational.
    Message,
    /// Any other severity, lower-cased.
    Other(String),
}

impl Severity {
    /// Parses a severity, ignoring case.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "message" => Severity::Message,
            _ => Severity::Other(lowered),
        }
    }

    /// Returns the lower-case spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Message => "message",
            Severity::Other(raw) => raw,
        }
    }

    /// Returns the upper-case spelling used by the dialect generator.
    pub fn as_upper(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Returns `true` for severities the ingestion pipeline recognizes.
    pub fn is_known(&self) -> bool {
        !matches!(self, Severity::Other(_))
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Severity::parse(&raw)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-level metadata (the `sage_yaml` block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Configuration name, also used for the download file name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Configuration version string.
    pub version: String,
    /// Author or owning team.
    pub author: String,
    /// Optional comments; only written when non-empty.
    pub comments: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOCUMENT_NAME.to_string(),
            description: String::new(),
            version: DEFAULT_DOCUMENT_VERSION.to_string(),
            author: String::new(),
            comments: String::new(),
        }
    }
}

impl Meta {
    /// Sets a metadata key by its dialect name.
    ///
    /// Returns `false` when `key` is not one of the five metadata keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use sage_config_core::Meta;
    ///
    /// let mut meta = Meta::default();
    /// assert!(meta.set("author", "Alice"));
    /// assert!(!meta.set("owner", "Bob"));
    /// assert_eq!(meta.author, "Alice");
    /// ```
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "version" => &mut self.version,
            "author" => &mut self.author,
            "comments" => &mut self.comments,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    /// Looks up a metadata value by its dialect name.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            "version" => Some(&self.version),
            "author" => Some(&self.author),
            "comments" => Some(&self.comments),
            _ => None,
        }
    }
}

/// A named, severity-tagged check.
///
/// The `rule` expression belongs to an external rule language and is stored
/// without interpretation.
///
/// # Examples
///
/// ```
/// use sage_config_core::{Severity, ValidationRule};
///
/// let rule = ValidationRule::new("positive_amount", "df['monto'] > 0")
///     .with_description("Amounts must be positive")
///     .with_severity(Severity::Warning);
/// assert_eq!(rule.severity.as_upper(), "WARNING");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValidationRule {
    /// Rule name.
    pub name: String,
    /// Human-readable explanation.
    pub description: String,
    /// Opaque rule expression.
    pub rule: String,
    /// Severity, `error` unless declared.
    pub severity: Severity,
}

impl ValidationRule {
    /// Creates a rule with `error` severity and an empty description.
    pub fn new(name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rule: rule.into(),
            ..Self::default()
        }
    }

    /// Creates an empty rule carrying only its name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// One column definition inside a catalog.
///
/// # Examples
///
/// ```
/// use sage_config_core::{Field, ValidationRule};
///
/// let field = Field::new("codigo")
///     .with_type("entero")
///     .required()
///     .unique()
///     .with_rule(ValidationRule::new("not_null", "df['codigo'].notnull()"));
/// assert!(field.required && field.unique);
/// assert_eq!(field.validation_rules.len(), 1);
///
/// let plain = Field::new("nombre");
/// assert_eq!(plain.field_type, "texto");
/// assert!(!plain.required);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Free-form type tag.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the column must be present and non-empty.
    pub required: bool,
    /// Whether values must be unique.
    pub unique: bool,
    /// Human-readable explanation.
    pub description: String,
    /// Value used when the column is empty.
    pub default_value: String,
    /// Field-level rules, in declaration order.
    pub validation_rules: Vec<ValidationRule>,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            name: String::new(),
            field_type: DEFAULT_FIELD_TYPE.to_string(),
            required: false,
            unique: false,
            description: String::new(),
            default_value: String::new(),
            validation_rules: Vec::new(),
        }
    }
}

impl Field {
    /// Creates a field with default type and no constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the type tag.
    pub fn with_type(mut self, field_type: &str) -> Self {
        self.field_type = field_type.to_string();
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = value.to_string();
        self
    }

    /// Appends a field-level rule.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }
}

/// Physical format of a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFormat {
    /// Format tag.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Column delimiter; only written for CSV.
    pub delimiter: String,
    /// Whether the first row is a header row.
    pub header: bool,
}

impl Default for FileFormat {
    fn default() -> Self {
        Self {
            file_type: FileType::Csv,
            delimiter: DEFAULT_DELIMITER.to_string(),
            header: true,
        }
    }
}

/// One data-file definition.
///
/// # Examples
///
/// ```
/// use sage_config_core::{Catalog, Field, FileType};
///
/// let mut catalog = Catalog::new("ventas").with_field(Field::new("monto"));
/// assert_eq!(catalog.name, "ventas");
/// assert_eq!(catalog.file_format.file_type, FileType::Csv);
///
/// catalog.add_field(Field::new("fecha"));
/// assert!(catalog.find_field("fecha").is_some());
/// assert!(catalog.remove_field("monto").is_some());
/// assert_eq!(catalog.fields.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Catalog {
    /// Declaration key, unique within the document.
    pub id: String,
    /// Display name, defaults to the id.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Expected file name.
    pub filename: String,
    /// File format settings.
    pub file_format: FileFormat,
    /// Column definitions, in declaration order.
    pub fields: Vec<Field>,
    /// Row-level rules.
    pub row_validation: Vec<ValidationRule>,
    /// Catalog-level rules.
    pub catalog_validation: Vec<ValidationRule>,
}

impl Catalog {
    /// Creates a catalog whose name mirrors its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Self::default()
        }
    }

    /// Builder form of [`add_field`](Catalog::add_field).
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Finds a field by name.
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Finds a field by name for in-place edits.
    pub fn find_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    /// Removes the first field with `name`, keeping the order of the rest.
    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        let index = self.fields.iter().position(|field| field.name == name)?;
        Some(self.fields.remove(index))
    }

    /// Number of rules across all scopes of this catalog.
    pub fn rule_count(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.validation_rules.len())
            .sum::<usize>()
            + self.row_validation.len()
            + self.catalog_validation.len()
    }
}

/// Physical format of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageFormat {
    /// Format tag, `ZIP` unless declared.
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl Default for PackageFormat {
    fn default() -> Self {
        Self {
            file_type: FileType::Zip,
        }
    }
}

/// A named bundle of catalogs delivered together.
///
/// Catalog references are plain ids; whether they resolve is checked by
/// [`validate_document`](crate::validate_document), not here.
///
/// # Examples
///
/// ```
/// use sage_config_core::{FileType, Package};
///
/// let package = Package::new("mensual")
///     .with_catalog("ventas")
///     .with_catalog("clientes");
/// assert_eq!(package.catalogs, ["ventas", "clientes"]);
/// assert_eq!(package.file_format.file_type, FileType::Zip);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Package {
    /// Declaration key, unique within the document.
    pub id: String,
    /// Display name, defaults to the id.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Package format settings.
    pub file_format: PackageFormat,
    /// Referenced catalog ids, in declaration order.
    pub catalogs: Vec<String>,
    /// Package-level rules.
    pub package_validation: Vec<ValidationRule>,
}

impl Package {
    /// Creates a package whose name mirrors its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Self::default()
        }
    }

    /// Appends a catalog reference.
    pub fn with_catalog(mut self, catalog_id: &str) -> Self {
        self.catalogs.push(catalog_id.to_string());
        self
    }

    /// Appends a package-level rule.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.package_validation.push(rule);
        self
    }

    /// Returns `true` if this package references `catalog_id`.
    pub fn references(&self, catalog_id: &str) -> bool {
        self.catalogs.iter().any(|id| id == catalog_id)
    }
}

/// Root of a configuration.
///
/// # Examples
///
/// ```
/// use sage_config_core::*;
///
/// let mut doc = Document::default();
/// assert_eq!(doc.meta.name, "Configuración SAGE");
/// assert_eq!(doc.meta.version, "1.0.0");
///
/// doc.add_catalog(Catalog::new("ventas").with_field(Field::new("monto")));
/// doc.add_package(Package::new("diario").with_catalog("ventas"));
///
/// assert!(doc.rename_catalog("ventas", "ventas_diarias"));
/// assert_eq!(doc.packages[0].catalogs, ["ventas_diarias"]);
/// assert_eq!(doc.field_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Document {
    /// The `sage_yaml` metadata block.
    pub meta: Meta,
    /// Catalog definitions, in declaration order.
    pub catalogs: Vec<Catalog>,
    /// Package definitions, in declaration order.
    pub packages: Vec<Package>,
}

impl Document {
    /// Creates a document with default metadata and no content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a catalog.
    pub fn add_catalog(&mut self, catalog: Catalog) {
        self.catalogs.push(catalog);
    }

    /// Finds a catalog by id.
    pub fn find_catalog(&self, id: &str) -> Option<&Catalog> {
        self.catalogs.iter().find(|catalog| catalog.id == id)
    }

    /// Finds a catalog by id for in-place edits.
    pub fn find_catalog_mut(&mut self, id: &str) -> Option<&mut Catalog> {
        self.catalogs.iter_mut().find(|catalog| catalog.id == id)
    }

    /// Removes a catalog.
    ///
    /// Package references to the removed id are left untouched.
    pub fn remove_catalog(&mut self, id: &str) -> Option<Catalog> {
        let index = self.catalogs.iter().position(|catalog| catalog.id == id)?;
        Some(self.catalogs.remove(index))
    }

    /// Renames a catalog and rewrites every package reference to it.
    ///
    /// Returns `false` when no catalog has id `old`.
    pub fn rename_catalog(&mut self, old: &str, new: &str) -> bool {
        let Some(catalog) = self.find_catalog_mut(old) else {
            return false;
        };
        catalog.id = new.to_string();

        for package in &mut self.packages {
            for reference in &mut package.catalogs {
                if reference == old {
                    *reference = new.to_string();
                }
            }
        }
        true
    }

    /// Appends a package.
    pub fn add_package(&mut self, package: Package) {
        self.packages.push(package);
    }

    /// Finds a package by id.
    pub fn find_package(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|package| package.id == id)
    }

    /// Finds a package by id for in-place edits.
    pub fn find_package_mut(&mut self, id: &str) -> Option<&mut Package> {
        self.packages.iter_mut().find(|package| package.id == id)
    }

    /// Removes a package.
    pub fn remove_package(&mut self, id: &str) -> Option<Package> {
        let index = self.packages.iter().position(|package| package.id == id)?;
        Some(self.packages.remove(index))
    }

    /// Total number of fields across all catalogs.
    pub fn field_count(&self) -> usize {
        self.catalogs.iter().map(|catalog| catalog.fields.len()).sum()
    }

    /// Total number of rules across every scope.
    pub fn rule_count(&self) -> usize {
        self.catalogs.iter().map(Catalog::rule_count).sum::<usize>()
            + self
                .packages
                .iter()
                .map(|package| package.package_validation.len())
                .sum::<usize>()
    }

    /// Returns `true` when the document has neither catalogs nor packages.
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty() && self.packages.is_empty()
    }
}
