//! Single forward pass over the input lines.
//!
//! The scanner keeps one [`Section`], one [`Scope`] and the indices of the
//! open catalog or package. The "current" field and rule are always the
//! last element of their owning vector, so no references into the document
//! are held across lines.

use sage_config_core::{
    Catalog, Document, Field, FileFormat, FileType, Package, Severity, ValidationRule,
};
use tracing::{debug, trace};

use super::line::{
    fold_continuation, indentation, key_value, list_item, named_item, strip_quotes,
};
use super::scope::{Scope, Section};
use super::{ParseOutcome, SkipReason, SkippedLine};

/// Indent of entry keys (`  ventas:`).
const ENTRY_INDENT: usize = 2;
/// Indent of entry properties and entry-level list items.
const PROPERTY_INDENT: usize = 4;
/// Indent of nested properties (format, field, entry-level rule bodies).
const NESTED_INDENT: usize = 6;
/// Indent of field-level rule bodies.
const FIELD_RULE_INDENT: usize = 8;

type Step = Result<usize, SkipReason>;

pub(super) struct Scanner<'a> {
    lines: Vec<&'a str>,
    strict: bool,
    doc: Document,
    section: Section,
    scope: Scope,
    catalog: Option<usize>,
    package: Option<usize>,
    rule_open: bool,
    skipped: Vec<SkippedLine>,
}

impl<'a> Scanner<'a> {
    pub(super) fn new(lines: Vec<&'a str>, strict: bool) -> Self {
        Self {
            lines,
            strict,
            doc: Document::default(),
            section: Section::None,
            scope: Scope::None,
            catalog: None,
            package: None,
            rule_open: false,
            skipped: Vec::new(),
        }
    }

    pub(super) fn run(mut self) -> ParseOutcome {
        let mut index = 0;
        while index < self.lines.len() {
            index = match self.step(index) {
                Ok(next) => next,
                Err(reason) => {
                    self.skip(index, reason);
                    index + 1
                }
            };
        }

        debug!(
            catalogs = self.doc.catalogs.len(),
            packages = self.doc.packages.len(),
            lines = self.lines.len(),
            skipped = self.skipped.len(),
            "Scanned SAGE document"
        );

        ParseOutcome {
            document: self.doc,
            skipped: self.skipped,
        }
    }

    fn skip(&mut self, index: usize, reason: SkipReason) {
        let text = self.lines[index];
        trace!(line = index + 1, %reason, text, "Skipping line");
        if self.strict {
            self.skipped.push(SkippedLine {
                line: index + 1,
                text: text.to_string(),
                reason,
            });
        }
    }

    fn step(&mut self, index: usize) -> Step {
        let line = self.lines[index];
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(index + 1);
        }
        let Some(indent) = indentation(line) else {
            return Err(SkipReason::TabIndentation);
        };

        if let Some(section) = Section::from_header(trimmed) {
            if !self.is_package_catalogs_key(section, indent) {
                self.enter(section);
                return Ok(index + 1);
            }
        }

        match self.section {
            Section::None => Err(SkipReason::OutsideSection),
            Section::Meta => self.meta_line(indent, trimmed).map(|()| index + 1),
            Section::Catalogs => self.catalog_line(index, indent, trimmed),
            Section::Packages => self.package_line(index, indent, trimmed),
        }
    }

    /// `catalogs:` under an open package lists its references instead of
    /// starting the catalogs section.
    fn is_package_catalogs_key(&self, section: Section, indent: usize) -> bool {
        section == Section::Catalogs
            && self.section == Section::Packages
            && self.package.is_some()
            && indent == PROPERTY_INDENT
    }

    fn enter(&mut self, section: Section) {
        self.section = section;
        self.catalog = None;
        self.package = None;
        self.scope = Scope::None;
        self.rule_open = false;
    }

    fn meta_line(&mut self, indent: usize, trimmed: &str) -> Result<(), SkipReason> {
        if indent == 0 {
            return Err(SkipReason::Unrecognized);
        }
        let Some((key, value)) = key_value(trimmed) else {
            return Err(SkipReason::Unrecognized);
        };
        if key.is_empty() {
            return Err(SkipReason::Unrecognized);
        }
        if !self.doc.meta.set(key, value) {
            return Err(SkipReason::UnknownKey(key.to_string()));
        }
        Ok(())
    }

    fn catalog_line(&mut self, index: usize, indent: usize, trimmed: &str) -> Step {
        if let Some(id) = entry_key(indent, trimmed) {
            debug!(catalog = id, line = index + 1, "Declared catalog");
            self.doc.add_catalog(Catalog::new(id));
            self.catalog = Some(self.doc.catalogs.len() - 1);
            self.scope = Scope::None;
            self.rule_open = false;
            return Ok(index + 1);
        }

        let Some(position) = self.catalog else {
            return Err(SkipReason::NoOpenEntry);
        };

        match indent {
            PROPERTY_INDENT => self.catalog_property(position, index, trimmed),
            NESTED_INDENT => self.catalog_nested(position, trimmed).map(|()| index + 1),
            FIELD_RULE_INDENT => self.field_rule_property(position, trimmed).map(|()| index + 1),
            _ => Err(SkipReason::Unrecognized),
        }
    }

    fn catalog_property(&mut self, position: usize, index: usize, trimmed: &str) -> Step {
        let catalog = &mut self.doc.catalogs[position];

        if let Some(item) = list_item(trimmed) {
            let name = named_item(item);
            match self.scope {
                Scope::RowValidation | Scope::CatalogValidation => {
                    let Some(name) = name else {
                        self.rule_open = false;
                        return Err(SkipReason::MissingName);
                    };
                    let rules = if self.scope == Scope::RowValidation {
                        &mut catalog.row_validation
                    } else {
                        &mut catalog.catalog_validation
                    };
                    rules.push(ValidationRule::named(name));
                    self.rule_open = true;
                }
                _ => {
                    let Some(name) = name else {
                        return Err(SkipReason::MissingName);
                    };
                    catalog.add_field(Field::new(name));
                    self.scope = Scope::Field;
                    self.rule_open = false;
                }
            }
            return Ok(index + 1);
        }

        let Some((key, value)) = key_value(trimmed) else {
            return Err(SkipReason::Unrecognized);
        };
        self.rule_open = false;
        self.scope = Scope::None;

        match key {
            "name" => catalog.name = value.to_string(),
            "description" => {
                let (text, next) = fold_continuation(&self.lines, index, PROPERTY_INDENT, value);
                catalog.description = text;
                return Ok(next);
            }
            "filename" => catalog.filename = value.to_string(),
            "file_format" => self.scope = Scope::FileFormat,
            "fields" => {}
            "row_validation" => self.scope = Scope::RowValidation,
            "catalog_validation" => self.scope = Scope::CatalogValidation,
            other => return Err(SkipReason::UnknownKey(other.to_string())),
        }
        Ok(index + 1)
    }

    fn catalog_nested(&mut self, position: usize, trimmed: &str) -> Result<(), SkipReason> {
        let catalog = &mut self.doc.catalogs[position];

        if let Some(item) = list_item(trimmed) {
            if self.scope != Scope::FieldRules {
                return Err(SkipReason::Unrecognized);
            }
            let field = catalog.fields.last_mut().ok_or(SkipReason::NoOpenTarget)?;
            let Some(name) = named_item(item) else {
                self.rule_open = false;
                return Err(SkipReason::MissingName);
            };
            field.validation_rules.push(ValidationRule::named(name));
            self.rule_open = true;
            return Ok(());
        }

        let (key, value) = key_value(trimmed).ok_or(SkipReason::Unrecognized)?;
        match self.scope {
            Scope::FileFormat => apply_format_property(&mut catalog.file_format, key, value),
            Scope::Field | Scope::FieldRules => {
                let field = catalog.fields.last_mut().ok_or(SkipReason::NoOpenTarget)?;
                self.rule_open = false;
                if key == "validation_rules" {
                    self.scope = Scope::FieldRules;
                    return Ok(());
                }
                self.scope = Scope::Field;
                apply_field_property(field, key, value)
            }
            Scope::RowValidation | Scope::CatalogValidation => {
                let rules = if self.scope == Scope::RowValidation {
                    &mut catalog.row_validation
                } else {
                    &mut catalog.catalog_validation
                };
                match rules.last_mut() {
                    Some(rule) if self.rule_open => apply_rule_property(rule, key, value),
                    _ => Err(SkipReason::NoOpenTarget),
                }
            }
            _ => Err(SkipReason::Unrecognized),
        }
    }

    fn field_rule_property(&mut self, position: usize, trimmed: &str) -> Result<(), SkipReason> {
        if self.scope != Scope::FieldRules || !self.rule_open {
            return Err(SkipReason::NoOpenTarget);
        }
        let (key, value) = key_value(trimmed).ok_or(SkipReason::Unrecognized)?;
        let rule = self.doc.catalogs[position]
            .fields
            .last_mut()
            .and_then(|field| field.validation_rules.last_mut())
            .ok_or(SkipReason::NoOpenTarget)?;
        apply_rule_property(rule, key, value)
    }

    fn package_line(&mut self, index: usize, indent: usize, trimmed: &str) -> Step {
        if let Some(id) = entry_key(indent, trimmed) {
            debug!(package = id, line = index + 1, "Declared package");
            self.doc.add_package(Package::new(id));
            self.package = Some(self.doc.packages.len() - 1);
            self.scope = Scope::None;
            self.rule_open = false;
            return Ok(index + 1);
        }

        let Some(position) = self.package else {
            return Err(SkipReason::NoOpenEntry);
        };

        match indent {
            PROPERTY_INDENT => self.package_property(position, index, trimmed),
            NESTED_INDENT => self.package_nested(position, trimmed).map(|()| index + 1),
            _ => Err(SkipReason::Unrecognized),
        }
    }

    fn package_property(&mut self, position: usize, index: usize, trimmed: &str) -> Step {
        let package = &mut self.doc.packages[position];

        if let Some(item) = list_item(trimmed) {
            if self.scope == Scope::PackageValidation {
                let Some(name) = named_item(item) else {
                    self.rule_open = false;
                    return Err(SkipReason::MissingName);
                };
                package.package_validation.push(ValidationRule::named(name));
                self.rule_open = true;
            } else {
                package.catalogs.push(strip_quotes(item).to_string());
            }
            return Ok(index + 1);
        }

        let Some((key, value)) = key_value(trimmed) else {
            return Err(SkipReason::Unrecognized);
        };
        self.rule_open = false;
        self.scope = Scope::None;

        match key {
            "name" => package.name = value.to_string(),
            "description" => {
                let (text, next) = fold_continuation(&self.lines, index, PROPERTY_INDENT, value);
                package.description = text;
                return Ok(next);
            }
            "file_format" => self.scope = Scope::FileFormat,
            "catalogs" => self.scope = Scope::PackageCatalogs,
            "package_validation" => self.scope = Scope::PackageValidation,
            other => return Err(SkipReason::UnknownKey(other.to_string())),
        }
        Ok(index + 1)
    }

    fn package_nested(&mut self, position: usize, trimmed: &str) -> Result<(), SkipReason> {
        if list_item(trimmed).is_some() {
            return Err(SkipReason::Unrecognized);
        }
        let (key, value) = key_value(trimmed).ok_or(SkipReason::Unrecognized)?;
        let package = &mut self.doc.packages[position];

        match self.scope {
            Scope::FileFormat if key == "type" => {
                package.file_format.file_type = FileType::from(value);
                Ok(())
            }
            Scope::FileFormat => Err(SkipReason::UnknownKey(key.to_string())),
            Scope::PackageValidation => match package.package_validation.last_mut() {
                Some(rule) if self.rule_open => apply_rule_property(rule, key, value),
                _ => Err(SkipReason::NoOpenTarget),
            },
            _ => Err(SkipReason::Unrecognized),
        }
    }
}

/// Recognizes `  id:` entry declarations: indent 2, trailing colon, no
/// spaces.
fn entry_key(indent: usize, trimmed: &str) -> Option<&str> {
    if indent != ENTRY_INDENT || trimmed.contains(' ') {
        return None;
    }
    trimmed.strip_suffix(':')
}

fn apply_format_property(
    format: &mut FileFormat,
    key: &str,
    value: &str,
) -> Result<(), SkipReason> {
    match key {
        "type" => format.file_type = FileType::from(value),
        "delimiter" => format.delimiter = value.to_string(),
        "header" => format.header = value == "true",
        other => return Err(SkipReason::UnknownKey(other.to_string())),
    }
    Ok(())
}

fn apply_field_property(field: &mut Field, key: &str, value: &str) -> Result<(), SkipReason> {
    match key {
        "type" => field.field_type = value.to_string(),
        "required" => field.required = value == "true",
        "unique" => field.unique = value == "true",
        "description" => field.description = value.to_string(),
        "defaultValue" | "default_value" => field.default_value = value.to_string(),
        other => return Err(SkipReason::UnknownKey(other.to_string())),
    }
    Ok(())
}

fn apply_rule_property(
    rule: &mut ValidationRule,
    key: &str,
    value: &str,
) -> Result<(), SkipReason> {
    match key {
        "description" => rule.description = value.to_string(),
        "rule" => rule.rule = value.to_string(),
        "severity" => rule.severity = Severity::parse(value),
        other => return Err(SkipReason::UnknownKey(other.to_string())),
    }
    Ok(())
}
