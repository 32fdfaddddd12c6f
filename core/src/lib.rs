//! Document model and validation for SAGE ingestion configurations.
//!
//! This crate defines the in-memory shape of a SAGE configuration:
//!
//! - [`Document`]: the root, holding a [`Meta`] block, catalogs and packages.
//! - [`Catalog`]: one data-file definition with [`Field`]s, a
//!   [`FileFormat`] and row/catalog-level [`ValidationRule`]s.
//! - [`Package`]: a bundle of catalog ids delivered together.
//!
//! Editing helpers ([`Document::add_catalog`], [`Catalog::remove_field`],
//! [`Document::rename_catalog`], ...) cover the in-place mutations an
//! editing surface performs between parsing and generating.
//!
//! Validation ([`validate_document`]) applies the strict checks that the
//! tolerant dialect parser leaves to its callers: required metadata,
//! unique ids, supported file types, dangling package references.
//!
//! Reading and writing the text dialect lives in `sage-config-dialect`.
//!
//! # Example
//!
//! ```
//! use sage_config_core::*;
//!
//! let mut doc = Document::default();
//! doc.meta.description = "Ventas diarias".into();
//! doc.meta.author = "Equipo de datos".into();
//!
//! doc.add_catalog(
//!     Catalog::new("ventas")
//!         .with_field(Field::new("monto").with_type("decimal").required()),
//! );
//! doc.add_package(Package::new("diario").with_catalog("ventas"));
//!
//! assert_eq!(doc.find_catalog("ventas").unwrap().fields.len(), 1);
//! assert!(validate_document(&doc, &ValidationPolicy::default()).is_empty());
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{
    IssueKind, IssueLevel, ValidationIssue, ValidationPolicy, has_errors, validate_document,
};
