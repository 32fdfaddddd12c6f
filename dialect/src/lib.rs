//! Reader and writer for the SAGE YAML configuration dialect.
//!
//! SAGE configurations are written in a small, fixed subset of YAML with
//! two-space indentation. This crate converts between that text and the
//! [`Document`](sage_config_core::Document) model:
//!
//! - [`parse`] / [`DialectParser`]: text to document. Tolerant: lines that
//!   match no known pattern are skipped, or collected in strict mode.
//! - [`generate`]: document to text, in the canonical layout.
//! - [`download_filename`] and [`CONTENT_TYPE`]: naming for exported files.
//!
//! Both directions are pure functions over their input; there is no shared
//! state and no I/O outside the explicit `*_file` / [`write_document`]
//! helpers.
//!
//! # Example
//!
//! ```
//! use sage_config_dialect::{generate, parse};
//!
//! let text = "\
//! sage_yaml:
//!   name: Demo
//!   description: Test
//!   version: \"1.0.0\"
//!   author: Alice
//! catalogs:
//!   ventas:
//!     name: Ventas
//!     filename: ventas.csv
//!     file_format:
//!       type: CSV
//!       delimiter: ','
//!       header: true
//! packages:
//! ";
//!
//! let doc = parse(text).unwrap();
//! assert_eq!(doc.catalogs[0].id, "ventas");
//! assert_eq!(doc.catalogs[0].file_format.delimiter, ",");
//! assert!(doc.packages.is_empty());
//!
//! let regenerated = generate(&doc);
//! assert!(regenerated.contains("      delimiter: ','\n"));
//! assert_eq!(generate(&parse(&regenerated).unwrap()), regenerated);
//! ```

mod error;
mod export;
mod generator;
mod parser;

pub use error::{ParseError, Result};
pub use export::{CONTENT_TYPE, FALLBACK_STEM, FILE_EXTENSION, download_filename};
pub use generator::{generate, write_document};
pub use parser::{
    DialectParser, MAX_LINES, ParseOutcome, SkipReason, SkippedLine, load_into, parse,
    parse_bytes, parse_file,
};
