//! Helpers for handing generated text to a download or storage layer.

use sage_config_core::Meta;

/// MIME type of generated documents.
pub const CONTENT_TYPE: &str = "text/yaml";

/// File extension of generated documents.
pub const FILE_EXTENSION: &str = "yaml";

/// File stem used when the document has no name.
pub const FALLBACK_STEM: &str = "config";

/// Suggests a download file name for a document.
///
/// Uses `meta.name`, or `config` when the name is blank. Path separators
/// are replaced so the result is always a bare file name.
///
/// # Examples
///
/// ```
/// use sage_config_core::Meta;
/// use sage_config_dialect::download_filename;
///
/// let mut meta = Meta::default();
/// meta.name = "Ventas Chile".into();
/// assert_eq!(download_filename(&meta), "Ventas Chile.yaml");
///
/// meta.name = "  ".into();
/// assert_eq!(download_filename(&meta), "config.yaml");
///
/// meta.name = "2024/01".into();
/// assert_eq!(download_filename(&meta), "2024_01.yaml");
/// ```
pub fn download_filename(meta: &Meta) -> String {
    let name = meta.name.trim();
    let stem = if name.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        name.replace(['/', '\\'], "_")
    };
    format!("{stem}.{FILE_EXTENSION}")
}
