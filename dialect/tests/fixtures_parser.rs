use std::fs;
use std::path::PathBuf;

use sage_config_core::{
    Catalog, FileType, IssueKind, Package, Severity, ValidationPolicy, has_errors,
    validate_document,
};
use sage_config_dialect::{DialectParser, SkipReason, generate, parse, parse_file};

#[test]
fn test_parse_demo_fixture() {
    let doc = parse(&fixture("demo.yaml")).expect("fixture should parse");

    assert_eq!(doc.meta.name, "Demo");
    assert_eq!(doc.meta.version, "1.0.0");
    assert_eq!(doc.meta.author, "Alice");
    assert_eq!(doc.meta.comments, "");

    assert_eq!(doc.catalogs.len(), 1);
    let ventas = &doc.catalogs[0];
    assert_eq!(ventas.id, "ventas");
    assert_eq!(ventas.name, "Ventas");
    assert_eq!(ventas.filename, "ventas.csv");
    assert_eq!(ventas.file_format.delimiter, ",");
    assert!(ventas.file_format.header);
    assert!(ventas.fields.is_empty());
    assert!(doc.packages.is_empty());
}

#[test]
fn test_demo_fixture_json_shape() {
    let doc = parse(&fixture("demo.yaml")).expect("fixture should parse");
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "meta": {
                "name": "Demo",
                "description": "Test",
                "version": "1.0.0",
                "author": "Alice",
                "comments": ""
            },
            "catalogs": [{
                "id": "ventas",
                "name": "Ventas",
                "description": "",
                "filename": "ventas.csv",
                "file_format": { "type": "CSV", "delimiter": ",", "header": true },
                "fields": [],
                "row_validation": [],
                "catalog_validation": []
            }],
            "packages": []
        })
    );
}

#[test]
fn test_regenerate_demo_fixture() {
    let doc = parse(&fixture("demo.yaml")).expect("fixture should parse");
    let text = generate(&doc);

    assert!(text.lines().any(|line| line == "      delimiter: ','"));
    let after_packages: Vec<&str> = text
        .lines()
        .skip_while(|line| *line != "packages:")
        .skip(1)
        .collect();
    assert!(after_packages.is_empty(), "unexpected: {after_packages:?}");
}

#[test]
fn test_parse_retail_fixture() {
    let doc = parse(&fixture("retail.yaml")).expect("fixture should parse");

    assert_eq!(doc.meta.name, "Retail Diario");
    assert_eq!(doc.meta.version, "2.3.1");
    assert_eq!(doc.meta.comments, "Revisado por operaciones");

    let ids: Vec<&str> = doc.catalogs.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["ventas", "clientes"]);

    let ventas = doc.find_catalog("ventas").unwrap();
    assert_eq!(
        ventas.description,
        "Registro de todas las ventas realizadas en tiendas fisicas y canal online"
    );
    assert_eq!(ventas.file_format.delimiter, ";");

    let names: Vec<&str> = ventas.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id_venta", "monto", "canal"]);

    let monto = ventas.find_field("monto").unwrap();
    assert_eq!(monto.validation_rules[0].severity, Severity::Warning);
    assert_eq!(ventas.find_field("canal").unwrap().default_value, "tienda");

    assert_eq!(ventas.row_validation.len(), 1);
    assert_eq!(
        ventas.row_validation[0].rule,
        "pd.to_datetime(df['fecha'], errors='coerce').notnull()"
    );
    assert_eq!(ventas.catalog_validation.len(), 1);
    assert_eq!(ventas.catalog_validation[0].severity, Severity::Message);

    let clientes = doc.find_catalog("clientes").unwrap();
    assert_eq!(clientes.file_format.file_type, FileType::Excel);
    assert!(clientes.find_field("rut").unwrap().unique);

    let diario = doc.find_package("diario").unwrap();
    assert_eq!(diario.description, "Ventas y clientes en un solo archivo");
    assert_eq!(diario.catalogs, ["ventas", "clientes"]);
    assert_eq!(diario.package_validation[0].name, "clientes_conocidos");

    let solo = doc.find_package("solo_ventas").unwrap();
    assert_eq!(solo.name, "solo_ventas");
    assert_eq!(solo.file_format.file_type, FileType::Csv);

    assert_eq!(doc.field_count(), 4);
    assert_eq!(doc.rule_count(), 5);
}

#[test]
fn test_retail_fixture_is_fully_recognized_and_valid() {
    let outcome = DialectParser::new()
        .strict(true)
        .parse(&fixture("retail.yaml"))
        .expect("fixture should parse");
    assert!(outcome.is_complete(), "skipped: {:?}", outcome.skipped);

    let issues = validate_document(&outcome.document, &ValidationPolicy::default());
    assert!(issues.is_empty(), "issues: {issues:?}");
}

#[test]
fn test_retail_fixture_round_trip() {
    let doc = parse(&fixture("retail.yaml")).expect("fixture should parse");
    let text = generate(&doc);

    let reparsed = parse(&text).expect("generated text should parse");
    assert_eq!(reparsed, doc);
    assert_eq!(generate(&reparsed), text);
}

#[test]
fn test_section_words_cannot_be_entry_ids() {
    let mut doc = parse(&fixture("retail.yaml")).expect("fixture should parse");
    doc.add_catalog(Catalog::new("catalogs"));
    doc.add_package(Package::new("packages").with_catalog("ventas"));

    let issues = validate_document(&doc, &ValidationPolicy::default());
    let kinds: Vec<&IssueKind> = issues.iter().map(|i| &i.kind).collect();
    assert!(kinds.contains(&&IssueKind::InvalidId("catalogs".into())));
    assert!(kinds.contains(&&IssueKind::InvalidId("packages".into())));

    // Read back, the entry lines switch sections instead of opening entries.
    let reparsed = parse(&generate(&doc)).expect("generated text should parse");
    assert!(reparsed.find_catalog("catalogs").is_none());
    assert!(reparsed.find_package("packages").is_none());

    doc.remove_catalog("catalogs");
    doc.remove_package("packages");
    assert!(validate_document(&doc, &ValidationPolicy::default()).is_empty());
    let text = generate(&doc);
    assert_eq!(generate(&parse(&text).unwrap()), text);
}

#[test]
fn test_legacy_fixture_skips_unknown_lines() {
    let outcome = DialectParser::new()
        .strict(true)
        .parse(&fixture("legacy.yaml"))
        .expect("fixture should parse");

    let skipped: Vec<(usize, SkipReason)> = outcome
        .skipped
        .iter()
        .map(|s| (s.line, s.reason.clone()))
        .collect();
    assert_eq!(
        skipped,
        vec![
            (3, SkipReason::UnknownKey("owner".into())),
            (6, SkipReason::Unrecognized),
            (8, SkipReason::NoOpenEntry),
            (11, SkipReason::UnknownKey("encoding".into())),
            (14, SkipReason::UnknownKey("quote".into())),
            (18, SkipReason::MissingName),
            (19, SkipReason::TabIndentation),
            (21, SkipReason::MissingName),
            (22, SkipReason::NoOpenTarget),
        ]
    );

    let doc = &outcome.document;
    assert_eq!(doc.meta.name, "Legado");
    assert_eq!(doc.meta.version, "0.9");

    let inventario = &doc.catalogs[0];
    assert_eq!(doc.catalogs.len(), 1);
    assert_eq!(inventario.filename, "inventario.csv");
    assert_eq!(inventario.fields.len(), 1);
    assert!(!inventario.fields[0].required);
    assert_eq!(inventario.fields[0].field_type, "texto");
    assert_eq!(inventario.row_validation.len(), 1);
    assert_eq!(inventario.row_validation[0].rule, "df[\"stock\"] >= 0");

    assert_eq!(doc.packages[0].catalogs, ["inventario", "bodega_externa"]);
}

#[test]
fn test_legacy_fixture_permissive_matches_strict_document() {
    let text = fixture("legacy.yaml");
    let permissive = DialectParser::new().parse(&text).unwrap();
    let strict = DialectParser::new().strict(true).parse(&text).unwrap();

    assert!(permissive.skipped.is_empty());
    assert_eq!(permissive.document, strict.document);
}

#[test]
fn test_legacy_fixture_validation_reports_problems() {
    let doc = parse(&fixture("legacy.yaml")).unwrap();
    let issues = validate_document(&doc, &ValidationPolicy::default());

    assert!(has_errors(&issues));
    let kinds: Vec<&IssueKind> = issues.iter().map(|i| &i.kind).collect();
    assert!(kinds.contains(&&IssueKind::MissingMeta("description".into())));
    assert!(kinds.contains(&&IssueKind::MissingMeta("author".into())));
    assert!(kinds.contains(&&IssueKind::UnknownCatalogReference("bodega_externa".into())));
}

#[test]
fn test_parse_file_reads_fixture() {
    let doc = parse_file(fixture_path("retail.yaml")).expect("fixture should parse");
    assert_eq!(doc.catalogs.len(), 2);

    let missing = parse_file(fixture_path("does-not-exist.yaml"));
    assert!(matches!(missing, Err(sage_config_dialect::ParseError::Io(_))));
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file must be readable")
}
