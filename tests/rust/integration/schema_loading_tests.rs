//! Catalog and engine configuration loaded from files.

use std::collections::HashMap;
use std::io::Write;

use entityql::entity_catalog::{CatalogError, EntityCatalog};
use entityql::{EngineConfig, QueryDelegates, QueryError, QueryParser};
use tempfile::NamedTempFile;

use super::common::StringFactory;

fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_catalog_from_file_drives_parsing() {
    let file = yaml_file(
        r#"
entities:
  - name: Track
    qualified_name: org.music.Track
    properties:
      length: { type: long }
      album:
        type: embedded
        properties:
          title: { type: string }
"#,
    );
    let catalog = EntityCatalog::from_yaml_file(file.path()).unwrap();
    let parameters = HashMap::new();
    let delegates = QueryDelegates::new(&catalog, &StringFactory, &parameters);

    let result = QueryParser::default()
        .parse::<String>("from org.music.Track t where t.album.title = 'Blue' and length > 200", &delegates)
        .unwrap();
    assert_eq!(
        result.query,
        r#"And[Comparison(album.title,EQ,"Blue"), Comparison(length,GT,200)]"#
    );
}

#[test]
fn test_invalid_catalogs_rejected() {
    let missing = EntityCatalog::from_yaml_file("/nonexistent/catalog.yaml");
    assert!(matches!(missing, Err(CatalogError::ReadError { .. })));

    let empty_embedded = yaml_file(
        r#"
entities:
  - name: Track
    properties:
      album: { type: embedded }
"#,
    );
    assert!(matches!(
        EntityCatalog::from_yaml_file(empty_embedded.path()),
        Err(CatalogError::EmptyEmbedded { .. })
    ));
}

#[test]
fn test_engine_config_file_limits() {
    let config_file = yaml_file("max_query_length: 32\nlog_queries: true\n");
    let config = EngineConfig::from_yaml_file(config_file.path()).unwrap();
    assert_eq!(config.max_query_length, 32);
    assert!(config.log_queries);

    let catalog = super::common::library();
    let parameters = HashMap::new();
    let delegates = QueryDelegates::new(&catalog, &StringFactory, &parameters);
    let parser = QueryParser::new(config);

    assert!(parser.parse::<String>("from Book b where b.id = 1", &delegates).is_ok());
    let err = parser
        .parse::<String>("from Book b where b.id = 1 or b.pages = 100", &delegates)
        .unwrap_err();
    assert!(matches!(err, QueryError::Syntax(_)));
}
