//! Integration tests for configuration and registry setup

use cview_core::registry::{self, Capabilities, Registry};
use cview_core::{Config, ContentView, Error, View, Viewer};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[view]\ndefault_view = \"hex\"\nlimit = 64\n\n[layout]\njson_indent = 2"
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.view.default_view, "hex");
    assert_eq!(config.view_options().limit, 64);
    assert_eq!(config.view_options().json_indent, 2);
}

#[test]
fn test_content_view_from_config() {
    let mut config = Config::default();
    config.view.default_view = "x".to_string();
    config.view.limit = 16;

    let cv = ContentView::new(&config).unwrap();
    assert_eq!(cv.default_view(), View::Xml);

    let outcome = cv
        .render(None, [("Content-Type", "text/plain")], &[b'a'; 40], None, &mut |_| {})
        .unwrap();
    // XML declines plain text, the Raw fallback honours the configured limit
    assert_eq!(outcome.status, "Couldn't parse: falling back to Raw");
    assert!(outcome.lines.last().unwrap().plain_text().contains("24B"));
}

#[test]
fn test_invalid_config_rejected_by_content_view() {
    let mut config = Config::default();
    config.layout.js_indent = 0;
    assert!(matches!(
        ContentView::new(&config),
        Err(Error::ConfigValue { .. })
    ));
}

#[test]
fn test_global_registry_matches_detected_capabilities() {
    let global = registry::global();
    let local = Registry::new(Capabilities::detect());
    let names = |r: &Registry| r.views().iter().map(|v| v.name()).collect::<Vec<_>>();
    assert_eq!(names(&global), names(&local));
}

#[test]
fn test_every_registered_type_resolves() {
    let reg = Registry::default();
    for view in reg.views() {
        for ct in view.content_types() {
            assert!(reg.candidates_for_type(ct).contains(view));
        }
    }
    assert_eq!(reg.candidates_for_type("text/html")[0], View::Html);
}
