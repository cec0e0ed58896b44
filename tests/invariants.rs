//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use zip::ZipArchive;

use themeforge_core::{
    registry::Variant, CompileError, PackOutcome, PageModel, SectionDefinition,
    SectionRegistry, SettingDeclaration, SettingKind, StreamConfig, ThemeCompiler, ThemeConfig,
};

fn example_page() -> PageModel {
    PageModel::from_json(
        r##"[
            {"id": "a", "type": "header", "variant": "style-a",
             "settings": {"logo_text": "Acme", "bg_color": "#fff", "text_color": "#000", "sticky": false}},
            {"id": "b", "type": "hero", "variant": "style-b",
             "settings": {"heading": "Hello", "subheading": "World", "button_text": "Go",
                          "bg_color": "#f4f4f4", "text_color": "#111111", "padding_top": 40, "padding_bottom": 120}},
            {"id": "c", "type": "header", "variant": "style-b",
             "settings": {"logo_text": "Acme Two", "bg_color": "#222222", "text_color": "#ffffff", "sticky": true}}
        ]"##,
    )
    .unwrap()
}

fn read_entries(bytes: &[u8]) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = String::new();
            file.read_to_string(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn entry<'a>(entries: &'a [(String, String)], path: &str) -> &'a str {
    &entries.iter().find(|(p, _)| p == path).unwrap().1
}

fn schema_block(template: &str) -> Value {
    let start = template.find("{% schema %}").unwrap() + "{% schema %}".len();
    let end = template.find("{% endschema %}").unwrap();
    serde_json::from_str(&template[start..end]).unwrap()
}

#[test]
fn invariant_example_scenario() {
    let compiler = ThemeCompiler::default();
    let export = compiler.export(&example_page()).unwrap();
    let entries = read_entries(&export.archive);

    let paths: Vec<_> = entries.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        [
            "layout/theme.liquid",
            "templates/index.json",
            "sections/header.liquid",
            "sections/hero.liquid",
            "config/settings_schema.json",
        ]
    );

    let manifest: Value = serde_json::from_str(entry(&entries, "templates/index.json")).unwrap();
    let order = manifest["order"].as_array().unwrap();
    assert_eq!(order.len(), 3);
    let sections = manifest["sections"].as_object().unwrap();
    assert_eq!(sections.len(), 3);
    let headers = sections.values().filter(|s| s["type"] == "header").count();
    assert_eq!(headers, 2);

    let first = &sections[order[0].as_str().unwrap()];
    assert_eq!(first["settings"]["logo_text"], "Acme");
    assert_eq!(first["settings"]["variant"], "style-a");
    let third = &sections[order[2].as_str().unwrap()];
    assert_eq!(third["settings"]["sticky"], true);
    assert_eq!(third["settings"]["variant"], "style-b");
}

#[test]
fn invariant_template_never_inlines_instance_values() {
    let export = ThemeCompiler::default().export(&example_page()).unwrap();
    let entries = read_entries(&export.archive);
    let header = entry(&entries, "sections/header.liquid");
    assert!(!header.contains("Acme"));
    assert!(!header.contains("#222222"));
}

#[test]
fn invariant_deterministic_archive() {
    let compiler = ThemeCompiler::default();
    let first = compiler.export(&example_page()).unwrap();
    let second = compiler.export(&example_page()).unwrap();

    assert_eq!(first.archive, second.archive);
    assert_eq!(first.receipt.page_hash, second.receipt.page_hash);
    assert_ne!(first.receipt.export_id, second.receipt.export_id);
}

#[test]
fn invariant_completeness() {
    let registry = SectionRegistry::builtin();
    let mut page = PageModel::new();
    for section_type in ["footer", "product-grid", "footer", "image-banner", "product-grid"] {
        page.add_section(&registry, section_type).unwrap();
    }

    let artifact = ThemeCompiler::new(registry).compile_artifact(&page).unwrap();
    assert_eq!(
        artifact.section_paths(),
        [
            "sections/footer.liquid",
            "sections/product-grid.liquid",
            "sections/image-banner.liquid",
        ]
    );
    assert_eq!(artifact.len(), 6);
}

#[test]
fn invariant_manifest_order_fidelity() {
    let registry = SectionRegistry::builtin();
    let mut page = PageModel::new();
    for section_type in ["hero", "hero", "footer", "hero"] {
        page.add_section(&registry, section_type).unwrap();
    }

    let artifact = ThemeCompiler::new(registry).compile_artifact(&page).unwrap();
    let manifest: Value = serde_json::from_slice(artifact.get("templates/index.json").unwrap()).unwrap();
    let order: Vec<_> = manifest["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap().to_string())
        .collect();

    assert_eq!(order.len(), page.len());
    assert_eq!(order.iter().collect::<HashSet<_>>().len(), order.len());
    let types: Vec<_> = order
        .iter()
        .map(|k| manifest["sections"][k]["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["hero", "hero", "footer", "hero"]);
}

#[test]
fn invariant_schema_markup_consistency() {
    let registry = SectionRegistry::builtin();
    let mut page = PageModel::new();
    for definition in registry.list() {
        page.add_section(&registry, &definition.section_type).unwrap();
    }

    let compiler = ThemeCompiler::new(registry.clone());
    let artifact = compiler.compile_artifact(&page).unwrap();

    for definition in registry.list() {
        let path = format!("sections/{}.liquid", definition.section_type);
        let template = std::str::from_utf8(artifact.get(&path).unwrap()).unwrap();
        let schema = schema_block(template);
        assert_eq!(schema["tag"], "section");
        assert_eq!(schema["class"], format!("section-{}", definition.section_type));

        let fields = schema["settings"].as_array().unwrap();
        for setting in &definition.settings {
            let matching: Vec<_> = fields.iter().filter(|f| f["id"] == setting.id.as_str()).collect();
            assert_eq!(matching.len(), 1, "{} / {}", definition.section_type, setting.id);
            assert_eq!(matching[0]["type"], setting.kind.name());

            let markup = &template[..template.find("{% schema %}").unwrap()];
            assert!(markup.contains(&format!("section.settings.{}", setting.id)));
        }
    }
}

#[test]
fn invariant_unknown_type_rejected_whole() {
    let mut page = example_page();
    page.push(
        serde_json::from_value(json!({
            "id": "z", "type": "carousel", "variant": "style-a", "settings": {}
        }))
        .unwrap(),
    );

    let compiler = ThemeCompiler::default();
    match compiler.compile_artifact(&page) {
        Err(CompileError::UnknownSectionType { instance_id, section_type }) => {
            assert_eq!(instance_id, "z");
            assert_eq!(section_type, "carousel");
        }
        other => panic!("expected UnknownSectionType, got {:?}", other.map(|a| a.paths().len())),
    }
    assert!(compiler.export(&page).is_err());
    assert!(compiler.compile(&page).is_err());
}

#[test]
fn invariant_invalid_setting_rejected() {
    let mut page = example_page();
    let mut updates = serde_json::Map::new();
    updates.insert("padding_top".to_string(), json!(500));
    assert!(page.update_settings("b", updates));

    let err = ThemeCompiler::default().export(&page).unwrap_err();
    match &err {
        CompileError::InvalidSettingValue { instance_id, setting_id, .. } => {
            assert_eq!(instance_id, "b");
            assert_eq!(setting_id, "padding_top");
        }
        other => panic!("expected InvalidSettingValue, got {}", other),
    }
    assert_eq!(err.kind(), "invalid_setting_value");
}

#[test]
fn invariant_empty_page() {
    let export = ThemeCompiler::default().export(&PageModel::new()).unwrap();
    let entries = read_entries(&export.archive);

    let paths: Vec<_> = entries.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        ["layout/theme.liquid", "templates/index.json", "config/settings_schema.json"]
    );
    let manifest: Value = serde_json::from_str(entry(&entries, "templates/index.json")).unwrap();
    assert_eq!(manifest, json!({"sections": {}, "order": []}));

    let settings: Value = serde_json::from_str(entry(&entries, "config/settings_schema.json")).unwrap();
    assert_eq!(settings[0]["name"], "theme_info");
    assert!(export.receipt.templates.is_empty());
}

#[test]
fn invariant_stream_matches_export() {
    let compiler = ThemeCompiler::default();
    let streamed = compiler.compile(&example_page()).unwrap().into_bytes().unwrap();
    let packed = compiler.export(&example_page()).unwrap().archive;
    assert_eq!(streamed, packed);
}

#[test]
fn invariant_stream_abort_stops_worker() {
    let config = ThemeConfig {
        stream: StreamConfig { chunk_size: 64, buffer_chunks: 1 },
        ..ThemeConfig::default()
    };
    let compiler = ThemeCompiler::with_config(Arc::new(SectionRegistry::builtin()), config);

    let mut stream = compiler.compile(&example_page()).unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.len(), 64);

    match stream.abort() {
        PackOutcome::Aborted { bytes_sent } => assert!(bytes_sent >= 64),
        other => panic!("expected abort, got {:?}", other),
    }
}

#[test]
fn invariant_stream_chunks_are_fixed_size() {
    let config = ThemeConfig {
        stream: StreamConfig { chunk_size: 100, buffer_chunks: 2 },
        ..ThemeConfig::default()
    };
    let compiler = ThemeCompiler::with_config(Arc::new(SectionRegistry::builtin()), config);

    let chunks: Vec<Vec<u8>> = compiler
        .compile(&example_page())
        .unwrap()
        .map(|chunk| chunk.unwrap())
        .collect();

    let (last, full) = chunks.split_last().unwrap();
    assert!(!full.is_empty());
    assert!(full.iter().all(|chunk| chunk.len() == 100));
    assert!(!last.is_empty() && last.len() <= 100);
    assert_eq!(chunks.concat(), compiler.export(&example_page()).unwrap().archive);
}

#[test]
fn invariant_stream_read_into_empty_buffer() {
    let compiler = ThemeCompiler::default();
    let mut stream = compiler.compile(&example_page()).unwrap();
    assert_eq!(stream.read(&mut [0u8; 0]).unwrap(), 0);

    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, compiler.export(&example_page()).unwrap().archive);
}

#[test]
fn invariant_dropped_stream_releases_worker() {
    let config = ThemeConfig {
        stream: StreamConfig { chunk_size: 32, buffer_chunks: 1 },
        ..ThemeConfig::default()
    };
    let compiler = ThemeCompiler::with_config(Arc::new(SectionRegistry::builtin()), config);
    for _ in 0..8 {
        let mut stream = compiler.compile(&example_page()).unwrap();
        let _ = stream.next();
        drop(stream);
    }
}

#[test]
fn invariant_concurrent_exports_do_not_interfere() {
    let compiler = Arc::new(ThemeCompiler::default());
    let expected = compiler.export(&example_page()).unwrap().archive;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let compiler = Arc::clone(&compiler);
            thread::spawn(move || compiler.compile(&example_page()).unwrap().into_bytes().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn invariant_registries_are_independent() {
    let mut registry = SectionRegistry::new();
    registry
        .register(
            SectionDefinition {
                section_type: "announcement".to_string(),
                name: "Announcement".to_string(),
                variants: vec![Variant::new("style-a", "Bar")],
                settings: vec![SettingDeclaration::new(
                    "message",
                    "Message",
                    SettingKind::Text,
                    "Free shipping",
                )],
            },
            |_: &SectionDefinition| {
                "<div class=\"announcement-{{ section.id }}\">{{ section.settings.message }}</div>".to_string()
            },
        )
        .unwrap();

    let mut page = PageModel::new();
    page.add_section(&registry, "announcement").unwrap();
    let custom = ThemeCompiler::new(registry);
    let artifact = custom.compile_artifact(&page).unwrap();
    assert_eq!(artifact.section_paths(), ["sections/announcement.liquid"]);

    // The stock registry knows nothing about it.
    let stock = ThemeCompiler::default();
    assert!(matches!(
        stock.compile_artifact(&page),
        Err(CompileError::UnknownSectionType { .. })
    ));
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_compile_calls_validate() {
    use themeforge_core::pipeline::{get_validation_call_count, reset_validation_call_count};

    reset_validation_call_count();
    let compiler = ThemeCompiler::default();
    let _ = compiler.compile_artifact(&example_page());
    let _ = compiler.export(&example_page());
    drop(compiler.compile(&example_page()));
    assert!(get_validation_call_count() >= 3);
}
