//! Manifest Builder
//!
//! Turns page order into `templates/index.json` and the set of section
//! types that need a template file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::page::PageModel;
use crate::pipeline::CompileError;
use crate::registry::{SectionRegistry, VARIANT_SETTING_ID};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub sections: IndexMap<String, ManifestEntry>,
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    #[serde(rename = "type")]
    pub section_type: String,
    pub settings: Map<String, Value>,
}

/// Key for the instance at `index`; unique per page because the index is.
pub fn manifest_key(section_type: &str, index: usize) -> String {
    format!("builder_{}_{}", section_type, index)
}

/// Build the manifest and the distinct section types in first-occurrence order.
pub fn build_manifest(
    page: &PageModel,
    registry: &SectionRegistry,
) -> Result<(Manifest, Vec<String>), CompileError> {
    let mut manifest = Manifest::default();
    let mut distinct_types: Vec<String> = vec![];

    for (index, instance) in page.iter().enumerate() {
        let definition = registry.lookup(&instance.section_type).ok_or_else(|| {
            CompileError::UnknownSectionType {
                instance_id: instance.id.clone(),
                section_type: instance.section_type.clone(),
            }
        })?;

        let mut settings = Map::new();
        settings.insert(
            VARIANT_SETTING_ID.to_string(),
            Value::String(instance.variant.clone()),
        );
        for declared in &definition.settings {
            let value = instance.settings.get(&declared.id).ok_or_else(|| {
                CompileError::InvalidSettingValue {
                    instance_id: instance.id.clone(),
                    setting_id: declared.id.clone(),
                    reason: "declared setting is missing".to_string(),
                }
            })?;
            settings.insert(declared.id.clone(), value.clone());
        }

        let key = manifest_key(&instance.section_type, index);
        manifest.sections.insert(
            key.clone(),
            ManifestEntry {
                section_type: instance.section_type.clone(),
                settings,
            },
        );
        manifest.order.push(key);

        if !distinct_types.contains(&instance.section_type) {
            distinct_types.push(instance.section_type.clone());
        }
    }

    Ok((manifest, distinct_types))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SectionInstance;
    use serde_json::json;

    fn page_of(types: &[&str]) -> PageModel {
        let registry = SectionRegistry::builtin();
        let mut page = PageModel::new();
        for (i, t) in types.iter().enumerate() {
            page.push(registry.instantiate(t, format!("s{}", i)).unwrap());
        }
        page
    }

    #[test]
    fn test_keys_follow_page_order() {
        let page = page_of(&["header", "hero", "header"]);
        let (manifest, types) = build_manifest(&page, &SectionRegistry::builtin()).unwrap();

        assert_eq!(manifest.order, ["builder_header_0", "builder_hero_1", "builder_header_2"]);
        assert_eq!(types, ["header", "hero"]);
        assert_eq!(manifest.sections.len(), 3);
        let keys: Vec<_> = manifest.sections.keys().cloned().collect();
        assert_eq!(keys, manifest.order);
    }

    #[test]
    fn test_settings_in_declaration_order_with_variant() {
        let mut page = page_of(&["header"]);
        let mut instance = page.sections()[0].clone();
        instance.variant = "style-b".to_string();
        page = PageModel::from(vec![instance]);

        let (manifest, _) = build_manifest(&page, &SectionRegistry::builtin()).unwrap();
        let entry = &manifest.sections["builder_header_0"];
        let keys: Vec<_> = entry.settings.keys().map(String::as_str).collect();
        assert_eq!(keys, ["variant", "logo_text", "bg_color", "text_color", "sticky"]);
        assert_eq!(entry.settings["variant"], json!("style-b"));
    }

    #[test]
    fn test_unknown_type_fails() {
        let page = PageModel::from(vec![SectionInstance {
            id: "x".to_string(),
            section_type: "carousel".to_string(),
            variant: "style-a".to_string(),
            settings: Map::new(),
        }]);
        let err = build_manifest(&page, &SectionRegistry::builtin()).unwrap_err();
        assert!(matches!(err, CompileError::UnknownSectionType { .. }));
    }

    #[test]
    fn test_empty_page_serializes_empty_maps() {
        let (manifest, types) = build_manifest(&PageModel::new(), &SectionRegistry::builtin()).unwrap();
        assert!(types.is_empty());
        assert_eq!(serde_json::to_value(&manifest).unwrap(), json!({"sections": {}, "order": []}));
    }
}
