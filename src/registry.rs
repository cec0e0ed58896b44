//! Section Registry - Typed Section Contracts
//!
//! Each registered type pairs a definition with the emitter that renders its
//! markup. The registry is built once and read-only afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::emitter::{MarkupEmitter, StaticMarkup};
use crate::page::SectionInstance;
use crate::validation::{check_setting_value, ValueCheck};

pub type SectionType = String;

/// Manifest/schema key carrying the instance variant to the runtime.
pub const VARIANT_SETTING_ID: &str = "variant";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Section type already registered: {0}")]
    DuplicateType(String),

    #[error("Invalid section definition '{section_type}': {reason}")]
    InvalidDefinition { section_type: String, reason: String },

    #[error("Failed to read section directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionDefinition {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub name: String,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub settings: Vec<SettingDeclaration>,
}

impl SectionDefinition {
    pub fn setting(&self, id: &str) -> Option<&SettingDeclaration> {
        self.settings.iter().find(|s| s.id == id)
    }

    pub fn has_variant(&self, id: &str) -> bool {
        self.variants.iter().any(|v| v.id == id)
    }

    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Every declared setting mapped to its default, in declaration order.
    pub fn default_settings(&self) -> Map<String, Value> {
        self.settings
            .iter()
            .map(|s| (s.id.clone(), s.default.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub id: String,
    pub name: String,
}

impl Variant {
    pub fn new(id: &str, name: &str) -> Self {
        Self { id: id.to_string(), name: name.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingDeclaration {
    pub id: String,
    pub label: String,
    pub default: Value,
    #[serde(flatten)]
    pub kind: SettingKind,
}

impl SettingDeclaration {
    pub fn new(id: &str, label: &str, kind: SettingKind, default: impl Into<Value>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            default: default.into(),
            kind,
        }
    }
}

/// The closed set of setting kinds a section may declare.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingKind {
    Text,
    Textarea,
    Color,
    Number,
    Range {
        min: f64,
        max: f64,
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    ImagePicker,
    Checkbox,
}

impl SettingKind {
    pub fn range(min: f64, max: f64, step: f64, unit: Option<&str>) -> Self {
        Self::Range { min, max, step, unit: unit.map(str::to_string) }
    }

    pub fn select(values: &[&str]) -> Self {
        Self::Select {
            options: values.iter().map(|v| SelectOption::new(v, v)).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Color => "color",
            Self::Number => "number",
            Self::Range { .. } => "range",
            Self::Select { .. } => "select",
            Self::ImagePicker => "image_picker",
            Self::Checkbox => "checkbox",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self { label: label.to_string(), value: value.to_string() }
    }
}

/// A definition together with the emitter that renders its markup.
#[derive(Clone)]
pub struct RegisteredSection {
    pub definition: SectionDefinition,
    pub emitter: Arc<dyn MarkupEmitter>,
}

impl fmt::Debug for RegisteredSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSection")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Section registry - registration order is preserved for listing.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: IndexMap<SectionType, RegisteredSection>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self { sections: IndexMap::new() }
    }

    /// Registry holding the stock section catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (definition, emitter) in crate::sections::catalog() {
            registry.insert(definition, emitter);
        }
        registry
    }

    /// Load custom sections from `<type>.json` + `<type>.liquid` pairs.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.extend_from_dir(dir)?;
        Ok(registry)
    }

    /// Register every definition found in `dir`, returning how many were added.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();

        let mut added = 0;
        for path in paths {
            let parsed = fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    serde_json::from_slice::<SectionDefinition>(&bytes).map_err(|e| e.to_string())
                });
            let definition = match parsed {
                Ok(definition) => definition,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable section definition");
                    continue;
                }
            };

            let markup_path = path.with_extension("liquid");
            let markup = match fs::read_to_string(&markup_path) {
                Ok(markup) => markup,
                Err(_) => {
                    warn!(path = %markup_path.display(), "skipping section without markup body");
                    continue;
                }
            };

            self.register(definition, StaticMarkup::new(markup))?;
            added += 1;
        }

        debug!(dir = %dir.display(), added, "loaded section definitions");
        Ok(added)
    }

    pub fn register(
        &mut self,
        definition: SectionDefinition,
        emitter: impl MarkupEmitter + 'static,
    ) -> Result<(), RegistryError> {
        if self.sections.contains_key(&definition.section_type) {
            return Err(RegistryError::DuplicateType(definition.section_type));
        }
        validate_definition(&definition).map_err(|reason| RegistryError::InvalidDefinition {
            section_type: definition.section_type.clone(),
            reason,
        })?;
        self.insert(definition, Arc::new(emitter));
        Ok(())
    }

    fn insert(&mut self, definition: SectionDefinition, emitter: Arc<dyn MarkupEmitter>) {
        self.sections.insert(
            definition.section_type.clone(),
            RegisteredSection { definition, emitter },
        );
    }

    pub fn lookup(&self, section_type: &str) -> Option<&SectionDefinition> {
        self.sections.get(section_type).map(|s| &s.definition)
    }

    pub fn entry(&self, section_type: &str) -> Option<&RegisteredSection> {
        self.sections.get(section_type)
    }

    pub fn list(&self) -> Vec<&SectionDefinition> {
        self.sections.values().map(|s| &s.definition).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// New instance with the first variant and every declared default.
    pub fn instantiate(&self, section_type: &str, id: impl Into<String>) -> Option<SectionInstance> {
        let definition = self.lookup(section_type)?;
        let variant = definition.default_variant()?;
        Some(SectionInstance {
            id: id.into(),
            section_type: definition.section_type.clone(),
            variant: variant.id.clone(),
            settings: definition.default_settings(),
        })
    }
}

/// Check the structural invariants a definition must hold before registration.
pub fn validate_definition(definition: &SectionDefinition) -> Result<(), String> {
    if definition.section_type.is_empty() {
        return Err("type must not be empty".into());
    }
    // The type names archive paths and CSS classes.
    if !definition
        .section_type
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    {
        return Err(format!(
            "type '{}' may only contain a-z, 0-9, '_' and '-'",
            definition.section_type
        ));
    }
    if definition.variants.is_empty() {
        return Err("at least one variant is required".into());
    }

    let mut variant_ids = HashSet::new();
    for variant in &definition.variants {
        if !variant_ids.insert(variant.id.as_str()) {
            return Err(format!("duplicate variant id '{}'", variant.id));
        }
    }

    let mut setting_ids = HashSet::new();
    for setting in &definition.settings {
        if setting.id == VARIANT_SETTING_ID {
            return Err(format!("setting id '{}' is reserved", VARIANT_SETTING_ID));
        }
        if !setting_ids.insert(setting.id.as_str()) {
            return Err(format!("duplicate setting id '{}'", setting.id));
        }

        match &setting.kind {
            SettingKind::Range { min, max, step, .. } => {
                if min >= max {
                    return Err(format!("range '{}' requires min < max", setting.id));
                }
                if *step <= 0.0 {
                    return Err(format!("range '{}' requires step > 0", setting.id));
                }
            }
            SettingKind::Select { options } => {
                if options.is_empty() {
                    return Err(format!("select '{}' has no options", setting.id));
                }
                let mut values = HashSet::new();
                for option in options {
                    if !values.insert(option.value.as_str()) {
                        return Err(format!(
                            "select '{}' repeats option value '{}'",
                            setting.id, option.value
                        ));
                    }
                }
            }
            _ => {}
        }

        if let ValueCheck::Mismatch(reason) = check_setting_value(&setting.kind, &setting.default) {
            return Err(format!("default for '{}' is invalid: {}", setting.id, reason));
        }
    }

    Ok(())
}
