//! Setting-Kind Translator
//!
//! Maps declared setting kinds onto the storefront engine's schema fields.

use serde::Serialize;
use serde_json::Value;

use crate::registry::{
    SectionDefinition, SelectOption, SettingDeclaration, SettingKind, VARIANT_SETTING_ID,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Color,
    Number,
    Range,
    Select,
    ImagePicker,
    Checkbox,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Color => "color",
            Self::Number => "number",
            Self::Range => "range",
            Self::Select => "select",
            Self::ImagePicker => "image_picker",
            Self::Checkbox => "checkbox",
        }
    }
}

/// One entry of a section schema's `settings` array.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchemaField {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub id: String,
    pub label: String,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl SchemaField {
    fn plain(kind: FieldKind, declaration: &SettingDeclaration) -> Self {
        Self {
            kind,
            id: declaration.id.clone(),
            label: declaration.label.clone(),
            default: declaration.default.clone(),
            min: None,
            max: None,
            step: None,
            unit: None,
            options: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Preset {
    pub name: String,
}

/// The JSON body between `{% schema %}` and `{% endschema %}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectionSchema {
    pub name: String,
    pub tag: String,
    pub class: String,
    pub settings: Vec<SchemaField>,
    pub presets: Vec<Preset>,
}

/// Translate one declaration. Total over the kind set.
pub fn translate(declaration: &SettingDeclaration) -> SchemaField {
    match &declaration.kind {
        SettingKind::Text => SchemaField::plain(FieldKind::Text, declaration),
        SettingKind::Textarea => SchemaField::plain(FieldKind::Textarea, declaration),
        SettingKind::Color => SchemaField::plain(FieldKind::Color, declaration),
        SettingKind::Number => SchemaField::plain(FieldKind::Number, declaration),
        SettingKind::Range { min, max, step, unit } => SchemaField {
            min: Some(json_number(*min)),
            max: Some(json_number(*max)),
            step: Some(json_number(*step)),
            unit: unit.clone(),
            ..SchemaField::plain(FieldKind::Range, declaration)
        },
        SettingKind::Select { options } => SchemaField {
            options: Some(options.clone()),
            ..SchemaField::plain(FieldKind::Select, declaration)
        },
        SettingKind::ImagePicker => SchemaField::plain(FieldKind::ImagePicker, declaration),
        SettingKind::Checkbox => SchemaField::plain(FieldKind::Checkbox, declaration),
    }
}

/// Select field exposing the section's variants under the reserved `variant` id.
pub fn variant_field(definition: &SectionDefinition) -> SchemaField {
    let options: Vec<_> = definition
        .variants
        .iter()
        .map(|v| SelectOption::new(&v.name, &v.id))
        .collect();
    let default = definition
        .default_variant()
        .map(|v| Value::String(v.id.clone()))
        .unwrap_or(Value::Null);

    SchemaField {
        kind: FieldKind::Select,
        id: VARIANT_SETTING_ID.to_string(),
        label: "Style".to_string(),
        default,
        min: None,
        max: None,
        step: None,
        unit: None,
        options: Some(options),
    }
}

pub fn section_schema(definition: &SectionDefinition) -> SectionSchema {
    let mut settings = Vec::with_capacity(definition.settings.len() + 1);
    settings.push(variant_field(definition));
    settings.extend(definition.settings.iter().map(translate));

    SectionSchema {
        name: definition.name.clone(),
        tag: "section".to_string(),
        class: format!("section-{}", definition.section_type),
        settings,
        presets: vec![Preset { name: definition.name.clone() }],
    }
}

/// Integral values serialize as JSON integers (`80`, not `80.0`).
fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SectionRegistry;
    use serde_json::json;

    #[test]
    fn test_kind_table() {
        let cases = [
            (SettingKind::Text, "text"),
            (SettingKind::Textarea, "textarea"),
            (SettingKind::Color, "color"),
            (SettingKind::Number, "number"),
            (SettingKind::range(0.0, 10.0, 1.0, None), "range"),
            (SettingKind::select(&["a"]), "select"),
            (SettingKind::ImagePicker, "image_picker"),
            (SettingKind::Checkbox, "checkbox"),
        ];
        for (kind, expected) in cases {
            let declaration = SettingDeclaration::new("x", "X", kind, Value::Null);
            assert_eq!(translate(&declaration).kind.as_str(), expected);
        }
    }

    #[test]
    fn test_range_carries_bounds() {
        let declaration = SettingDeclaration::new(
            "padding_top",
            "Padding Top",
            SettingKind::range(0.0, 200.0, 10.0, Some("px")),
            80,
        );
        let field = serde_json::to_value(translate(&declaration)).unwrap();
        assert_eq!(
            field,
            json!({
                "type": "range", "id": "padding_top", "label": "Padding Top", "default": 80,
                "min": 0, "max": 200, "step": 10, "unit": "px"
            })
        );
    }

    #[test]
    fn test_plain_field_omits_extras() {
        let declaration = SettingDeclaration::new("sticky", "Sticky", SettingKind::Checkbox, false);
        let field = serde_json::to_value(translate(&declaration)).unwrap();
        assert_eq!(
            field,
            json!({"type": "checkbox", "id": "sticky", "label": "Sticky", "default": false})
        );
    }

    #[test]
    fn test_fractional_step_kept() {
        assert_eq!(json_number(0.5), json!(0.5));
        assert_eq!(json_number(-3.0), json!(-3));
    }

    #[test]
    fn test_section_schema_shape() {
        let registry = SectionRegistry::builtin();
        let schema = section_schema(registry.lookup("header").unwrap());
        assert_eq!(schema.tag, "section");
        assert_eq!(schema.class, "section-header");
        assert_eq!(schema.presets, vec![Preset { name: "Header".to_string() }]);

        let ids: Vec<_> = schema.settings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["variant", "logo_text", "bg_color", "text_color", "sticky"]);
        assert_eq!(schema.settings[0].default, json!("style-a"));
    }
}
