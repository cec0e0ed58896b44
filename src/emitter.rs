//! Per-Type Markup Emitter
//!
//! Templates are type-level: markup reads every value through
//! `section.settings`, so one file serves all instances of a type.

use crate::registry::{RegisteredSection, SectionDefinition};
use crate::schema::section_schema;

pub type TemplateText = String;

/// Renders the Liquid body for one section type.
pub trait MarkupEmitter: Send + Sync {
    fn markup(&self, definition: &SectionDefinition) -> String;
}

impl<F> MarkupEmitter for F
where
    F: Fn(&SectionDefinition) -> String + Send + Sync,
{
    fn markup(&self, definition: &SectionDefinition) -> String {
        self(definition)
    }
}

/// Fixed markup body, used for sections loaded from disk.
#[derive(Debug, Clone)]
pub struct StaticMarkup {
    body: String,
}

impl StaticMarkup {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl MarkupEmitter for StaticMarkup {
    fn markup(&self, _definition: &SectionDefinition) -> String {
        self.body.clone()
    }
}

/// Markup followed by the `{% schema %}` block.
pub fn emit(section: &RegisteredSection) -> Result<TemplateText, serde_json::Error> {
    let body = section.emitter.markup(&section.definition);
    let schema = serde_json::to_string_pretty(&section_schema(&section.definition))?;

    Ok(format!(
        "{}\n\n{{% schema %}}\n{}\n{{% endschema %}}\n",
        body.trim_end(),
        schema
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SectionRegistry;

    fn schema_json(template: &str) -> serde_json::Value {
        let start = template.find("{% schema %}").unwrap() + "{% schema %}".len();
        let end = template.find("{% endschema %}").unwrap();
        serde_json::from_str(&template[start..end]).unwrap()
    }

    #[test]
    fn test_emit_appends_schema_block() {
        let registry = SectionRegistry::builtin();
        let template = emit(registry.entry("hero").unwrap()).unwrap();

        assert!(template.trim_end().ends_with("{% endschema %}"));
        let schema = schema_json(&template);
        assert_eq!(schema["name"], "Hero");
        assert_eq!(schema["class"], "section-hero");
        assert_eq!(schema["presets"][0]["name"], "Hero");
    }

    #[test]
    fn test_every_builtin_setting_is_interpolated() {
        let registry = SectionRegistry::builtin();
        for definition in registry.list() {
            let template = emit(registry.entry(&definition.section_type).unwrap()).unwrap();
            assert!(template.contains("{{ section.id }}"), "{} lacks namespace", definition.section_type);
            assert!(template.contains("section.settings.variant"));
            for setting in &definition.settings {
                let reference = format!("section.settings.{}", setting.id);
                assert!(
                    template.contains(&reference),
                    "{} never reads {}",
                    definition.section_type,
                    setting.id
                );
            }
        }
    }

    #[test]
    fn test_closure_emitter() {
        let emitter = |definition: &SectionDefinition| format!("<p>{}</p>", definition.name);
        let registry = SectionRegistry::builtin();
        assert_eq!(emitter.markup(registry.lookup("footer").unwrap()), "<p>Footer</p>");
    }
}
