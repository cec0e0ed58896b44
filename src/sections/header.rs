//! Header section: standard or centered, optionally sticky.

use crate::registry::{SectionDefinition, SettingDeclaration, SettingKind, Variant};

pub fn definition() -> SectionDefinition {
    SectionDefinition {
        section_type: "header".to_string(),
        name: "Header".to_string(),
        variants: vec![
            Variant::new("style-a", "Standard"),
            Variant::new("style-b", "Centered"),
        ],
        settings: vec![
            SettingDeclaration::new("logo_text", "Logo Text", SettingKind::Text, "My Store"),
            SettingDeclaration::new("bg_color", "Background Color", SettingKind::Color, "#ffffff"),
            SettingDeclaration::new("text_color", "Text Color", SettingKind::Color, "#000000"),
            SettingDeclaration::new("sticky", "Sticky Header", SettingKind::Checkbox, false),
        ],
    }
}

pub fn markup(_definition: &SectionDefinition) -> String {
    r#"<header class="header-{{ section.id }} header--{{ section.settings.variant }}{% if section.settings.sticky %} sticky{% endif %}">
  <div class="header-container">
    <a href="/" class="logo">{{ section.settings.logo_text }}</a>
    <nav>
      <ul>
        <li><a href="/">Home</a></li>
        <li><a href="/collections/all">Catalog</a></li>
      </ul>
    </nav>
  </div>
</header>
<style>
  .header-{{ section.id }} {
    background: {{ section.settings.bg_color }};
    color: {{ section.settings.text_color }};
    padding: 20px;
  }
  .header-{{ section.id }} a { color: inherit; text-decoration: none; }
  .header-{{ section.id }} ul { display: flex; gap: 24px; list-style: none; margin: 0; padding: 0; }
{%- if section.settings.variant == 'style-b' %}
  .header-{{ section.id }} .header-container { display: flex; flex-direction: column; align-items: center; gap: 12px; }
{%- else %}
  .header-{{ section.id }} .header-container { display: flex; justify-content: space-between; align-items: center; }
{%- endif %}
  .header-{{ section.id }}.sticky {
    position: sticky;
    top: 0;
    z-index: 100;
  }
</style>
"#
    .to_string()
}
