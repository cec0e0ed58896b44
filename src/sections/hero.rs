//! Hero section: full-width banner text or split screen with media.

use crate::registry::{SectionDefinition, SettingDeclaration, SettingKind, Variant};

pub fn definition() -> SectionDefinition {
    SectionDefinition {
        section_type: "hero".to_string(),
        name: "Hero".to_string(),
        variants: vec![
            Variant::new("style-a", "Full Width"),
            Variant::new("style-b", "Split Screen"),
        ],
        settings: vec![
            SettingDeclaration::new("heading", "Heading", SettingKind::Text, "Welcome to our store"),
            SettingDeclaration::new(
                "subheading",
                "Subheading",
                SettingKind::Textarea,
                "Discover our latest collections.",
            ),
            SettingDeclaration::new("button_text", "Button Text", SettingKind::Text, "Shop Now"),
            SettingDeclaration::new("bg_color", "Background Color", SettingKind::Color, "#f4f4f4"),
            SettingDeclaration::new("text_color", "Text Color", SettingKind::Color, "#000000"),
            SettingDeclaration::new(
                "padding_top",
                "Padding Top",
                SettingKind::range(0.0, 200.0, 10.0, Some("px")),
                80,
            ),
            SettingDeclaration::new(
                "padding_bottom",
                "Padding Bottom",
                SettingKind::range(0.0, 200.0, 10.0, Some("px")),
                80,
            ),
        ],
    }
}

pub fn markup(_definition: &SectionDefinition) -> String {
    r#"<section class="hero-{{ section.id }} hero--{{ section.settings.variant }}">
{%- if section.settings.variant == 'style-b' %}
  <div class="hero-split">
    <div class="hero-content">
      <h1>{{ section.settings.heading }}</h1>
      <p>{{ section.settings.subheading }}</p>
      <a href="/collections/all" class="button">{{ section.settings.button_text }}</a>
    </div>
    <div class="hero-media" aria-hidden="true"></div>
  </div>
{%- else %}
  <div class="hero-content">
    <h1>{{ section.settings.heading }}</h1>
    <p>{{ section.settings.subheading }}</p>
    <a href="/collections/all" class="button">{{ section.settings.button_text }}</a>
  </div>
{%- endif %}
</section>
<style>
  .hero-{{ section.id }} {
    background: {{ section.settings.bg_color }};
    color: {{ section.settings.text_color }};
    padding-top: {{ section.settings.padding_top }}px;
    padding-bottom: {{ section.settings.padding_bottom }}px;
    text-align: center;
  }
  .hero-{{ section.id }} .button {
    display: inline-block;
    padding: 12px 28px;
    border: 1px solid currentColor;
    color: inherit;
    text-decoration: none;
  }
  .hero-{{ section.id }} .hero-split {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 40px;
    align-items: center;
    text-align: left;
    padding: 0 40px;
  }
  .hero-{{ section.id }} .hero-media { background: rgba(0, 0, 0, 0.08); aspect-ratio: 4/3; }
</style>
"#
    .to_string()
}
