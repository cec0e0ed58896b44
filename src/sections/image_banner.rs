//! Image banner: heading over the image or below it.

use crate::registry::{SectionDefinition, SettingDeclaration, SettingKind, Variant};

pub fn definition() -> SectionDefinition {
    SectionDefinition {
        section_type: "image-banner".to_string(),
        name: "Image Banner".to_string(),
        variants: vec![
            Variant::new("style-a", "Overlay"),
            Variant::new("style-b", "Text Below"),
        ],
        settings: vec![
            SettingDeclaration::new(
                "image_url",
                "Banner Image",
                SettingKind::ImagePicker,
                "https://picsum.photos/seed/banner/1200/600",
            ),
            SettingDeclaration::new("heading", "Heading", SettingKind::Text, "Season Sale"),
            SettingDeclaration::new(
                "overlay_opacity",
                "Overlay Opacity",
                SettingKind::range(0.0, 100.0, 5.0, Some("%")),
                30,
            ),
        ],
    }
}

pub fn markup(_definition: &SectionDefinition) -> String {
    r#"<section class="banner-{{ section.id }} banner--{{ section.settings.variant }}">
  <div class="banner-image">
    {%- if section.settings.image_url != blank %}
    <img src="{{ section.settings.image_url }}" alt="{{ section.settings.heading | escape }}">
    {%- endif %}
    {%- if section.settings.variant == 'style-b' %}
  </div>
  <div class="banner-caption">
    <h2>{{ section.settings.heading }}</h2>
  </div>
    {%- else %}
    <div class="banner-overlay" style="background: rgba(0, 0, 0, {{ section.settings.overlay_opacity | divided_by: 100.0 }})">
      <h2>{{ section.settings.heading }}</h2>
    </div>
  </div>
    {%- endif %}
</section>
<style>
  .banner-{{ section.id }} { position: relative; }
  .banner-{{ section.id }} .banner-image { position: relative; }
  .banner-{{ section.id }} .banner-image img { width: 100%; height: auto; display: block; }
  .banner-{{ section.id }} .banner-overlay {
    position: absolute;
    inset: 0;
    display: flex;
    align-items: center;
    justify-content: center;
    color: #ffffff;
  }
  .banner-{{ section.id }} .banner-caption { padding: 24px 20px; text-align: center; }
</style>
"#
    .to_string()
}
