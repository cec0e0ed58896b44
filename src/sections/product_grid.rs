//! Product grid: fixed column grid or horizontally scrolling slider.

use crate::registry::{SectionDefinition, SettingDeclaration, SettingKind, Variant};

pub fn definition() -> SectionDefinition {
    SectionDefinition {
        section_type: "product-grid".to_string(),
        name: "Product Grid".to_string(),
        variants: vec![
            Variant::new("style-a", "Grid"),
            Variant::new("style-b", "Slider"),
        ],
        settings: vec![
            SettingDeclaration::new("title", "Title", SettingKind::Text, "Featured Products"),
            SettingDeclaration::new(
                "products_to_show",
                "Products to show",
                SettingKind::range(2.0, 12.0, 1.0, None),
                4,
            ),
            SettingDeclaration::new("columns", "Columns", SettingKind::select(&["2", "3", "4"]), "4"),
        ],
    }
}

/// One `.grid-N` rule per declared column option.
fn column_rules(definition: &SectionDefinition) -> String {
    let Some(SettingKind::Select { options }) = definition.setting("columns").map(|s| &s.kind)
    else {
        return String::new();
    };

    options
        .iter()
        .filter_map(|option| option.value.parse::<u32>().ok())
        .map(|n| {
            format!(
                "  .product-grid-{{{{ section.id }}}} .grid-{n} {{ grid-template-columns: repeat({n}, 1fr); }}\n"
            )
        })
        .collect()
}

pub fn markup(definition: &SectionDefinition) -> String {
    let body = r#"<section class="product-grid-{{ section.id }} product-grid--{{ section.settings.variant }}">
  <h2>{{ section.settings.title }}</h2>
{%- if section.settings.variant == 'style-b' %}
  <div class="slider" role="list">
    {%- for i in (1..section.settings.products_to_show) %}
    <div class="product-card" role="listitem">
      <div class="product-image"></div>
      <h3>Product Title {{ i }}</h3>
      <p>$49.00</p>
    </div>
    {%- endfor %}
  </div>
{%- else %}
  <div class="grid grid-{{ section.settings.columns }}">
    {%- for i in (1..section.settings.products_to_show) %}
    <div class="product-card">
      <div class="product-image"></div>
      <h3>Product Title {{ i }}</h3>
      <p>$49.00</p>
    </div>
    {%- endfor %}
  </div>
{%- endif %}
</section>
<style>
  .product-grid-{{ section.id }} { padding: 40px 20px; text-align: center; }
  .product-grid-{{ section.id }} .grid { display: grid; gap: 20px; }
"#;

    let tail = r#"  .product-grid-{{ section.id }} .slider {
    display: grid;
    grid-auto-flow: column;
    grid-auto-columns: calc((100% - 60px) / {{ section.settings.columns }});
    gap: 20px;
    overflow-x: auto;
    scroll-snap-type: x mandatory;
  }
  .product-grid-{{ section.id }} .slider .product-card { scroll-snap-align: start; }
  .product-grid-{{ section.id }} .product-image { background: #eeeeee; aspect-ratio: 3/4; }
</style>
"#;

    format!("{}{}{}", body, column_rules(definition), tail)
}
