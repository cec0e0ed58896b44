//! Footer section: single line or multi-column.

use crate::registry::{SectionDefinition, SettingDeclaration, SettingKind, Variant};

pub fn definition() -> SectionDefinition {
    SectionDefinition {
        section_type: "footer".to_string(),
        name: "Footer".to_string(),
        variants: vec![
            Variant::new("style-a", "Simple"),
            Variant::new("style-b", "Multi-column"),
        ],
        settings: vec![
            SettingDeclaration::new(
                "copyright_text",
                "Copyright Text",
                SettingKind::Text,
                "© 2024, My Store",
            ),
            SettingDeclaration::new("bg_color", "Background Color", SettingKind::Color, "#111111"),
            SettingDeclaration::new("text_color", "Text Color", SettingKind::Color, "#ffffff"),
        ],
    }
}

pub fn markup(_definition: &SectionDefinition) -> String {
    r#"<footer class="footer-{{ section.id }} footer--{{ section.settings.variant }}">
  <div class="footer-container">
{%- if section.settings.variant == 'style-b' %}
    <div class="footer-columns">
      <div>
        <h4>Shop</h4>
        <ul>
          <li><a href="/collections/all">All products</a></li>
          <li><a href="/search">Search</a></li>
        </ul>
      </div>
      <div>
        <h4>Company</h4>
        <ul>
          <li><a href="/pages/about">About</a></li>
          <li><a href="/pages/contact">Contact</a></li>
        </ul>
      </div>
      <div>
        <h4>Support</h4>
        <ul>
          <li><a href="/policies/shipping-policy">Shipping</a></li>
          <li><a href="/policies/refund-policy">Returns</a></li>
        </ul>
      </div>
    </div>
{%- endif %}
    <p>{{ section.settings.copyright_text }}</p>
  </div>
</footer>
<style>
  .footer-{{ section.id }} {
    background: {{ section.settings.bg_color }};
    color: {{ section.settings.text_color }};
    padding: 40px 20px;
    text-align: center;
  }
  .footer-{{ section.id }} a { color: inherit; }
  .footer-{{ section.id }} ul { list-style: none; margin: 0; padding: 0; }
  .footer-{{ section.id }} .footer-columns {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 24px;
    text-align: left;
    margin-bottom: 32px;
  }
</style>
"#
    .to_string()
}
