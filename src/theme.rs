//! Theme-level files: the base layout and the global settings schema.

use serde::{Deserialize, Serialize};

/// Base layout every storefront template renders into.
pub const THEME_LAYOUT: &str = r#"<!doctype html>
<html class="no-js" lang="{{ request.locale.iso_code }}">
  <head>
    <meta charset="utf-8">
    <meta http-equiv="X-UA-Compatible" content="IE=edge">
    <meta name="viewport" content="width=device-width,initial-scale=1">
    <title>{{ page_title }}</title>
    {{ content_for_header }}
    <style>
      body { margin: 0; font-family: sans-serif; }
      * { box-sizing: border-box; }
    </style>
  </head>
  <body>
    {{ content_for_layout }}
  </body>
</html>
"#;

/// Static theme metadata written to `config/settings_schema.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeInfo {
    pub name: String,
    pub version: semver::Version,
    pub author: String,
    pub documentation_url: String,
    pub support_url: String,
}

impl Default for ThemeInfo {
    fn default() -> Self {
        Self {
            name: "Shopify Builder Theme".to_string(),
            version: semver::Version::new(1, 0, 0),
            author: "AI Builder".to_string(),
            documentation_url: "https://example.com".to_string(),
            support_url: "https://example.com".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ThemeInfoBlock<'a> {
    name: &'static str,
    theme_name: &'a str,
    theme_version: String,
    theme_author: &'a str,
    theme_documentation_url: &'a str,
    theme_support_url: &'a str,
}

impl ThemeInfo {
    /// The one-element settings schema array holding the `theme_info` block.
    pub fn settings_schema(&self) -> Result<String, serde_json::Error> {
        let block = ThemeInfoBlock {
            name: "theme_info",
            theme_name: &self.name,
            theme_version: self.version.to_string(),
            theme_author: &self.author,
            theme_documentation_url: &self.documentation_url,
            theme_support_url: &self.support_url,
        };
        serde_json::to_string_pretty(&[block])
    }
}
