//! Page Model
//!
//! The ordered list of section instances an editor session hands to the
//! compiler. Order is document order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::registry::SectionRegistry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub section_type: String,
    pub variant: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PageModel {
    sections: Vec<SectionInstance>,
}

/// Accepted request bodies: a bare array or `{ "sections": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageBody {
    Bare(Vec<SectionInstance>),
    Wrapped { sections: Vec<SectionInstance> },
}

impl PageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let sections = match serde_json::from_str::<PageBody>(json)? {
            PageBody::Bare(sections) | PageBody::Wrapped { sections } => sections,
        };
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[SectionInstance] {
        &self.sections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionInstance> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SectionInstance> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn push(&mut self, instance: SectionInstance) {
        self.sections.push(instance);
    }

    /// Append a new instance of `section_type` populated from its defaults.
    pub fn add_section(
        &mut self,
        registry: &SectionRegistry,
        section_type: &str,
    ) -> Option<&SectionInstance> {
        let instance = registry.instantiate(section_type, new_section_id())?;
        self.sections.push(instance);
        self.sections.last()
    }

    pub fn remove_section(&mut self, id: &str) -> Option<SectionInstance> {
        let index = self.sections.iter().position(|s| s.id == id)?;
        Some(self.sections.remove(index))
    }

    /// Merge `updates` into the instance's settings. Returns false if no such id.
    pub fn update_settings(&mut self, id: &str, updates: Map<String, Value>) -> bool {
        match self.sections.iter_mut().find(|s| s.id == id) {
            Some(instance) => {
                instance.settings.extend(updates);
                true
            }
            None => false,
        }
    }

    pub fn set_variant(&mut self, id: &str, variant: &str) -> bool {
        match self.sections.iter_mut().find(|s| s.id == id) {
            Some(instance) => {
                instance.variant = variant.to_string();
                true
            }
            None => false,
        }
    }

    /// Move the instance at `from` so it ends up at index `to`.
    pub fn move_section(&mut self, from: usize, to: usize) -> bool {
        if from >= self.sections.len() || to >= self.sections.len() {
            return false;
        }
        let instance = self.sections.remove(from);
        self.sections.insert(to, instance);
        true
    }
}

impl From<Vec<SectionInstance>> for PageModel {
    fn from(sections: Vec<SectionInstance>) -> Self {
        Self { sections }
    }
}

impl<'a> IntoIterator for &'a PageModel {
    type Item = &'a SectionInstance;
    type IntoIter = std::slice::Iter<'a, SectionInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

/// Editor-style instance id: `sec_` plus nine random hex digits.
pub fn new_section_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("sec_{}", &uuid[..9])
}
