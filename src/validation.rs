//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy blocks the export on any error; warnings pass through.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::page::PageModel;
use crate::registry::{SectionRegistry, SettingKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    UnknownSectionType,
    UnknownVariant,
    DuplicateInstanceId,
    InvalidSettingValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub kind: ViolationKind,
    pub severity: ViolationSeverity,
    /// Position of the offending instance in the page.
    pub position: usize,
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_id: Option<String>,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub sections_checked: usize,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// The error reported for a failed export: earliest in page order.
    pub fn first_error(&self) -> Option<&ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .min_by_key(|v| v.position)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Warning)
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, page: &PageModel, registry: &SectionRegistry) -> Vec<ValidationViolation>;
}

/// Outcome of checking one value against its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueCheck {
    Accepted,
    OffStep(String),
    Mismatch(String),
}

pub fn check_setting_value(kind: &SettingKind, value: &Value) -> ValueCheck {
    match kind {
        SettingKind::Text | SettingKind::Textarea | SettingKind::ImagePicker => {
            if value.is_string() {
                ValueCheck::Accepted
            } else {
                ValueCheck::Mismatch("expected a string".into())
            }
        }
        SettingKind::Color => match value.as_str() {
            Some(s) if is_hex_color(s) => ValueCheck::Accepted,
            Some(_) => ValueCheck::Mismatch("expected a hex color such as #1a2b3c".into()),
            None => ValueCheck::Mismatch("expected a color string".into()),
        },
        SettingKind::Number => {
            if value.is_number() {
                ValueCheck::Accepted
            } else {
                ValueCheck::Mismatch("expected a number".into())
            }
        }
        SettingKind::Range { min, max, step, .. } => {
            let Some(n) = value.as_f64() else {
                return ValueCheck::Mismatch("expected a number".into());
            };
            if n < *min || n > *max {
                return ValueCheck::Mismatch(format!("expected a value between {} and {}", min, max));
            }
            let steps = (n - min) / step;
            if (steps - steps.round()).abs() > 1e-9 {
                return ValueCheck::OffStep(format!("{} is not a multiple of step {} from {}", n, step, min));
            }
            ValueCheck::Accepted
        }
        SettingKind::Select { options } => match value.as_str() {
            Some(s) if options.iter().any(|o| o.value == s) => ValueCheck::Accepted,
            _ => {
                let allowed: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
                ValueCheck::Mismatch(format!("expected one of [{}]", allowed.join(", ")))
            }
        },
        SettingKind::Checkbox => {
            if value.is_boolean() {
                ValueCheck::Accepted
            } else {
                ValueCheck::Mismatch("expected true or false".into())
            }
        }
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

// --- Concrete Rules ---

pub struct KnownTypeRule;

impl ValidationRule for KnownTypeRule {
    fn name(&self) -> &'static str { "known_type" }

    fn validate(&self, page: &PageModel, registry: &SectionRegistry) -> Vec<ValidationViolation> {
        page.iter()
            .enumerate()
            .filter(|(_, instance)| registry.lookup(&instance.section_type).is_none())
            .map(|(position, instance)| ValidationViolation {
                rule: self.name().to_string(),
                kind: ViolationKind::UnknownSectionType,
                severity: ViolationSeverity::Error,
                position,
                instance_id: instance.id.clone(),
                setting_id: None,
                message: format!("Unknown section type '{}'", instance.section_type),
                expected: None,
                actual: Some(instance.section_type.clone()),
            })
            .collect()
    }
}

pub struct VariantRule;

impl ValidationRule for VariantRule {
    fn name(&self) -> &'static str { "variant" }

    fn validate(&self, page: &PageModel, registry: &SectionRegistry) -> Vec<ValidationViolation> {
        let mut violations = vec![];

        for (position, instance) in page.iter().enumerate() {
            let Some(definition) = registry.lookup(&instance.section_type) else {
                continue;
            };
            if !definition.has_variant(&instance.variant) {
                let allowed: Vec<_> = definition.variants.iter().map(|v| v.id.as_str()).collect();
                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    kind: ViolationKind::UnknownVariant,
                    severity: ViolationSeverity::Error,
                    position,
                    instance_id: instance.id.clone(),
                    setting_id: None,
                    message: format!("Unknown variant for section type '{}'", definition.section_type),
                    expected: Some(allowed.join(" | ")),
                    actual: Some(instance.variant.clone()),
                });
            }
        }

        violations
    }
}

pub struct UniqueIdRule;

impl ValidationRule for UniqueIdRule {
    fn name(&self) -> &'static str { "unique_id" }

    fn validate(&self, page: &PageModel, _registry: &SectionRegistry) -> Vec<ValidationViolation> {
        let mut seen = HashSet::new();
        let mut violations = vec![];

        for (position, instance) in page.iter().enumerate() {
            if !seen.insert(instance.id.as_str()) {
                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    kind: ViolationKind::DuplicateInstanceId,
                    severity: ViolationSeverity::Error,
                    position,
                    instance_id: instance.id.clone(),
                    setting_id: None,
                    message: "Section id appears more than once on the page".to_string(),
                    expected: None,
                    actual: None,
                });
            }
        }

        violations
    }
}

/// Instance settings keys must equal the declared setting ids.
pub struct SettingKeysRule;

impl ValidationRule for SettingKeysRule {
    fn name(&self) -> &'static str { "setting_keys" }

    fn validate(&self, page: &PageModel, registry: &SectionRegistry) -> Vec<ValidationViolation> {
        let mut violations = vec![];

        for (position, instance) in page.iter().enumerate() {
            let Some(definition) = registry.lookup(&instance.section_type) else {
                continue;
            };

            for declared in &definition.settings {
                if !instance.settings.contains_key(&declared.id) {
                    violations.push(ValidationViolation {
                        rule: self.name().to_string(),
                        kind: ViolationKind::InvalidSettingValue,
                        severity: ViolationSeverity::Error,
                        position,
                        instance_id: instance.id.clone(),
                        setting_id: Some(declared.id.clone()),
                        message: "Declared setting is missing".to_string(),
                        expected: Some(declared.kind.name().to_string()),
                        actual: None,
                    });
                }
            }

            for key in instance.settings.keys() {
                if definition.setting(key).is_none() {
                    violations.push(ValidationViolation {
                        rule: self.name().to_string(),
                        kind: ViolationKind::InvalidSettingValue,
                        severity: ViolationSeverity::Error,
                        position,
                        instance_id: instance.id.clone(),
                        setting_id: Some(key.clone()),
                        message: format!(
                            "Setting is not declared by section type '{}'",
                            definition.section_type
                        ),
                        expected: None,
                        actual: Some(key.clone()),
                    });
                }
            }
        }

        violations
    }
}

pub struct SettingKindRule;

impl ValidationRule for SettingKindRule {
    fn name(&self) -> &'static str { "setting_kind" }

    fn validate(&self, page: &PageModel, registry: &SectionRegistry) -> Vec<ValidationViolation> {
        let mut violations = vec![];

        for (position, instance) in page.iter().enumerate() {
            let Some(definition) = registry.lookup(&instance.section_type) else {
                continue;
            };

            for declared in &definition.settings {
                let Some(value) = instance.settings.get(&declared.id) else {
                    continue;
                };

                let (severity, message) = match check_setting_value(&declared.kind, value) {
                    ValueCheck::Accepted => continue,
                    ValueCheck::OffStep(message) => (ViolationSeverity::Warning, message),
                    ValueCheck::Mismatch(message) => (ViolationSeverity::Error, message),
                };

                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    kind: ViolationKind::InvalidSettingValue,
                    severity,
                    position,
                    instance_id: instance.id.clone(),
                    setting_id: Some(declared.id.clone()),
                    message,
                    expected: Some(declared.kind.name().to_string()),
                    actual: Some(describe(value)),
                });
            }
        }

        violations
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(KnownTypeRule),
                Box::new(VariantRule),
                Box::new(UniqueIdRule),
                Box::new(SettingKeysRule),
                Box::new(SettingKindRule),
            ],
        }
    }

    pub fn validate(&self, page: &PageModel, registry: &SectionRegistry) -> ValidationResult {
        let mut violations = vec![];
        for rule in &self.rules {
            violations.extend(rule.validate(page, registry));
        }
        violations.sort_by_key(|v| v.position);

        ValidationResult {
            valid: !violations.iter().any(|v| v.severity == ViolationSeverity::Error),
            violations,
            sections_checked: page.len(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
