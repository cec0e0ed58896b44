//! Compilation Pipeline - Single Entry Point
//!
//! CRITICAL: every export MUST validate the page first. No bypass.
//! Nothing is packaged until validation, the manifest, and every template
//! have succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ThemeConfig;
use crate::emitter::emit;
use crate::hashing::compute_page_hash;
use crate::manifest::build_manifest;
use crate::package::{
    pack, section_path, CompiledArtifact, PackageError, LAYOUT_PATH, MANIFEST_PATH,
    SETTINGS_SCHEMA_PATH,
};
use crate::page::PageModel;
use crate::registry::{SectionDefinition, SectionRegistry};
use crate::stream::ThemeStream;
use crate::theme::THEME_LAYOUT;
use crate::validation::{ValidationResult, ValidationViolation, Validator, ViolationKind};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Unknown section type '{section_type}' (section {instance_id})")]
    UnknownSectionType {
        instance_id: String,
        section_type: String,
    },

    #[error("Unknown variant '{variant}' (section {instance_id})")]
    UnknownVariant { instance_id: String, variant: String },

    #[error("Duplicate section id '{instance_id}'")]
    DuplicateInstanceId { instance_id: String },

    #[error("Invalid value for setting '{setting_id}' (section {instance_id}): {reason}")]
    InvalidSettingValue {
        instance_id: String,
        setting_id: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Packaging error: {0}")]
    Package(#[from] PackageError),

    #[error("Failed to start packaging: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Short machine-readable kind, used in error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownSectionType { .. } => "unknown_section_type",
            Self::UnknownVariant { .. } => "unknown_variant",
            Self::DuplicateInstanceId { .. } => "duplicate_instance_id",
            Self::InvalidSettingValue { .. } => "invalid_setting_value",
            Self::Serialization(_) => "serialization",
            Self::Package(_) | Self::Io(_) => "package",
        }
    }
}

impl From<&ValidationViolation> for CompileError {
    fn from(violation: &ValidationViolation) -> Self {
        let instance_id = violation.instance_id.clone();
        match violation.kind {
            ViolationKind::UnknownSectionType => Self::UnknownSectionType {
                instance_id,
                section_type: violation.actual.clone().unwrap_or_default(),
            },
            ViolationKind::UnknownVariant => Self::UnknownVariant {
                instance_id,
                variant: violation.actual.clone().unwrap_or_default(),
            },
            ViolationKind::DuplicateInstanceId => Self::DuplicateInstanceId { instance_id },
            ViolationKind::InvalidSettingValue => Self::InvalidSettingValue {
                instance_id,
                setting_id: violation.setting_id.clone().unwrap_or_default(),
                reason: violation.message.clone(),
            },
        }
    }
}

/// Audit record for one export. Never written into the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub export_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub page_hash: String,
    pub section_count: usize,
    pub templates: Vec<String>,
    pub warnings: usize,
}

/// A fully packed export held in memory.
#[derive(Debug, Clone)]
pub struct ThemeExport {
    pub receipt: ExportReceipt,
    pub archive: Vec<u8>,
}

/// The compilation pipeline - single entry point for all exports
pub struct ThemeCompiler {
    registry: Arc<SectionRegistry>,
    validator: Validator,
    config: ThemeConfig,
}

impl ThemeCompiler {
    pub fn new(registry: SectionRegistry) -> Self {
        Self::with_config(Arc::new(registry), ThemeConfig::default())
    }

    pub fn with_config(registry: Arc<SectionRegistry>, config: ThemeConfig) -> Self {
        Self {
            registry,
            validator: Validator::new(),
            config,
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    /// List all registered section types
    pub fn list_sections(&self) -> Vec<&SectionDefinition> {
        self.registry.list()
    }

    /// Validate a page against the registry
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_page(&self, page: &PageModel) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(page, &self.registry)
    }

    /// Build every archive entry for `page` in memory.
    ///
    /// CRITICAL: This ALWAYS calls validate_page first.
    pub fn compile_artifact(&self, page: &PageModel) -> Result<CompiledArtifact, CompileError> {
        self.prepare(page).map(|(artifact, _)| artifact)
    }

    /// Compile and pack into memory.
    pub fn export(&self, page: &PageModel) -> Result<ThemeExport, CompileError> {
        let (artifact, receipt) = self.prepare(page)?;
        let archive = pack(&artifact)?;
        info!(export_id = %receipt.export_id, bytes = archive.len(), "theme export packed");
        Ok(ThemeExport { receipt, archive })
    }

    /// Compile and stream. Every compile error surfaces here, before the
    /// first archive byte exists.
    pub fn compile(&self, page: &PageModel) -> Result<ThemeStream, CompileError> {
        let (artifact, receipt) = self.prepare(page)?;
        Ok(ThemeStream::spawn(artifact, receipt, &self.config.stream)?)
    }

    fn prepare(&self, page: &PageModel) -> Result<(CompiledArtifact, ExportReceipt), CompileError> {
        let export_id = Uuid::new_v4();
        info!(%export_id, sections = page.len(), "starting theme export");

        // MANDATORY: Validation is always called. This is non-negotiable.
        let validation = self.validate_page(page);
        for warning in validation.warnings() {
            warn!(
                %export_id,
                section = %warning.instance_id,
                setting = warning.setting_id.as_deref().unwrap_or(""),
                "{}",
                warning.message
            );
        }
        if let Some(error) = validation.first_error() {
            let err = CompileError::from(error);
            warn!(%export_id, kind = err.kind(), "theme export rejected: {}", err);
            return Err(err);
        }

        let (manifest, distinct_types) = build_manifest(page, &self.registry)?;

        let mut artifact = CompiledArtifact::new();
        artifact.insert(LAYOUT_PATH, THEME_LAYOUT);
        artifact.insert(MANIFEST_PATH, serde_json::to_string_pretty(&manifest)?);

        let mut templates = Vec::with_capacity(distinct_types.len());
        for section_type in &distinct_types {
            let section = self.registry.entry(section_type).ok_or_else(|| {
                CompileError::UnknownSectionType {
                    instance_id: String::new(),
                    section_type: section_type.clone(),
                }
            })?;
            let path = section_path(section_type);
            artifact.insert(path.clone(), emit(section)?);
            debug!(%export_id, path = %path, "emitted section template");
            templates.push(path);
        }

        artifact.insert(SETTINGS_SCHEMA_PATH, self.config.theme.settings_schema()?);

        let receipt = ExportReceipt {
            export_id,
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            page_hash: compute_page_hash(page, ENGINE_VERSION)?,
            section_count: page.len(),
            templates,
            warnings: validation.warnings().count(),
        };

        Ok((artifact, receipt))
    }
}

impl Default for ThemeCompiler {
    fn default() -> Self {
        Self::new(SectionRegistry::builtin())
    }
}
