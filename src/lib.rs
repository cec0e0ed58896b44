//! ThemeForge Core - Section Theme Compiler
//!
//! # The Five Laws (Non-Negotiable)
//! 1. The Registry Is Truth
//! 2. Templates Are Type-Level, Values Live In The Manifest
//! 3. Validation Is Eager And Whole
//! 4. Deterministic Output
//! 5. No Partial Themes

pub mod config;
pub mod emitter;
pub mod hashing;
pub mod manifest;
pub mod package;
pub mod page;
pub mod pipeline;
pub mod registry;
pub mod schema;
pub mod sections;
pub mod stream;
pub mod theme;
pub mod validation;

pub use config::{ConfigError, ThemeConfig};
pub use emitter::{MarkupEmitter, StaticMarkup, TemplateText};
pub use hashing::{canonical_json, compute_page_hash, sha256_hex};
pub use manifest::{build_manifest, Manifest, ManifestEntry};
pub use package::{CompiledArtifact, PackageError};
pub use page::{PageModel, SectionInstance};
pub use pipeline::{CompileError, ExportReceipt, ThemeCompiler, ThemeExport};
pub use registry::{
    RegistryError, SectionDefinition, SectionRegistry, SettingDeclaration, SettingKind,
};
pub use schema::{translate, SchemaField, SectionSchema};
pub use stream::{PackOutcome, StreamConfig, ThemeStream};
pub use theme::ThemeInfo;
pub use validation::{ValidationResult, ValidationViolation, ViolationKind, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
