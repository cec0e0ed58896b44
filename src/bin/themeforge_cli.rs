//! ThemeForge CLI - Bridge interface for the builder backend
//!
//! Commands: sections, validate, compile, new-page
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation/compile failure, 1 on usage or IO errors

use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use themeforge_core::{PageModel, SectionRegistry, ThemeCompiler, ThemeConfig};

#[derive(Parser)]
#[command(name = "themeforge-cli")]
#[command(about = "ThemeForge CLI - Section Theme Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of extra section definitions (<type>.json + <type>.liquid)
    #[arg(short, long)]
    sections_dir: Option<PathBuf>,

    /// Theme config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered section types
    Sections,

    /// Validate a page model
    Validate {
        /// Page model JSON file
        #[arg(short, long)]
        page: PathBuf,
    },

    /// Compile a page model into a theme archive
    Compile {
        /// Page model JSON file
        #[arg(short, long)]
        page: PathBuf,

        /// Write the archive here instead of embedding it as base64
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print a page model built from section defaults
    NewPage {
        /// Comma-separated section types, in page order
        #[arg(short, long, value_delimiter = ',')]
        types: Vec<String>,
    },
}

fn fail(message: impl std::fmt::Display) -> ExitCode {
    let output = serde_json::json!({ "success": false, "error": message.to_string() });
    println!("{}", output);
    ExitCode::FAILURE
}

fn load_page(path: &Path) -> Result<PageModel, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read page {}: {}", path.display(), e))?;
    PageModel::from_json(&content).map_err(|e| format!("Invalid page: {}", e))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("themeforge_core=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ThemeConfig::load(path) {
            Ok(c) => c,
            Err(e) => return fail(e),
        },
        None => ThemeConfig::default(),
    };

    let mut registry = SectionRegistry::builtin();
    if let Some(dir) = &cli.sections_dir {
        if let Err(e) = registry.extend_from_dir(dir) {
            return fail(format!("Failed to load sections: {}", e));
        }
    }

    let compiler = ThemeCompiler::with_config(registry.into(), config);

    match cli.command {
        Commands::Sections => {
            let sections: Vec<_> = compiler
                .list_sections()
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "type": d.section_type,
                        "name": d.name,
                        "variants": d.variants,
                        "settings": d.settings.iter().map(|s| &s.id).collect::<Vec<_>>(),
                    })
                })
                .collect();

            println!("{}", serde_json::Value::Array(sections));
            ExitCode::SUCCESS
        }

        Commands::Validate { page } => {
            let page = match load_page(&page) {
                Ok(p) => p,
                Err(e) => return fail(e),
            };

            let result = compiler.validate_page(&page);
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => return fail(e),
            }
            if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Compile { page, out } => {
            let page = match load_page(&page) {
                Ok(p) => p,
                Err(e) => return fail(e),
            };

            let mut stream = match compiler.compile(&page) {
                Ok(s) => s,
                Err(e) => {
                    let output = serde_json::json!({
                        "success": false,
                        "kind": e.kind(),
                        "error": e.to_string(),
                    });
                    println!("{}", output);
                    return ExitCode::from(2); // Compilation failure
                }
            };
            let receipt = stream.receipt().clone();

            let output = match out {
                Some(path) => {
                    let written = File::create(&path).and_then(|mut file| io::copy(&mut stream, &mut file));
                    match written {
                        Ok(bytes) => serde_json::json!({
                            "success": true,
                            "receipt": receipt,
                            "archive_path": path.display().to_string(),
                            "archive_bytes": bytes,
                        }),
                        Err(e) => {
                            let _ = fs::remove_file(&path);
                            return fail(format!("Failed to write archive: {}", e));
                        }
                    }
                }
                None => match stream.into_bytes() {
                    Ok(bytes) => serde_json::json!({
                        "success": true,
                        "receipt": receipt,
                        "archive_base64": base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &bytes),
                    }),
                    Err(e) => return fail(format!("Failed to build archive: {}", e)),
                },
            };

            match serde_json::to_string_pretty(&output) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }

        Commands::NewPage { types } => {
            let mut page = PageModel::new();
            for section_type in &types {
                if page.add_section(compiler.registry(), section_type).is_none() {
                    return fail(format!("Unknown section type '{}'", section_type));
                }
            }

            match serde_json::to_string_pretty(&page) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }
    }
}
