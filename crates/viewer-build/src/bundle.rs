//! Single-file artifact assembly.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Args;
use tracing::{debug, info, warn};
use viewer_config::{ConfigOrigin, Configuration};

use crate::{
    Error, Result,
    template::{DocumentParts, render_document},
};

/// Modules bundled when none are named, in dependency order.
pub const DEFAULT_MODULES: &[&str] = &[
    "config-schema.js",
    "transformers.js",
    "kbase-client.js",
    "category-manager.js",
    "table-renderer.js",
];

/// Default stylesheet, relative to the project root.
pub const DEFAULT_STYLESHEET: &str = "css/table-renderer.css";
/// Default module directory, relative to the project root.
pub const DEFAULT_MODULES_DIR: &str = "js";
/// Default embedded configuration, relative to the project root.
pub const DEFAULT_CONFIG: &str = "configs/genome-data.config.json";
/// Default output document, relative to the project root.
pub const DEFAULT_OUTPUT: &str = "viewer.html";
/// Default document title.
pub const DEFAULT_TITLE: &str = "GenomeData Table Viewer";
/// Default document description.
pub const DEFAULT_DESCRIPTION: &str = "Research-grade viewer for GenomeData tables.";
/// Default engine class name.
pub const DEFAULT_ENGINE: &str = "TableRenderer";

/// Arguments for `viewer-build build`.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Project root; every other path is relative to it.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Stylesheet inlined into the document.
    #[arg(long, default_value = DEFAULT_STYLESHEET)]
    pub stylesheet: PathBuf,
    /// Directory holding the script modules.
    #[arg(long, default_value = DEFAULT_MODULES_DIR)]
    pub modules_dir: PathBuf,
    /// Module to bundle, repeatable, in load order (default: the standard set).
    #[arg(long = "module", value_name = "NAME")]
    pub modules: Vec<String>,
    /// Configuration embedded as the default.
    #[arg(long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
    /// Output document.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    /// Document title.
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,
    /// Document description.
    #[arg(long, default_value = DEFAULT_DESCRIPTION)]
    pub description: String,
    /// Global name of the rendering engine class defined by the modules.
    #[arg(long, default_value = DEFAULT_ENGINE)]
    pub engine: String,
}

/// Fully resolved inputs for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Stylesheet path.
    pub stylesheet: PathBuf,
    /// Module directory.
    pub modules_dir: PathBuf,
    /// Module file names, in load order.
    pub modules: Vec<String>,
    /// Default configuration path.
    pub config: PathBuf,
    /// Output path.
    pub output: PathBuf,
    /// Document title.
    pub title: String,
    /// Document description.
    pub description: String,
    /// Engine class name.
    pub engine: String,
}

impl BuildPlan {
    /// Resolve CLI arguments against `--root`.
    pub fn from_args(args: &BuildArgs) -> Self {
        let root = &args.root;
        let modules = if args.modules.is_empty() {
            DEFAULT_MODULES.iter().map(|m| (*m).to_string()).collect()
        } else {
            args.modules.clone()
        };
        Self {
            stylesheet: root.join(&args.stylesheet),
            modules_dir: root.join(&args.modules_dir),
            modules,
            config: root.join(&args.config),
            output: root.join(&args.output),
            title: args.title.clone(),
            description: args.description.clone(),
            engine: args.engine.clone(),
        }
    }

    /// A plan using the standard layout under `root`.
    pub fn standard(root: &Path) -> Self {
        Self {
            stylesheet: root.join(DEFAULT_STYLESHEET),
            modules_dir: root.join(DEFAULT_MODULES_DIR),
            modules: DEFAULT_MODULES.iter().map(|m| (*m).to_string()).collect(),
            config: root.join(DEFAULT_CONFIG),
            output: root.join(DEFAULT_OUTPUT),
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

/// An assembled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Where the document is (or would be) written.
    pub output: PathBuf,
    /// The complete document.
    pub html: String,
    /// Bundled module names, in order.
    pub modules: Vec<String>,
}

impl Artifact {
    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.html.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Run `viewer-build build`.
pub fn build_cmd(args: &BuildArgs) -> Result<()> {
    let plan = BuildPlan::from_args(args);
    println!("==> Building {}", plan.output.display());
    let artifact = build(&plan)?;
    println!("    Stylesheet: {}", plan.stylesheet.display());
    println!("    Modules:    {}", artifact.modules.join(", "));
    println!("    Config:     {}", plan.config.display());
    println!(
        "==> Wrote {} ({} bytes)",
        artifact.output.display(),
        artifact.len()
    );
    Ok(())
}

/// Assemble the document in memory. Nothing is written.
pub fn assemble(plan: &BuildPlan) -> Result<Artifact> {
    if !is_script_identifier(&plan.engine) {
        return Err(Error::InvalidEngineName {
            name: plan.engine.clone(),
        });
    }
    let stylesheet = read_text(&plan.stylesheet)?;
    let modules = bundle_modules(&plan.modules_dir, &plan.modules)?;
    let default_config = validate_default_config(&plan.config)?;
    let html = render_document(&DocumentParts {
        title: &plan.title,
        description: &plan.description,
        stylesheet: &stylesheet,
        modules: &modules,
        default_config: &default_config,
        engine: &plan.engine,
    });
    debug!(bytes = html.len(), "document_rendered");
    Ok(Artifact {
        output: plan.output.clone(),
        html,
        modules: plan.modules.clone(),
    })
}

/// Assemble, then replace the output file.
pub fn build(plan: &BuildPlan) -> Result<Artifact> {
    let artifact = assemble(plan)?;
    write_atomic(&artifact.output, &artifact.html)?;
    info!(
        output = %artifact.output.display(),
        bytes = artifact.len(),
        "artifact_written"
    );
    Ok(artifact)
}

/// Concatenate `names` from `dir`, each preceded by a provenance marker.
pub fn bundle_modules(dir: &Path, names: &[String]) -> Result<String> {
    if names.is_empty() {
        return Err(Error::NoModules);
    }
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(Error::DuplicateModule { name: name.clone() });
        }
    }

    let mut out = String::new();
    for name in names {
        let content = read_text(&dir.join(name))?;
        debug!(module = %name, bytes = content.len(), "module_bundled");
        out.push_str("\n/* --- ");
        out.push_str(name);
        out.push_str(" --- */\n");
        out.push_str(&content);
        out.push('\n');
    }
    Ok(out)
}

/// Read and validate the default configuration, returning its text.
pub fn validate_default_config(path: &Path) -> Result<String> {
    let config =
        Configuration::from_path(ConfigOrigin::Embedded, path).map_err(|source| {
            Error::InvalidConfig {
                path: path.to_path_buf(),
                source,
            }
        })?;
    if config.is_null() {
        return Err(Error::NullConfig {
            path: path.to_path_buf(),
        });
    }
    Ok(config.raw().to_string())
}

/// Read a UTF-8 file.
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| Error::Utf8 {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` to a temporary sibling of `path`, then rename it into place.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| Error::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "viewer.html".to_string());
    let temp = parent.join(format!(".{file_name}.tmp-{}", process::id()));
    fs::write(&temp, contents).map_err(|source| Error::Io {
        path: temp.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&temp, path) {
        if let Err(e) = fs::remove_file(&temp) {
            warn!(path = %temp.display(), error = %e, "temp_cleanup_failed");
        }
        return Err(Error::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Whether `name` can be referenced as a bare script identifier.
fn is_script_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let head = first.is_ascii_alphabetic() || first == '_' || first == '$';
    head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    /// Wrapper so `BuildArgs` can be parsed on its own.
    #[derive(Debug, Parser)]
    struct Cli {
        /// Arguments under test.
        #[command(flatten)]
        args: BuildArgs,
    }

    #[test]
    fn engine_names() {
        assert!(is_script_identifier("TableRenderer"));
        assert!(is_script_identifier("$_v2"));
        assert!(!is_script_identifier(""));
        assert!(!is_script_identifier("2d"));
        assert!(!is_script_identifier("window.alert(1)"));
    }

    #[test]
    fn args_resolve_against_root() {
        let cli = Cli::parse_from(["build", "--root", "/srv/viewer"]);
        let plan = BuildPlan::from_args(&cli.args);
        assert_eq!(plan, BuildPlan::standard(Path::new("/srv/viewer")));
        assert_eq!(plan.modules.len(), DEFAULT_MODULES.len());
    }

    #[test]
    fn duplicates_rejected_before_reading() {
        let names = vec!["a.js".to_string(), "b.js".to_string(), "a.js".to_string()];
        let err = bundle_modules(Path::new("/nonexistent"), &names).unwrap_err();
        assert!(matches!(err, Error::DuplicateModule { ref name } if name == "a.js"));
        assert!(matches!(
            bundle_modules(Path::new("."), &[]),
            Err(Error::NoModules)
        ));
    }
}
