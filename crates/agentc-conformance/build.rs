//! Build script for agentc-conformance
//!
//! Renders every spec under `specs/` into `OUT_DIR` exactly as `agentc create`
//! would, then writes `artifacts.rs` with one module per artifact.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use agentc_core::{render, AgentSpec};

const SPECS_DIR: &str = "specs";

fn module_name(slug: &str) -> String {
    let name = slug.replace('-', "_");
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("agent_{name}")
    } else {
        name
    }
}

fn spec_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed={SPECS_DIR}");
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    let mut modules = String::new();
    let mut table = String::from("pub const ARTIFACTS: &[CompiledArtifact] = &[\n");

    for path in spec_files(Path::new(SPECS_DIR))? {
        println!("cargo:rerun-if-changed={}", path.display());

        let text = fs::read_to_string(&path)?;
        let spec: AgentSpec = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse spec file {}", path.display()))?;
        let artifact =
            render(&spec).with_context(|| format!("failed to render {}", path.display()))?;
        fs::write(out_dir.join(&artifact.file_name), &artifact.source)?;

        let module = module_name(&artifact.slug);
        let file = &artifact.file_name;
        writeln!(
            modules,
            "pub mod {module} {{\n    \
             include!(concat!(env!(\"OUT_DIR\"), \"/{file}\"));\n\n    \
             pub const SOURCE: &str = include_str!(concat!(env!(\"OUT_DIR\"), \"/{file}\"));\n\
             }}\n"
        )?;
        writeln!(
            table,
            "    CompiledArtifact {{ slug: {module}::SLUG, source: {module}::SOURCE, \
             spec: {module}::spec, register: {module}::register }},"
        )?;
    }

    table.push_str("];\n");
    fs::write(out_dir.join("artifacts.rs"), modules + &table)?;
    Ok(())
}
