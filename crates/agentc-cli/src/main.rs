//! agentc - Agent Definition Compiler & Runtime CLI
//!
//! ## Commands
//!
//! - `create`: Render an agent spec into `<slug>.agent.rs`
//! - `list`: List artifacts in the registry directory
//! - `show`: Parse an artifact back into its spec
//! - `run`: Execute an agent with positional arguments
//! - `exec`: Run one command through the sandbox

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, Level};

use agentc_core::sandbox::denylist;
use agentc_core::{
    slugify, AgentRegistry, AgentSpec, AgentcError, ApiResponse, ArtifactStore, CollisionPolicy,
    CommandSandbox, DigestStatus, ExecOptions, FieldSpec, FieldType, RuntimeConfig,
    SandboxConfig, Schema, ToolBinding, ValidationError, ARTIFACT_SUFFIX,
};

const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;

#[derive(Parser)]
#[command(name = "agentc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Agent definition compiler and runtime", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output and JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding `<slug>.agent.rs` artifacts
    #[arg(long, global = true, env = "AGENTC_REGISTRY_DIR", default_value = "agents")]
    registry_dir: PathBuf,

    /// Wall-clock limit for sandboxed commands (milliseconds)
    #[arg(long, global = true, env = "AGENTC_TIMEOUT_MS", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Fail on unparsable number arguments instead of substituting 0
    #[arg(long, global = true, env = "AGENTC_STRICT_NUMBERS")]
    strict_numbers: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an agent artifact
    Create(CreateArgs),

    /// List generated agents
    List,

    /// Print the spec recovered from an artifact
    Show {
        /// Agent slug (file stem without `.agent.rs`)
        slug: String,
    },

    /// Execute an agent
    Run {
        /// Agent slug or display name
        agent: String,

        /// Positional arguments, matched to input fields in order
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a single command through the sandbox
    Exec {
        /// Working directory for the command
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Skip the destructive-command denylist
        #[arg(long)]
        allow_unsafe: bool,

        /// Command and arguments, after `--`
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
}

#[derive(Args)]
struct CreateArgs {
    /// Agent display name
    #[arg(required_unless_present = "from_json")]
    name: Option<String>,

    /// What the agent does
    #[arg(required_unless_present = "from_json")]
    description: Option<String>,

    /// Tool ids the agent may use
    tools: Vec<String>,

    /// Input field as `name:type[!][:description]`; `!` marks it required
    #[arg(long = "input", value_name = "FIELD")]
    inputs: Vec<String>,

    /// Output field as `name:type[!][:description]`
    #[arg(long = "output", value_name = "FIELD")]
    outputs: Vec<String>,

    /// System prompt text
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the system prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Agent version
    #[arg(long = "version", default_value = "1.0.0")]
    agent_version: String,

    /// What to do when the slug belongs to a different agent
    #[arg(long, default_value_t = CollisionPolicy::Reject)]
    on_collision: CollisionPolicy,

    /// Read a complete AgentSpec from a JSON file instead
    #[arg(long, conflicts_with_all = ["name", "description", "tools", "inputs", "outputs", "prompt", "prompt_file"])]
    from_json: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    agentc_core::init_tracing(cli.json, level);

    let sandbox = CommandSandbox::new(SandboxConfig {
        timeout_ms: cli.timeout_ms,
        allow_unsafe: false,
    });
    let config = RuntimeConfig {
        strict_numbers: cli.strict_numbers,
    };

    let status = match cli.command {
        Commands::Create(args) => {
            let store = ArtifactStore::new(&cli.registry_dir).with_policy(args.on_collision);
            cmd_create(&store, &args, cli.json)
        }
        Commands::List => cmd_list(&cli.registry_dir, cli.json),
        Commands::Show { slug } => cmd_show(&ArtifactStore::new(&cli.registry_dir), &slug, cli.json),
        Commands::Run { agent, args } => {
            let store = ArtifactStore::new(&cli.registry_dir);
            let registry = AgentRegistry::new().with_sandbox(sandbox).with_config(config);
            cmd_run(&store, registry, &agent, args).await
        }
        Commands::Exec {
            cwd,
            allow_unsafe,
            command,
        } => cmd_exec(&sandbox, cwd, allow_unsafe, command, cli.json).await,
    }?;

    Ok(ExitCode::from(status))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse `name:type[!][:description]`.
fn parse_field(raw: &str) -> Result<(String, FieldSpec)> {
    let (name, rest) = raw
        .split_once(':')
        .with_context(|| format!("field '{raw}' must look like name:type"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyField {
            field: "field name".to_string(),
        }
        .into());
    }

    let (kind, description) = rest.split_once(':').unwrap_or((rest, ""));
    let (kind, required) = match kind.trim().strip_suffix('!') {
        Some(kind) => (kind, true),
        None => (kind, false),
    };
    let field_type: FieldType = kind.parse()?;

    Ok((name.to_string(), FieldSpec::new(field_type, required, description.trim())))
}

fn parse_schema(label: &str, raw: &[String]) -> Result<Schema> {
    let mut schema = Schema::new();
    for entry in raw {
        let (name, field) = parse_field(entry)?;
        if schema.contains(&name) {
            return Err(ValidationError::DuplicateField {
                schema: label.to_string(),
                field: name,
            }
            .into());
        }
        schema.insert(name, field);
    }
    Ok(schema)
}

/// Assemble the spec described by `create` arguments.
fn build_spec(args: &CreateArgs) -> Result<AgentSpec> {
    if let Some(path) = &args.from_json {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read spec file {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("failed to parse spec file {}", path.display()));
    }

    let (Some(name), Some(description)) = (&args.name, &args.description) else {
        bail!("name and description are required");
    };

    let system_prompt = match (&args.prompt, &args.prompt_file) {
        (Some(prompt), _) => prompt.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt file {}", path.display()))?,
        (None, None) => format!("You are {name}. {description}"),
    };

    let mut spec = AgentSpec::new(name, description, &args.agent_version).with_prompt(system_prompt);
    for id in &args.tools {
        spec = spec.with_tool(ToolBinding::from_id(id));
    }
    spec.input_schema = parse_schema("input_schema", &args.inputs)?;
    spec.output_schema = parse_schema("output_schema", &args.outputs)?;
    Ok(spec)
}

fn cmd_create(store: &ArtifactStore, args: &CreateArgs, json: bool) -> Result<u8> {
    let spec = match build_spec(args) {
        Ok(spec) => spec,
        Err(e) if json => {
            print_json(&ApiResponse::error("invalid_request", format!("{e:#}")))?;
            return Ok(EXIT_FAILED);
        }
        Err(e) => return Err(e),
    };

    match store.write(&spec) {
        Ok(written) => {
            let file_name = written
                .path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();
            if json {
                print_json(&ApiResponse::success(file_name))?;
            } else {
                println!("{} {} ({})", written.outcome.as_str(), written.path.display(), written.slug);
                println!("Digest: {}", written.digest);
            }
            Ok(EXIT_OK)
        }
        Err(e) if json => {
            print_json(&ApiResponse::from_error(&e))?;
            Ok(EXIT_FAILED)
        }
        Err(e) => Err(e).with_context(|| format!("failed to create agent '{}'", spec.name)),
    }
}

#[derive(Debug, Serialize)]
struct ListedAgent {
    slug: String,
    name: String,
    version: String,
    digest: DigestStatus,
    issues: usize,
}

/// Parse every artifact in `dir`, sorted by slug. A missing directory is empty.
fn scan_registry(dir: &Path) -> Result<Vec<ListedAgent>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", dir.display())),
    };

    let store = ArtifactStore::new(dir);
    let mut agents = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(slug) = path
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(|f| f.strip_suffix(ARTIFACT_SUFFIX))
        else {
            continue;
        };
        let parsed = store.read(&path)?;
        agents.push(ListedAgent {
            slug: slug.to_string(),
            name: parsed.spec.name,
            version: parsed.spec.version,
            digest: parsed.digest,
            issues: parsed.issues.len(),
        });
    }
    agents.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(agents)
}

fn cmd_list(dir: &Path, json: bool) -> Result<u8> {
    let agents = scan_registry(dir)?;
    if json {
        print_json(&agents)?;
    } else if agents.is_empty() {
        println!("No agents in {}", dir.display());
    } else {
        for agent in &agents {
            let marker = match agent.digest {
                DigestStatus::Matches => "",
                DigestStatus::Edited => " (edited)",
                DigestStatus::Missing => " (no digest)",
            };
            println!("{:<24} {:<24} {}{}", agent.slug, agent.name, agent.version, marker);
        }
    }
    Ok(EXIT_OK)
}

fn cmd_show(store: &ArtifactStore, slug: &str, json: bool) -> Result<u8> {
    let parsed = store
        .read_slug(slug)
        .with_context(|| format!("failed to read agent '{slug}'"))?;

    if json {
        print_json(&parsed)?;
    } else {
        for issue in &parsed.issues {
            eprintln!("warning: {}: {}", issue.field, issue.message);
        }
        print_json(&parsed.spec)?;
    }
    Ok(EXIT_OK)
}

/// Artifact slug for `agent`, which may be a slug or a display name.
fn artifact_slug(store: &ArtifactStore, agent: &str) -> String {
    if store.artifact_path(agent).exists() {
        agent.to_string()
    } else {
        slugify(agent)
    }
}

async fn cmd_run(
    store: &ArtifactStore,
    mut registry: AgentRegistry,
    agent: &str,
    args: Vec<String>,
) -> Result<u8> {
    let slug = artifact_slug(store, agent);
    match store.read_slug(&slug) {
        Ok(parsed) => {
            if parsed.digest == DigestStatus::Edited {
                info!(slug = %slug, "artifact was edited by hand since generation");
            }
            registry.register_loaded(&slug, parsed.spec)?;
        }
        Err(AgentcError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(slug = %slug, "no artifact on disk");
        }
        Err(e) => return Err(e).with_context(|| format!("failed to load agent '{slug}'")),
    }

    let result = registry.invoke(&slug, args).await;
    print_json(&result)?;
    Ok(if result.is_success() {
        EXIT_OK
    } else {
        EXIT_FAILED
    })
}

async fn cmd_exec(
    sandbox: &CommandSandbox,
    cwd: Option<PathBuf>,
    allow_unsafe: bool,
    command: Vec<String>,
    json: bool,
) -> Result<u8> {
    let Some((program, args)) = command.split_first() else {
        bail!("no command given");
    };

    let mut options = ExecOptions {
        cwd,
        ..ExecOptions::default()
    };
    if allow_unsafe {
        if let Some(pattern) = denylist::matched(program) {
            info!(command = %program, pattern = %pattern, "denylist bypassed");
        }
        options = options.allow_unsafe();
    }

    let record = sandbox.execute(program, args, options).await;

    if json {
        print_json(&record)?;
    } else {
        print!("{}", record.stdout);
        eprint!("{}", record.stderr);
    }

    Ok(match record.exit_code {
        0 => EXIT_OK,
        code => u8::try_from(code).unwrap_or(EXIT_FAILED),
    })
}
