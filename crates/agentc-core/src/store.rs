//! Filesystem persistence for generated artifacts.
//!
//! Layout: `<dir>/<slug>.agent.rs`, one file per agent.
//!
//! Writes go through a temp file in the same directory and a rename. New
//! artifacts get mode `0644` on Unix; rewrites keep the existing file's
//! permissions.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::codegen::{self, artifact_file_name, GeneratedArtifact};
use crate::domain::{AgentSpec, AgentcError, Result};
use crate::obs;
use crate::parser::{parse_artifact, ParsedArtifact};

/// Mode for newly created artifacts.
#[cfg(unix)]
pub const NEW_ARTIFACT_MODE: u32 = 0o644;

// Temp files are created owner-only.
#[cfg(unix)]
fn set_new_artifact_mode(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(NEW_ARTIFACT_MODE))
}

#[cfg(not(unix))]
fn set_new_artifact_mode(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// What to do when a slug's file already holds a differently named agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Fail with [`AgentcError::SlugCollision`].
    #[default]
    Reject,
    /// Replace the other agent's artifact.
    Overwrite,
    /// Write to the first free `<slug>-N`, starting at 2.
    Suffix,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::Overwrite => "overwrite",
            Self::Suffix => "suffix",
        })
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "overwrite" => Ok(Self::Overwrite),
            "suffix" => Ok(Self::Suffix),
            other => Err(format!(
                "unknown collision policy '{other}' (expected reject, overwrite or suffix)"
            )),
        }
    }
}

/// How a write changed the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// New file.
    Created,
    /// Same agent, new content.
    Updated,
    /// Same agent, byte-identical content; the file was not touched.
    Unchanged,
    /// Replaced a different agent's artifact.
    Overwrote,
}

impl WriteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Overwrote => "overwrote",
        }
    }
}

/// Where and how an artifact was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub slug: String,
    pub path: PathBuf,
    pub digest: String,
    pub outcome: WriteOutcome,
}

/// Producer/consumer response shape: `{"success": true, "filename": ...}` or
/// `{"error": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success { success: bool, filename: String },
    Error { error: String, message: String },
}

impl ApiResponse {
    pub fn success(filename: impl Into<String>) -> Self {
        Self::Success {
            success: true,
            filename: filename.into(),
        }
    }

    pub fn error(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Error response for a domain error; `error` is a stable kind.
    pub fn from_error(err: &AgentcError) -> Self {
        let kind = match err {
            AgentcError::Validation(_) => "validation_error",
            AgentcError::Generation(_) => "generation_error",
            AgentcError::SlugCollision { .. } => "slug_collision",
            AgentcError::DuplicateAgent(_) => "duplicate_agent",
            AgentcError::Serialization(_) => "serialization_error",
            AgentcError::Io(_) => "io_error",
        };
        Self::error(kind, err.to_string())
    }
}

/// Artifact directory with a collision policy.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    policy: CollisionPolicy,
}

impl ArtifactStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            policy: CollisionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn artifact_path(&self, slug: &str) -> PathBuf {
        self.dir.join(artifact_file_name(slug))
    }

    /// Name of the agent stored under `slug`, if the file exists.
    fn occupant(&self, slug: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.artifact_path(slug)) {
            Ok(text) => Ok(Some(parse_artifact(&text).spec.name)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Validate, render and persist `spec`.
    ///
    /// Nothing is written when validation or rendering fails. A file holding
    /// the same agent name is an edit of that agent; a file holding another
    /// name is a collision resolved by the store's policy.
    pub fn write(&self, spec: &AgentSpec) -> Result<WrittenArtifact> {
        let rendered = codegen::render(spec)?;

        let (artifact, outcome) = match self.occupant(&rendered.slug)? {
            None => (rendered, WriteOutcome::Created),
            Some(existing) if existing == spec.name => (rendered, WriteOutcome::Updated),
            Some(existing) => match self.policy {
                CollisionPolicy::Reject => {
                    return Err(AgentcError::SlugCollision {
                        slug: rendered.slug,
                        existing,
                        requested: spec.name.clone(),
                    })
                }
                CollisionPolicy::Overwrite => {
                    tracing::warn!(
                        slug = %rendered.slug,
                        existing = %existing,
                        requested = %spec.name,
                        "overwriting artifact of a different agent"
                    );
                    (rendered, WriteOutcome::Overwrote)
                }
                CollisionPolicy::Suffix => self.suffixed(spec, &rendered.slug)?,
            },
        };

        self.persist(artifact, outcome)
    }

    fn suffixed(&self, spec: &AgentSpec, base: &str) -> Result<(GeneratedArtifact, WriteOutcome)> {
        let mut n = 2u32;
        loop {
            let slug = format!("{base}-{n}");
            match self.occupant(&slug)? {
                None => return Ok((codegen::render_as(spec, &slug)?, WriteOutcome::Created)),
                Some(existing) if existing == spec.name => {
                    return Ok((codegen::render_as(spec, &slug)?, WriteOutcome::Updated))
                }
                Some(_) => n += 1,
            }
        }
    }

    fn persist(&self, artifact: GeneratedArtifact, outcome: WriteOutcome) -> Result<WrittenArtifact> {
        let path = self.dir.join(&artifact.file_name);

        let outcome = match outcome {
            WriteOutcome::Updated if fs::read_to_string(&path)? == artifact.source => {
                WriteOutcome::Unchanged
            }
            other => other,
        };

        if outcome != WriteOutcome::Unchanged {
            fs::create_dir_all(&self.dir)?;
            let mut tmp = NamedTempFile::new_in(&self.dir)?;
            tmp.write_all(artifact.source.as_bytes())?;
            match fs::metadata(&path) {
                Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    set_new_artifact_mode(tmp.as_file())?
                }
                Err(e) => return Err(e.into()),
            }
            tmp.persist(&path).map_err(|e| e.error)?;
        }

        obs::emit_artifact_written(&artifact.slug, &path, outcome.as_str());
        Ok(WrittenArtifact {
            slug: artifact.slug,
            path,
            digest: artifact.digest,
            outcome,
        })
    }

    /// Parse the artifact at `path`. Only IO fails; parse problems are
    /// reported in the result.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<ParsedArtifact> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(parse_artifact(&text))
    }

    pub fn read_slug(&self, slug: &str) -> Result<ParsedArtifact> {
        self.read(self.artifact_path(slug))
    }
}
