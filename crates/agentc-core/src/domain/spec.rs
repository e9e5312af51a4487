//! Agent specification model: the shapes every other module operates on.

use std::fmt;
use std::str::FromStr;

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ValidationError;

/// Declared type of an input or output field.
///
/// Types outside the five known kinds survive as [`FieldType::Other`] so a
/// hand-edited artifact still decodes; at runtime they coerce like strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Other(name) => name,
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse used for user input: only the five known kinds are accepted.
impl FromStr for FieldType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_name(&s.trim().to_ascii_lowercase()) {
            Self::Other(_) => Err(ValidationError::InvalidFieldType {
                value: s.to_string(),
            }),
            known => Ok(known),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// One field of an input or output schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl FieldSpec {
    pub fn new(field_type: FieldType, required: bool, description: impl Into<String>) -> Self {
        Self {
            field_type,
            required,
            description: description.into(),
        }
    }

    pub fn required(field_type: FieldType) -> Self {
        Self::new(field_type, true, "")
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self::new(field_type, false, "")
    }
}

/// Ordered mapping from field name to [`FieldSpec`].
///
/// Insertion order is significant: positional arguments are matched against
/// fields in this order. Order survives JSON serialization in both directions,
/// and duplicate keys are rejected when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. An existing field with the same name is replaced in
    /// place and returned.
    pub fn insert(&mut self, name: impl Into<String>, field: FieldSpec) -> Option<FieldSpec> {
        let name = name.into();
        if let Some((_, slot)) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(slot, field));
        }
        self.fields.push((name, field));
        None
    }

    /// Builder form of [`Schema::insert`].
    pub fn with_field(mut self, name: impl Into<String>, field: FieldSpec) -> Self {
        self.insert(name, field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, field) in &self.fields {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

struct SchemaVisitor;

impl<'de> Visitor<'de> for SchemaVisitor {
    type Value = Schema;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to field specs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
        let mut schema = Schema::new();
        while let Some((name, field)) = access.next_entry::<String, FieldSpec>()? {
            if schema.contains(&name) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate field '{name}'"
                )));
            }
            schema.fields.push((name, field));
        }
        Ok(schema)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SchemaVisitor)
    }
}

/// A tool an agent may call. Opaque to the compiler beyond its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolBinding {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub category: String,
}

impl ToolBinding {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            category: category.into(),
        }
    }

    /// A binding known only by id; display name mirrors the id.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            category: String::new(),
        }
    }
}

/// Structured description of an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub tools: Vec<ToolBinding>,
    #[serde(default)]
    pub input_schema: Schema,
    #[serde(default)]
    pub output_schema: Schema,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_tool(mut self, tool: ToolBinding) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, field: FieldSpec) -> Self {
        self.input_schema.insert(name, field);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, field: FieldSpec) -> Self {
        self.output_schema.insert(name, field);
        self
    }

    pub fn has_tool(&self, id: &str) -> bool {
        self.tools.iter().any(|t| t.id == id)
    }

    /// Check the invariants a spec must hold before it can be rendered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("version", &self.version),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField {
                    field: field.to_string(),
                });
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.tools.len());
        for tool in &self.tools {
            if tool.id.trim().is_empty() {
                return Err(ValidationError::EmptyField {
                    field: "tool id".to_string(),
                });
            }
            if seen.contains(&tool.id.as_str()) {
                return Err(ValidationError::DuplicateTool {
                    id: tool.id.clone(),
                });
            }
            seen.push(&tool.id);
        }

        Ok(())
    }
}

/// Literal values embedded by generated artifacts.
///
/// Generated code builds its spec through [`AgentSpec::from_artifact`] so the
/// same labels the parser searches for are also what the compiler checks.
/// `tools` and both schemas hold JSON text.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactLiterals<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub version: &'a str,
    pub system_prompt: &'a str,
    pub tools: &'a str,
    pub input_schema: &'a str,
    pub output_schema: &'a str,
}

fn decode_literal<T: DeserializeOwned>(agent: &str, field: &str, text: &str) -> Option<T> {
    serde_json::from_str(text)
        .map_err(|e| {
            tracing::warn!(error = %e, agent, field, "artifact literal is malformed");
        })
        .ok()
}

impl AgentSpec {
    /// Build a spec from generated-artifact literals. Literal groups that fail
    /// to decode fall back to empty values.
    pub fn from_artifact(literals: ArtifactLiterals<'_>) -> Self {
        let agent = literals.name;
        let tools = decode_literal(agent, "tools", literals.tools).unwrap_or_default();
        let input_schema =
            decode_literal(agent, "input_schema", literals.input_schema).unwrap_or_default();
        let output_schema =
            decode_literal(agent, "output_schema", literals.output_schema).unwrap_or_default();

        Self {
            name: literals.name.to_string(),
            description: literals.description.to_string(),
            version: literals.version.to_string(),
            system_prompt: literals.system_prompt.to_string(),
            tools,
            input_schema,
            output_schema,
        }
    }
}
