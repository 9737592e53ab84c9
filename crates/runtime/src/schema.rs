//! Translation of tool input schemas into model function declarations.
//!
//! Tool servers describe parameters with JSON Schema. The model's
//! function-calling interface only understands a small scalar vocabulary,
//! so every parameter is projected onto `STRING`, `NUMBER` or `BOOLEAN`.
//! Kinds outside that set fall back to `STRING`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Declared kind of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    /// Any other declared kind, kept for diagnostics. Translates to `STRING`.
    Unknown(Option<String>),
}

impl ParamKind {
    /// Read the kind from a JSON Schema `type` keyword.
    pub fn from_schema_type(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(kind)) => match kind.as_str() {
                "string" => Self::String,
                "number" => Self::Number,
                "boolean" => Self::Boolean,
                other => Self::Unknown(Some(other.to_string())),
            },
            Some(other) => Self::Unknown(Some(other.to_string())),
            None => Self::Unknown(None),
        }
    }
}

/// A single parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub description: Option<String>,
}

/// A tool as advertised by the tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: BTreeMap<String, ParamSpec>,
    pub required: Vec<String>,
}

impl ToolDescriptor {
    /// Build a descriptor from a tool's JSON Schema `inputSchema` object.
    ///
    /// Missing `properties` means no parameters. Non-string entries in
    /// `required` are skipped.
    pub fn from_input_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &Map<String, Value>,
    ) -> Self {
        let params = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), param_spec(property)))
                    .collect()
            })
            .unwrap_or_default();

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.into(),
            description: description.into(),
            params,
            required,
        }
    }
}

fn param_spec(property: &Value) -> ParamSpec {
    ParamSpec {
        kind: ParamKind::from_schema_type(property.get("type")),
        description: property
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Scalar kinds understood by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
}

/// One property of a declaration's parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ScalarKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Object-shaped parameter schema of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    object_type: &'static str,
    pub properties: BTreeMap<String, PropertySchema>,
    pub required: Vec<String>,
}

/// The model-facing description of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// Project a tool descriptor onto the model's declaration format.
///
/// The required list is carried over unchecked; names missing from the
/// properties are left for the model and the tool server to reject.
pub fn translate(descriptor: &ToolDescriptor) -> FunctionDeclaration {
    let properties = descriptor
        .params
        .iter()
        .map(|(name, spec)| (name.clone(), translate_param(spec)))
        .collect();

    FunctionDeclaration {
        name: descriptor.name.clone(),
        description: descriptor.description.clone(),
        parameters: ParameterSchema {
            object_type: "OBJECT",
            properties,
            required: descriptor.required.clone(),
        },
    }
}

fn translate_param(spec: &ParamSpec) -> PropertySchema {
    match spec.kind {
        ParamKind::String => scalar(ScalarKind::String, spec.description.clone()),
        ParamKind::Number => scalar(ScalarKind::Number, spec.description.clone()),
        ParamKind::Boolean => scalar(ScalarKind::Boolean, spec.description.clone()),
        ParamKind::Unknown(_) => PropertySchema {
            kind: ScalarKind::String,
            description: Some(spec.description.clone().unwrap_or_default()),
        },
    }
}

fn scalar(kind: ScalarKind, description: Option<String>) -> PropertySchema {
    PropertySchema { kind, description }
}
