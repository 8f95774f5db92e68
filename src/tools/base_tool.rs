//! Tool descriptors: a callable plus an explicitly declared signature.
//!
//! Provides the [`BaseTool`] trait, the declared parameter schema
//! ([`ParamKind`], [`ToolParameter`]) and the concrete [`Tool`] struct that
//! wraps a closure. Arguments are validated and coerced against the schema
//! before the callable runs; a failed validation never reaches the callable.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::utilities::errors::{ArgumentError, BoxError, ToolError};

// ---------------------------------------------------------------------------
// Parameter schema
// ---------------------------------------------------------------------------

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Integer,
    Float,
    String,
    Boolean,
    /// A string restricted to the listed values.
    Enum(Vec<String>),
}

impl ParamKind {
    /// JSON-schema type name shown to the model.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Float => "number",
            ParamKind::String | ParamKind::Enum(_) => "string",
            ParamKind::Boolean => "boolean",
        }
    }

    fn expected(&self) -> String {
        match self {
            ParamKind::Enum(values) => format!("one of [{}]", values.join(", ")),
            other => other.type_name().to_string(),
        }
    }

    /// Coerce `value` to this kind, or `None` when it cannot be represented.
    ///
    /// Numeric strings are accepted for numbers, `"true"`/`"false"` for
    /// booleans, and any scalar for strings.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (ParamKind::Integer, Value::Number(n)) => match n.as_i64() {
                Some(i) => Some(Value::from(i)),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| Value::from(f as i64)),
            },
            (ParamKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (ParamKind::Float, Value::Number(n)) => n.as_f64().map(Value::from),
            (ParamKind::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (ParamKind::String, Value::String(_)) => Some(value.clone()),
            (ParamKind::String, Value::Number(_) | Value::Bool(_)) => {
                Some(Value::String(value.to_string()))
            }
            (ParamKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (ParamKind::Boolean, Value::String(s)) => {
                if s.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            (ParamKind::Enum(values), Value::String(s)) if values.contains(s) => {
                Some(value.clone())
            }
            _ => None,
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_true() -> bool {
    true
}

impl ToolParameter {
    /// A required parameter without description.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), Value::from(self.kind.type_name()));
        if let ParamKind::Enum(values) = &self.kind {
            property.insert("enum".into(), json!(values));
        }
        if !self.description.is_empty() {
            property.insert("description".into(), Value::from(self.description.as_str()));
        }
        Value::Object(property)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}

// ---------------------------------------------------------------------------
// BaseTool trait
// ---------------------------------------------------------------------------

/// A tool an agent can expose to the model.
///
/// Implementors provide metadata, the parameter list, and [`invoke`], which
/// receives arguments already validated against [`parameters`]. Callers go
/// through [`run`], which performs the validation.
///
/// [`invoke`]: BaseTool::invoke
/// [`parameters`]: BaseTool::parameters
/// [`run`]: BaseTool::run
pub trait BaseTool: Send + Sync + fmt::Debug {
    /// Unique name within an agent's tool set.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// Declared parameters, in declaration order.
    fn parameters(&self) -> &[ToolParameter];

    /// Execute with validated arguments.
    fn invoke(&self, args: HashMap<String, Value>) -> Result<Value, BoxError>;

    /// The signature object listed inside the `<tools>` block of a system prompt.
    fn signature(&self) -> Value {
        let mut properties = Map::new();
        for param in self.parameters() {
            properties.insert(param.name.clone(), param.schema());
        }
        let required: Vec<&str> = self
            .parameters()
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }

    /// Check every argument against the declared signature and coerce it.
    fn validate(&self, args: &Map<String, Value>) -> Result<HashMap<String, Value>, ArgumentError> {
        let params = self.parameters();
        let mut validated = HashMap::with_capacity(args.len());

        for (key, value) in args {
            let param = params.iter().find(|p| &p.name == key).ok_or_else(|| {
                ArgumentError::UnknownParameter {
                    tool: self.name().to_string(),
                    parameter: key.clone(),
                }
            })?;
            let coerced = param
                .kind
                .coerce(value)
                .ok_or_else(|| ArgumentError::TypeMismatch {
                    tool: self.name().to_string(),
                    parameter: key.clone(),
                    expected: param.kind.expected(),
                    found: describe(value),
                })?;
            validated.insert(key.clone(), coerced);
        }

        if let Some(missing) = params
            .iter()
            .find(|p| p.required && !validated.contains_key(&p.name))
        {
            return Err(ArgumentError::MissingParameter {
                tool: self.name().to_string(),
                parameter: missing.name.clone(),
            });
        }

        Ok(validated)
    }

    /// Validate `args` and invoke the tool, returning its result unmodified.
    fn run(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let validated = self.validate(args)?;
        self.invoke(validated).map_err(|source| ToolError::Execution {
            name: self.name().to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Tool struct (wraps a callable function)
// ---------------------------------------------------------------------------

/// Shared synchronous tool function.
pub type ToolFn = Arc<dyn Fn(HashMap<String, Value>) -> Result<Value, BoxError> + Send + Sync>;

/// Concrete tool wrapping a closure. Immutable once built and cheap to clone.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: Vec<ToolParameter>,
    func: ToolFn,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl Tool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(HashMap<String, Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            func: Arc::new(func),
        }
    }

    /// Builder method to declare the next parameter.
    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Wrap into the shared handle agents hold.
    pub fn into_shared(self) -> Arc<dyn BaseTool> {
        Arc::new(self)
    }
}

impl BaseTool for Tool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    fn invoke(&self, args: HashMap<String, Value>) -> Result<Value, BoxError> {
        (self.func)(args)
    }
}

/// Concatenate the signatures of `tools`, one JSON object per line.
pub fn tool_signatures(tools: &[Arc<dyn BaseTool>]) -> String {
    tools
        .iter()
        .map(|t| t.signature().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that no two tools in `tools` share a name.
pub fn ensure_unique_names(tools: &[Arc<dyn BaseTool>]) -> Result<(), ToolError> {
    let mut seen = HashSet::with_capacity(tools.len());
    for tool in tools {
        if !seen.insert(tool.name()) {
            return Err(ToolError::DuplicateTool(tool.name().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn counting_sum(counter: Arc<AtomicUsize>) -> Tool {
        Tool::new("sum_two_elements", "Sum two integers", move |args| {
            counter.fetch_add(1, Ordering::SeqCst);
            let a = args["a"].as_i64().unwrap_or_default();
            let b = args["b"].as_i64().unwrap_or_default();
            Ok(Value::from(a + b))
        })
        .with_parameter(ToolParameter::new("a", ParamKind::Integer).with_description("first"))
        .with_parameter(ToolParameter::new("b", ParamKind::Integer))
    }

    #[test]
    fn test_signature_lists_parameters_in_order() {
        let tool = counting_sum(Arc::new(AtomicUsize::new(0)));
        let sig = tool.signature();
        assert_eq!(sig["name"], "sum_two_elements");
        let props: Vec<&String> = sig["parameters"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(props, vec!["a", "b"]);
        assert_eq!(sig["parameters"]["properties"]["a"]["type"], "integer");
        assert_eq!(sig["parameters"]["properties"]["a"]["description"], "first");
        assert_eq!(sig["parameters"]["required"], json!(["a", "b"]));
    }

    #[test]
    fn test_run_coerces_numeric_strings() {
        let counter = Arc::new(AtomicUsize::new(0));
        let tool = counting_sum(counter.clone());
        let result = tool.run(&args(json!({"a": "2", "b": 3.0}))).unwrap();
        assert_eq!(result, json!(5));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_required_argument_never_invokes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let tool = counting_sum(counter.clone());
        let err = tool.run(&args(json!({"a": 1}))).unwrap_err();
        assert!(matches!(
            err,
            ToolError::Argument(ArgumentError::MissingParameter { ref parameter, .. }) if parameter == "b"
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let counter = Arc::new(AtomicUsize::new(0));
        let tool = counting_sum(counter.clone());
        let err = tool.run(&args(json!({"a": 1, "b": 2, "c": 3}))).unwrap_err();
        assert!(matches!(
            err,
            ToolError::Argument(ArgumentError::UnknownParameter { .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let counter = Arc::new(AtomicUsize::new(0));
        let tool = counting_sum(counter.clone());
        let err = tool.run(&args(json!({"a": "two", "b": 2}))).unwrap_err();
        match err {
            ToolError::Argument(ArgumentError::TypeMismatch { expected, found, .. }) => {
                assert_eq!(expected, "integer");
                assert_eq!(found, "string \"two\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_coercion_rules() {
        assert_eq!(ParamKind::Integer.coerce(&json!(2.5)), None);
        assert_eq!(ParamKind::Float.coerce(&json!("1.5")), Some(json!(1.5)));
        assert_eq!(ParamKind::String.coerce(&json!(7)), Some(json!("7")));
        assert_eq!(ParamKind::Boolean.coerce(&json!("TRUE")), Some(json!(true)));
        assert_eq!(ParamKind::Boolean.coerce(&json!(1)), None);
        let unit = ParamKind::Enum(vec!["celsius".into(), "fahrenheit".into()]);
        assert_eq!(unit.coerce(&json!("celsius")), Some(json!("celsius")));
        assert_eq!(unit.coerce(&json!("kelvin")), None);
        assert_eq!(ParamKind::String.coerce(&Value::Null), None);
    }

    #[test]
    fn test_optional_parameter_may_be_omitted() {
        let tool = Tool::new("greet", "Say hello", |args| {
            let name = args.get("name").and_then(Value::as_str).unwrap_or("world");
            Ok(Value::from(format!("hello {name}")))
        })
        .with_parameter(ToolParameter::new("name", ParamKind::String).optional());
        assert_eq!(tool.run(&Map::new()).unwrap(), json!("hello world"));
        assert_eq!(tool.signature()["parameters"]["required"], json!([]));
    }

    #[test]
    fn test_callable_failure_is_execution_error() {
        let tool = Tool::new("boom", "Always fails", |_| Err("kaput".into()));
        let err = tool.run(&Map::new()).unwrap_err();
        assert!(matches!(err, ToolError::Execution { ref name, .. } if name == "boom"));
        assert!(err.to_string().contains("kaput"));
    }

    #[test]
    fn test_duplicate_tool_names_are_rejected() {
        let tools = vec![
            Tool::new("lookup", "first", |_| Ok(Value::from("FIRST"))).into_shared(),
            Tool::new("lookup", "second", |_| Ok(Value::from("SECOND"))).into_shared(),
        ];
        let err = ensure_unique_names(&tools).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool(ref n) if n == "lookup"));
        assert!(ensure_unique_names(&tools[..1]).is_ok());
    }
}
