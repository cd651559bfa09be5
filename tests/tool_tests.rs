//! Tests for the tool system.

use ferry::error::FerryError;
use ferry::tools::*;
use ferry::types::ToolErrorKind;
use serde_json::json;

fn greet_tool() -> AgentTool {
    AgentTool::new(
        "greet",
        "Greet a person",
        ToolParameters::object().string("name", "Name", true).build(),
        |args, _ctx: ToolExecutionContext| async move {
            let name = args.get_str("name")?;
            Ok(json!({ "greeting": format!("Hello, {name}!") }))
        },
    )
}

#[test]
fn parameter_builder_constructs_schema() {
    let params = ToolParameters::object()
        .string("query", "Search query", true)
        .number("limit", "Max results", false)
        .boolean("verbose", "Enable verbose output", false)
        .array("tags", "Filter tags", "string", false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["properties"]["limit"]["type"], "number");
    assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
    assert_eq!(schema["required"], json!(["query"]));
    assert!(schema.get("additionalProperties").is_none());
}

#[test]
fn parameter_builder_string_enum_and_closed_schema() {
    let params = ToolParameters::object()
        .string_enum("format", "Output format", &["json", "text", "csv"], true)
        .deny_unknown()
        .build();

    let enums = params.schema["properties"]["format"]["enum"]
        .as_array()
        .unwrap();
    assert_eq!(enums.len(), 3);
    assert_eq!(params.schema["additionalProperties"], json!(false));
}

#[test]
fn empty_parameters() {
    let params = ToolParameters::empty();
    assert_eq!(params.schema["type"], "object");
}

#[test]
fn tool_arguments_accessors() {
    let args = ToolArguments::new(json!({
        "name": "Alice",
        "age": 30,
        "ratio": 0.5,
        "active": true,
        "tags": ["a", "b"],
        "meta": { "k": "v" },
    }));

    assert_eq!(args.get_str("name").unwrap(), "Alice");
    assert_eq!(args.get_i64("age").unwrap(), 30);
    assert_eq!(args.get_f64("ratio").unwrap(), 0.5);
    assert!(args.get_bool("active").unwrap());
    assert_eq!(args.get_array("tags").unwrap().len(), 2);
    assert_eq!(args.get_object("meta").unwrap()["k"], "v");
    assert_eq!(args.get_str_opt("missing"), None);
    assert_eq!(args.get_bool_opt("missing"), None);
}

#[test]
fn missing_argument_is_an_invalid_argument_error() {
    let args = ToolArguments::new(json!({ "count": "not a number" }));
    assert!(matches!(
        args.get_i64("count"),
        Err(FerryError::InvalidArgument(_))
    ));
    assert!(matches!(
        args.get_str("missing"),
        Err(FerryError::InvalidArgument(_))
    ));
}

#[test]
fn tool_arguments_deserialize() {
    #[derive(serde::Deserialize, PartialEq, Debug)]
    struct Params {
        query: String,
        limit: Option<u32>,
    }

    let args = ToolArguments::new(json!({ "query": "rust", "limit": 10 }));
    let params: Params = args.deserialize().unwrap();
    assert_eq!(
        params,
        Params {
            query: "rust".into(),
            limit: Some(10)
        }
    );
}

#[tokio::test]
async fn registered_tool_resolves_and_executes() {
    let registry = ToolRegistry::new().with_tool(greet_tool()).unwrap();

    let tool = registry.resolve("greet").unwrap();
    assert_eq!(tool.descriptor.description, "Greet a person");

    let ctx = ToolExecutionContext {
        tool_call_id: "call_1".into(),
        tool_name: "greet".into(),
    };
    let result = tool
        .executor
        .invoke(&ToolArguments::new(json!({ "name": "World" })), &ctx)
        .await
        .unwrap();
    assert_eq!(result["greeting"], "Hello, World!");
}

#[test]
fn registry_rejects_duplicates_and_bad_names() {
    let mut registry = ToolRegistry::new();
    registry.register_tool(greet_tool()).unwrap();

    assert!(matches!(
        registry.register_tool(greet_tool()),
        Err(FerryError::DuplicateTool(_))
    ));
    let bad = AgentTool::new(
        "has space",
        "Bad name",
        ToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move { Ok(json!(null)) },
    );
    assert!(matches!(
        registry.register_tool(bad),
        Err(FerryError::InvalidToolName(_))
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn unknown_tool_lookup_reports_the_name() {
    let registry = ToolRegistry::new();
    let err = registry.resolve("ghost").unwrap_err();
    assert_eq!(err.kind, ToolErrorKind::UnknownTool);
    assert!(err.message.contains("ghost"));
}

#[test]
fn builtin_tools_register_cleanly() {
    let mut registry = ToolRegistry::new();
    for tool in builtin::all_tools() {
        registry.register_tool(tool).unwrap();
    }
    let names: Vec<_> = registry.names().collect();
    assert_eq!(names, ["echo", "current_time", "sleep"]);
}
