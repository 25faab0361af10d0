use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tolk_compiler::{
  CompileOptions, CompileOptionsInput, CompileOutcome, SourceSet, SyntaxCheckOutcome, TolkCompiler,
};

use crate::protocol::{JsonRpcError, Tool, ToolCallResult};

pub const GET_COMPILER_VERSION: &str = "get_compiler_version";
pub const COMPILE_TOLK: &str = "compile_tolk";
pub const CHECK_TOLK_SYNTAX: &str = "check_tolk_syntax";

const COMPILE_FAILED: &str = "Compilation failed:";
const SYNTAX_CHECK_FAILED: &str = "Syntax check failed:";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompileArgs {
  entrypoint_file_name: String,
  sources: SourceSet,
  #[serde(flatten)]
  options: CompileOptionsInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckSyntaxArgs {
  entrypoint_file_name: String,
  sources: SourceSet,
}

pub fn list() -> Vec<Tool> {
  vec![
    Tool {
      name: GET_COMPILER_VERSION,
      description: "Return the version of the bundled Tolk compiler.",
      input_schema: json!({ "type": "object", "properties": {} }),
    },
    Tool {
      name: COMPILE_TOLK,
      description: "Compile Tolk smart-contract sources to Fift assembly and a base64 BoC. \
        Pass every file the entrypoint imports in `sources`; standard library imports \
        (`@stdlib/...`) are resolved by the compiler.",
      input_schema: json!({
        "type": "object",
        "properties": {
          "entrypointFileName": {
            "type": "string",
            "description": "Key in `sources` to compile, e.g. \"main.tolk\""
          },
          "sources": sources_schema(),
          "optimizationLevel": {
            "type": "integer",
            "minimum": 0,
            "maximum": 2,
            "description": "Optimization level (default 2)"
          },
          "withStackComments": {
            "type": "boolean",
            "description": "Annotate the Fift output with stack layout comments (default false)"
          },
          "experimentalOptions": {
            "type": "string",
            "description": "Space-separated experimental compiler flags"
          }
        },
        "required": ["entrypointFileName", "sources"]
      }),
    },
    Tool {
      name: CHECK_TOLK_SYNTAX,
      description: "Check Tolk sources for errors without returning the compiled artifacts. \
        Faster feedback loop than compile_tolk; reports the code hash on success.",
      input_schema: json!({
        "type": "object",
        "properties": {
          "entrypointFileName": {
            "type": "string",
            "description": "Key in `sources` to check"
          },
          "sources": sources_schema()
        },
        "required": ["entrypointFileName", "sources"]
      }),
    },
  ]
}

fn sources_schema() -> Value {
  json!({
    "type": "object",
    "additionalProperties": { "type": "string" },
    "description": "Map of filename to Tolk source text"
  })
}

/// Run the named tool. Unknown tools and malformed arguments are protocol errors; everything that
/// happens once the arguments are understood is reported through [`ToolCallResult`].
pub async fn call(
  compiler: &TolkCompiler,
  name: &str,
  arguments: Value,
) -> Result<ToolCallResult, JsonRpcError> {
  match name {
    GET_COMPILER_VERSION => Ok(get_compiler_version(compiler).await),
    COMPILE_TOLK => Ok(compile_tolk(compiler, parse_arguments(name, arguments)?).await),
    CHECK_TOLK_SYNTAX => Ok(check_tolk_syntax(compiler, parse_arguments(name, arguments)?).await),
    other => Err(JsonRpcError::invalid_params(format!("Unknown tool: {other}"))),
  }
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, JsonRpcError> {
  serde_json::from_value(arguments)
    .map_err(|err| JsonRpcError::invalid_params(format!("Invalid arguments for {tool}: {err}")))
}

async fn get_compiler_version(compiler: &TolkCompiler) -> ToolCallResult {
  match compiler.version().await {
    Ok(version) => ToolCallResult::text(format!("Tolk compiler version: {version}")),
    Err(err) => {
      log::warn!("version query failed: {err}");
      ToolCallResult::error(format!("Failed to query Tolk compiler version: {err}"))
    }
  }
}

async fn compile_tolk(compiler: &TolkCompiler, args: CompileArgs) -> ToolCallResult {
  if let Err(err) = TolkCompiler::ensure_entrypoint(&args.entrypoint_file_name, &args.sources) {
    return ToolCallResult::error(err.to_string());
  }
  let options = match CompileOptions::from_input(Some(&args.options)) {
    Ok(options) => options,
    Err(err) => return ToolCallResult::error(err.to_string()),
  };

  match compiler
    .compile(&args.entrypoint_file_name, &args.sources, &options)
    .await
  {
    Ok(CompileOutcome::Success(artifacts)) => ToolCallResult::text(artifacts.to_report()),
    Ok(CompileOutcome::Failure { message }) => {
      ToolCallResult::error(format!("{COMPILE_FAILED}\n{message}"))
    }
    Err(err) => {
      log::warn!("compiler run failed: {err}");
      ToolCallResult::error(format!("{COMPILE_FAILED}\n{err}"))
    }
  }
}

async fn check_tolk_syntax(compiler: &TolkCompiler, args: CheckSyntaxArgs) -> ToolCallResult {
  if let Err(err) = TolkCompiler::ensure_entrypoint(&args.entrypoint_file_name, &args.sources) {
    return ToolCallResult::error(err.to_string());
  }

  match compiler
    .check_syntax(&args.entrypoint_file_name, &args.sources)
    .await
  {
    Ok(outcome @ SyntaxCheckOutcome::Passed { .. }) => {
      ToolCallResult::text(outcome.summary().unwrap_or_default())
    }
    Ok(SyntaxCheckOutcome::Failed { message }) => {
      ToolCallResult::error(format!("{SYNTAX_CHECK_FAILED}\n{message}"))
    }
    Err(err) => {
      log::warn!("compiler run failed: {err}");
      ToolCallResult::error(format!("{SYNTAX_CHECK_FAILED}\n{err}"))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_tool_declares_an_object_schema() {
    let tools = list();
    let names: Vec<&str> = tools.iter().map(|tool| tool.name).collect();
    assert_eq!(names, vec![GET_COMPILER_VERSION, COMPILE_TOLK, CHECK_TOLK_SYNTAX]);
    assert!(tools
      .iter()
      .all(|tool| tool.input_schema["type"] == "object"));
  }

  #[test]
  fn compile_arguments_accept_optional_settings() {
    let args: CompileArgs = parse_arguments(
      COMPILE_TOLK,
      json!({
        "entrypointFileName": "main.tolk",
        "sources": { "main.tolk": "fun main() {}" },
        "optimizationLevel": 1,
        "withStackComments": true
      }),
    )
    .expect("arguments");
    assert_eq!(args.options.optimization_level, Some(1));
    assert_eq!(args.options.with_stack_comments, Some(true));
    assert_eq!(args.options.experimental_options, None);
  }

  #[test]
  fn sources_must_be_strings() {
    let err = parse_arguments::<CheckSyntaxArgs>(
      CHECK_TOLK_SYNTAX,
      json!({ "entrypointFileName": "main.tolk", "sources": { "main.tolk": 42 } }),
    )
    .expect_err("non-string source");
    assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
  }
}
