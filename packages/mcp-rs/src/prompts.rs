use std::collections::BTreeMap;

use serde::Serialize;

use crate::protocol::{Content, GetPromptResult, JsonRpcError, PromptMessage, Role};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromptArgument {
  pub name: &'static str,
  pub description: &'static str,
  pub required: bool,
}

/// A prompt template. `{name}` placeholders in `template` are replaced by argument values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromptTemplate {
  pub name: &'static str,
  pub description: &'static str,
  pub arguments: &'static [PromptArgument],
  #[serde(skip)]
  pub template: &'static str,
}

pub const PROMPTS: &[PromptTemplate] = &[
  PromptTemplate {
    name: "write_contract",
    description: "Write a Tolk smart contract from a description and verify it compiles",
    arguments: &[PromptArgument {
      name: "description",
      description: "What the contract should do",
      required: true,
    }],
    template: "Write a TON smart contract in Tolk that does the following:\n\n\
      {description}\n\n\
      Read tolk://docs/language-reference first. Keep storage loading and saving in \
      dedicated functions, reject unknown operations with `throw 0xFFFF`, and expose \
      the contract state through get-methods. When the code is ready, call \
      check_tolk_syntax and fix every reported error before presenting the result.",
  },
  PromptTemplate {
    name: "review_contract",
    description: "Review Tolk contract code for bugs and security issues",
    arguments: &[PromptArgument {
      name: "code",
      description: "Tolk source to review",
      required: true,
    }],
    template: "Review the following Tolk smart contract:\n\n```tolk\n{code}\n```\n\n\
      Look for missing sender authorization, unchecked message bodies, bounced \
      message handling, storage layout mismatches between load and save, and gas or \
      balance assumptions. Compile it with compile_tolk to confirm it builds, then \
      list each finding with the affected function and a concrete fix.",
  },
  PromptTemplate {
    name: "explain_compile_error",
    description: "Explain a Tolk compiler error and propose a fix",
    arguments: &[
      PromptArgument {
        name: "code",
        description: "Source that failed to compile",
        required: true,
      },
      PromptArgument {
        name: "error",
        description: "Compiler output",
        required: true,
      },
    ],
    template: "This Tolk code fails to compile:\n\n```tolk\n{code}\n```\n\n\
      Compiler output:\n\n```\n{error}\n```\n\n\
      Explain what the error means, point to the line responsible, and give a corrected \
      version. Verify the correction with check_tolk_syntax.",
  },
];

pub fn list() -> &'static [PromptTemplate] {
  PROMPTS
}

pub fn get(
  name: &str,
  arguments: &BTreeMap<String, String>,
) -> Result<GetPromptResult, JsonRpcError> {
  let prompt = PROMPTS
    .iter()
    .find(|prompt| prompt.name == name)
    .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown prompt: {name}")))?;

  let mut values = BTreeMap::new();
  for argument in prompt.arguments {
    match arguments.get(argument.name) {
      Some(value) => {
        values.insert(argument.name, value.as_str());
      }
      None if argument.required => {
        return Err(JsonRpcError::invalid_params(format!(
          "Prompt {name} requires argument `{}`",
          argument.name
        )))
      }
      None => {
        values.insert(argument.name, "");
      }
    }
  }
  let text = render(prompt.template, &values);

  Ok(GetPromptResult {
    description: prompt.description,
    messages: vec![PromptMessage {
      role: Role::User,
      content: Content::text(text),
    }],
  })
}

/// Single pass over `template`, so placeholder-like text inside argument values is left alone.
fn render(template: &str, values: &BTreeMap<&str, &str>) -> String {
  let mut output = String::with_capacity(template.len());
  let mut rest = template;
  while let Some(start) = rest.find('{') {
    output.push_str(&rest[..start]);
    let after = &rest[start + 1..];
    match after
      .find('}')
      .and_then(|end| values.get(&after[..end]).map(|value| (end, value)))
    {
      Some((end, value)) => {
        output.push_str(value);
        rest = &after[end + 1..];
      }
      None => {
        output.push('{');
        rest = after;
      }
    }
  }
  output.push_str(rest);
  output
}
