//! Canned prompt templates

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Unknown prompt: {0}")]
    Unknown(String),

    #[error("Prompt '{prompt}' requires argument '{argument}'")]
    MissingArgument {
        prompt: &'static str,
        argument: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

pub fn list_prompts() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "code_review",
            description: "Generate a code review for the given code",
            arguments: vec![
                PromptArgument {
                    name: "code",
                    description: "The code to review",
                    required: true,
                },
                PromptArgument {
                    name: "language",
                    description: "Programming language of the code",
                    required: false,
                },
            ],
        },
        PromptDefinition {
            name: "explain_error",
            description: "Explain an error message and suggest fixes",
            arguments: vec![
                PromptArgument {
                    name: "error",
                    description: "The error message to explain",
                    required: true,
                },
                PromptArgument {
                    name: "context",
                    description: "Additional context about the error",
                    required: false,
                },
            ],
        },
    ]
}

/// Render the named prompt into the text of a single user message
pub fn render_prompt(name: &str, args: &HashMap<String, String>) -> Result<String, PromptError> {
    match name {
        "code_review" => {
            let code = required(args, "code_review", "code")?;
            let language = args.get("language").map_or("unknown", String::as_str);
            Ok(format!(
                "Please review the following {language} code and provide feedback on:\n\
                 1. Code quality and readability\n\
                 2. Potential bugs or issues\n\
                 3. Performance considerations\n\
                 4. Best practices and improvements\n\
                 \n\
                 Code to review:\n\
                 ```{language}\n\
                 {code}\n\
                 ```"
            ))
        }
        "explain_error" => {
            let error = required(args, "explain_error", "error")?;
            let context = args
                .get("context")
                .map_or("No additional context provided.", String::as_str);
            Ok(format!(
                "Please explain the following error and suggest how to fix it:\n\
                 \n\
                 Error message:\n\
                 {error}\n\
                 \n\
                 Context:\n\
                 {context}\n\
                 \n\
                 Please provide:\n\
                 1. What this error means\n\
                 2. Common causes\n\
                 3. How to fix it\n\
                 4. How to prevent it in the future"
            ))
        }
        other => Err(PromptError::Unknown(other.to_string())),
    }
}

fn required<'a>(
    args: &'a HashMap<String, String>,
    prompt: &'static str,
    argument: &'static str,
) -> Result<&'a str, PromptError> {
    args.get(argument)
        .map(String::as_str)
        .ok_or(PromptError::MissingArgument { prompt, argument })
}
