//! Console rendering for listings

use crate::prompts::PromptDefinition;
use crate::resources::ResourceDefinition;
use crate::tools::ToolDefinition;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

/// Required argument names from a tool's JSON schema
fn required_arguments(tool: &ToolDefinition) -> String {
    let required: Vec<&str> = tool.input_schema["required"]
        .as_array()
        .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
        .unwrap_or_default();

    if required.is_empty() {
        "-".to_string()
    } else {
        required.join(", ")
    }
}

pub fn print_tools(tools: &[&ToolDefinition]) {
    println!("\n{}", format!("TOOLS ({})", tools.len()).bold());

    let mut table = create_styled_table(&["Name", "Required", "Description"]);
    for tool in tools {
        table.add_row(vec![
            Cell::new(tool.name),
            Cell::new(required_arguments(tool)),
            Cell::new(tool.description),
        ]);
    }
    println!("{table}");
}

pub fn print_resources(resources: &[ResourceDefinition]) {
    println!("\n{}", "RESOURCES".bold());

    let mut table = create_styled_table(&["URI", "Name", "Type", "Description"]);
    for resource in resources {
        table.add_row(vec![
            Cell::new(resource.uri),
            Cell::new(resource.name),
            Cell::new(resource.mime_type),
            Cell::new(resource.description),
        ]);
    }
    println!("{table}");
}

pub fn print_prompts(prompts: &[PromptDefinition]) {
    println!("\n{}", "PROMPTS".bold());

    let mut table = create_styled_table(&["Name", "Arguments", "Description"]);
    for prompt in prompts {
        let arguments: Vec<String> = prompt
            .arguments
            .iter()
            .map(|arg| {
                if arg.required {
                    arg.name.to_string()
                } else {
                    format!("[{}]", arg.name)
                }
            })
            .collect();
        table.add_row(vec![
            Cell::new(prompt.name),
            Cell::new(arguments.join(" ")),
            Cell::new(prompt.description),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;

    #[test]
    fn test_required_arguments() {
        let registry = ToolRegistry::builtin();
        let exec = registry.get("docker_exec").unwrap();
        assert_eq!(required_arguments(exec), "container, command");

        let ps = registry.get("docker_ps").unwrap();
        assert_eq!(required_arguments(ps), "-");
    }
}
