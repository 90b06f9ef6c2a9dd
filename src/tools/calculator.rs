use super::{ToolContext, ToolDefinition, ToolError, ToolRegistry, object_schema, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct CalculateArgs {
    pub operation: String,
    pub a: f64,
    pub b: f64,
}

pub fn calculate(operation: &str, a: f64, b: f64) -> Result<f64, ToolError> {
    match operation {
        "add" => Ok(a + b),
        "subtract" => Ok(a - b),
        "multiply" => Ok(a * b),
        "divide" if b == 0.0 => Ok(f64::INFINITY),
        "divide" => Ok(a / b),
        other => Err(ToolError::UnknownOperation(other.to_string())),
    }
}

/// Whole numbers keep one decimal place (`5.0`); infinity prints as `inf`
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn calculate_tool(_ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: CalculateArgs = parse_args("calculate", args)?;
    calculate(&args.operation, args.a, args.b).map(format_number)
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        ToolDefinition {
            name: "calculate",
            description: "Perform basic math operations (add, subtract, multiply, divide)",
            input_schema: object_schema(
                json!({
                    "operation": {
                        "type": "string",
                        "enum": ["add", "subtract", "multiply", "divide"],
                        "description": "The operation to perform"
                    },
                    "a": {"type": "number", "description": "First operand"},
                    "b": {"type": "number", "description": "Second operand"},
                }),
                &["operation", "a", "b"],
            ),
        },
        calculate_tool,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations() {
        assert_eq!(calculate("add", 2.0, 3.0).unwrap(), 5.0);
        assert_eq!(calculate("subtract", 2.0, 3.0).unwrap(), -1.0);
        assert_eq!(calculate("multiply", 2.5, 4.0).unwrap(), 10.0);
        assert_eq!(calculate("divide", 7.0, 2.0).unwrap(), 3.5);
    }

    #[test]
    fn test_divide_by_zero_is_infinite() {
        assert_eq!(calculate("divide", 1.0, 0.0).unwrap(), f64::INFINITY);
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_unknown_operation() {
        assert!(matches!(
            calculate("modulo", 1.0, 2.0),
            Err(ToolError::UnknownOperation(op)) if op == "modulo"
        ));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5.0");
        assert_eq!(format_number(-0.25), "-0.25");
    }
}
