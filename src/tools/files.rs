//! Local file inspection tools

use super::{ToolContext, ToolDefinition, ToolError, ToolRegistry, object_schema, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct PathArgs {
    pub path: String,
}

fn io_error(path: &str) -> impl FnOnce(std::io::Error) -> ToolError + '_ {
    move |source| ToolError::Io {
        path: path.to_string(),
        source,
    }
}

pub fn read_file(path: &str) -> Result<String, ToolError> {
    let file = Path::new(path);
    if !file.exists() {
        return Err(ToolError::FileNotFound(path.to_string()));
    }
    if !file.is_file() {
        return Err(ToolError::NotAFile(path.to_string()));
    }

    fs::read_to_string(file).map_err(io_error(path))
}

/// One line per entry, sorted by name: `dir|file <TAB> size|- <TAB> name`
pub fn list_directory(path: &str) -> Result<String, ToolError> {
    let dir = Path::new(path);
    if !dir.exists() {
        return Err(ToolError::DirectoryNotFound(path.to_string()));
    }
    if !dir.is_dir() {
        return Err(ToolError::NotADirectory(path.to_string()));
    }

    let mut entries = fs::read_dir(dir)
        .map_err(io_error(path))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(path))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry_path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry_path.is_dir() {
            lines.push(format!("dir\t-\t{name}"));
        } else {
            let size = if entry_path.is_file() {
                fs::metadata(&entry_path)
                    .map(|m| m.len().to_string())
                    .unwrap_or_else(|_| "-".to_string())
            } else {
                "-".to_string()
            };
            lines.push(format!("file\t{size}\t{name}"));
        }
    }

    if lines.is_empty() {
        return Ok("(empty directory)".to_string());
    }
    Ok(lines.join("\n"))
}

fn read_file_tool(_ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: PathArgs = parse_args("read_file", args)?;
    read_file(&args.path)
}

fn list_directory_tool(_ctx: &ToolContext<'_>, args: Value) -> Result<String, ToolError> {
    let args: PathArgs = parse_args("list_directory", args)?;
    list_directory(&args.path)
}

pub fn register_tools(registry: &mut ToolRegistry) {
    registry.register(
        ToolDefinition {
            name: "read_file",
            description: "Read the contents of a text file",
            input_schema: object_schema(
                json!({"path": {"type": "string", "description": "Path to the file to read"}}),
                &["path"],
            ),
        },
        read_file_tool,
    );

    registry.register(
        ToolDefinition {
            name: "list_directory",
            description: "List the contents of a directory",
            input_schema: object_schema(
                json!({"path": {"type": "string", "description": "Path to the directory"}}),
                &["path"],
            ),
        },
        list_directory_tool,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "line one\nline two\n").unwrap();

        let content = read_file(path.to_str().unwrap()).unwrap();
        assert_eq!(content, "line one\nline two\n");
    }

    #[test]
    fn test_read_file_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        assert!(matches!(
            read_file(missing.to_str().unwrap()),
            Err(ToolError::FileNotFound(_))
        ));
        assert!(matches!(
            read_file(dir.path().to_str().unwrap()),
            Err(ToolError::NotAFile(_))
        ));
    }

    #[test]
    fn test_list_directory_sorted_with_sizes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "12345").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("logs")).unwrap();

        let listing = list_directory(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(listing, "file\t0\ta.txt\nfile\t5\tb.txt\ndir\t-\tlogs");
    }

    #[test]
    fn test_list_directory_empty_and_errors() {
        let dir = tempdir().unwrap();
        assert_eq!(
            list_directory(dir.path().to_str().unwrap()).unwrap(),
            "(empty directory)"
        );

        let file = dir.path().join("note.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            list_directory(file.to_str().unwrap()),
            Err(ToolError::NotADirectory(_))
        ));
        assert!(matches!(
            list_directory(dir.path().join("nope").to_str().unwrap()),
            Err(ToolError::DirectoryNotFound(_))
        ));
    }
}
