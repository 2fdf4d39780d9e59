use std::path::Path;

pub fn validate_paths(input: &Path, output: &Path) -> Result<(), String> {
    if input.as_os_str().is_empty() {
        return Err("invalid input, expected a file path".to_string());
    }
    if output.as_os_str().is_empty() {
        return Err("invalid output, expected a file path".to_string());
    }
    if input == output {
        return Err(format!(
            "input and output are the same file '{}'",
            input.display()
        ));
    }
    Ok(())
}
