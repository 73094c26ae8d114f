use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Asks for one line of input, e.g. `Enter your namespace: `.
pub fn prompt(label: &str) -> Result<String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_with(&mut input, &mut output, label)
}

pub fn prompt_with<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "Enter your {label}: ")?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {label}"))?;
    if read == 0 {
        anyhow::bail!("No {label} given (end of input)");
    }

    let value = line.trim();
    if value.is_empty() {
        anyhow::bail!("The {label} must not be empty");
    }
    Ok(value.to_string())
}
