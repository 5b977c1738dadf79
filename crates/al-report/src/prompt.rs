//! Interactive log path prompt, used when no path is given on the command line.

use std::io::{BufRead, Write};

use al_core::LogSource;

/// Ask for a log path until an existing file is named.
///
/// Returns `Ok(None)` when the user types `exit` (any case) or stdin closes.
pub async fn ask_path<R, W>(
    source: &dyn LogSource,
    mut input: R,
    mut output: W,
) -> std::io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(output, "Path to the access log (or \"exit\"):")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let path = line.trim();
        if path.eq_ignore_ascii_case("exit") {
            return Ok(None);
        }
        if path.is_empty() {
            continue;
        }
        if source.exists(path).await {
            return Ok(Some(path.to_string()));
        }

        tracing::debug!(path, "prompted path rejected");
        writeln!(output, "Not a readable file: {path}")?;
    }
}
