//! Version command implementation.

use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput {
    name: &'static str,
    version: &'static str,
    build: &'static str,
}

impl VersionOutput {
    fn current() -> Self {
        Self {
            name: "tagsync",
            version: env!("CARGO_PKG_VERSION"),
            build: if cfg!(debug_assertions) { "dev" } else { "release" },
        }
    }
}

/// Print the version.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let output = VersionOutput::current();
    if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} {} ({})", output.name, output.version, output.build);
    }
    Ok(())
}
