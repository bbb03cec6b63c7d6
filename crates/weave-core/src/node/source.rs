use std::fmt;
use std::path::{Path, PathBuf};

use crate::context::ExecContext;
use crate::error::{Error, Location, Result};
use crate::node::write_fenced;

/// Code whose content lives in a file referenced by a `src` attribute.
///
/// Until it runs the node renders as the markup it came from. After a
/// successful run it renders as a fenced block holding the file content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceCode {
    location: Location,
    src: String,
    path: PathBuf,
    language: String,
    source: String,
    content: Option<String>,
}

impl SourceCode {
    pub(crate) fn new(
        location: Location,
        src: String,
        path: PathBuf,
        language: Option<String>,
        source: String,
    ) -> Self {
        let language = language.unwrap_or_else(|| language_for_path(&path));
        Self {
            location,
            src,
            path,
            language,
            source,
            content: None,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The `src` attribute as written.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// The `src` path resolved against the document root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// File content, once loaded.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub(crate) async fn run(&mut self, ctx: &ExecContext) -> Result<()> {
        tracing::debug!(location = %self.location, path = %self.path.display(), "loading source");

        let read = ctx
            .run(tokio::fs::read_to_string(&self.path))
            .await
            .map_err(|cause| Error::Cancelled {
                location: Some(self.location.clone()),
                cause,
            })?;

        let content = read.map_err(|source| Error::UnresolvableReference {
            location: self.location.clone(),
            path: self.path.clone(),
            source,
        })?;

        self.content = Some(content);
        Ok(())
    }
}

impl fmt::Display for SourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(content) = &self.content else {
            return f.write_str(&self.source);
        };

        write_fenced(f, &self.language, content)?;
        if self.source.is_empty() || self.source.ends_with('\n') {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Infer a fence language from a file extension.
fn language_for_path(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let language = match extension {
        "rs" => "rust",
        "py" => "python",
        "rb" => "ruby",
        "js" | "mjs" => "javascript",
        "ts" => "typescript",
        "md" => "markdown",
        "yml" => "yaml",
        "bash" | "zsh" => "sh",
        other => other,
    };
    language.to_owned()
}
