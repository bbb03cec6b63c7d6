//! End-to-end pipeline: parse, execute, paginate, render.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::context::ExecContext;
use crate::error::{Error, Result};
use crate::parser::Parser;

/// Bound on a whole pipeline run when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for an [`Engine`], fixed for its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory `src` references resolve against.
    pub root: PathBuf,
    /// Document filename, used in error locations.
    pub filename: Option<String>,
    /// Directory executed code runs in.
    pub work_dir: PathBuf,
    /// Section number that wins over the document's own markers.
    pub section: Option<usize>,
    /// Bound on the whole run. `None` or zero means [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Stop after parsing; nothing is executed.
    pub parse_only: bool,
}

impl EngineConfig {
    /// Config rooted at `root`, which is also the working directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            work_dir: root.clone(),
            root,
            ..Self::default()
        }
    }

    /// Config for a document at `path`: its directory is the root and its
    /// file name the document filename.
    #[must_use]
    pub fn for_document(path: &Path) -> Self {
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut config = Self::new(root);
        config.filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        config
    }

    /// The timeout actually applied to a run.
    pub fn effective_timeout(&self) -> Duration {
        match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_TIMEOUT,
        }
    }

    fn parser(&self) -> Parser {
        let parser = Parser::new(&self.root).with_work_dir(&self.work_dir);
        match &self.filename {
            Some(filename) => parser.with_filename(filename),
            None => parser,
        }
    }
}

/// Runs documents through the pipeline with a fixed configuration.
///
/// The parser is created on first use and cached; [`set_parser`](Self::set_parser)
/// replaces it. The cache is the only state shared between runs.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    parser: Mutex<Option<Arc<Parser>>>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            parser: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Use `parser` for subsequent runs instead of one built from the config.
    ///
    /// The configured section still overrides the parser's own.
    pub fn set_parser(&self, parser: Parser) {
        let mut cached = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(Arc::new(parser));
    }

    /// The parser for the next run, with the configured section applied.
    pub fn parser(&self) -> Parser {
        let parser = {
            let mut cached = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cached.get_or_insert_with(|| Arc::new(self.config.parser())))
        };

        let parser = Parser::clone(&parser);
        match self.config.section {
            Some(section) => parser.with_section_override(section),
            None => parser,
        }
    }

    /// Read `input`, render it, and write the result plus a newline to `sink`.
    ///
    /// Reading counts against the configured timeout. Nothing is written if
    /// any step fails.
    pub async fn run(
        &self,
        mut input: impl AsyncRead + Unpin,
        sink: &mut impl Write,
    ) -> Result<()> {
        let timeout = self.config.effective_timeout();
        let ctx = ExecContext::background().with_timeout(timeout);

        let rendered = bounded(timeout, async {
            let mut text = String::new();
            input.read_to_string(&mut text).await?;
            self.pipeline(&ctx, &text).await
        })
        .await?;

        writeln!(sink, "{rendered}")?;
        sink.flush()?;
        Ok(())
    }

    /// Render a document under the configured timeout.
    pub async fn render(&self, input: &str) -> Result<String> {
        self.render_with(&ExecContext::background(), input).await
    }

    /// Render a document under `ctx`, bounded by the configured timeout.
    ///
    /// A failure is returned as soon as it happens. If the bound passes
    /// first, the in-flight work is dropped and [`Error::TimedOut`] returned.
    pub async fn render_with(&self, ctx: &ExecContext, input: &str) -> Result<String> {
        let timeout = self.config.effective_timeout();
        let ctx = ctx.with_timeout(timeout);
        bounded(timeout, self.pipeline(&ctx, input)).await
    }

    async fn pipeline(&self, ctx: &ExecContext, input: &str) -> Result<String> {
        let parser = self.parser();
        let mut doc = parser.parse(input)?;

        if self.config.parse_only {
            tracing::info!("parse only, skipping execution");
        } else {
            doc.execute(ctx).await?;
        }

        let pages = doc.pages()?;
        tracing::info!(pages = pages.len(), "rendering document");
        Ok(crate::page::render_pages(&pages))
    }
}

/// Race `work` against `timeout`, dropping it if the bound passes first.
async fn bounded<T>(timeout: Duration, work: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(timeout, work).await {
        Ok(result) => result,
        Err(_) => Err(Error::TimedOut(timeout)),
    }
}
