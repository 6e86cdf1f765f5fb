//! Tracing configuration for debugging resolution.
//!
//! Every resolution request opens a span: `resolve` for the real files,
//! `resolve_on_air` for speculative copies, and a nested `dependency` span
//! whenever a body pulls in another declaration of its file. The variables
//! below choose what to show and how.
//!
//! | variable          | values                        | default |
//! |-------------------|-------------------------------|---------|
//! | `LRES_LOG`        | `RUST_LOG` directive syntax   | `RUST_LOG` |
//! | `LRES_LOG_FORMAT` | `text`, `tree`, `json`        | `text`  |
//! | `LRES_LOG_SPANS`  | `none`, `close`, `full`       | `none`  |
//!
//! ```bash
//! # One indented block per request, with the stages run inside it
//! LRES_LOG=lres_resolve=trace LRES_LOG_FORMAT=tree cargo test -p lres-resolve
//!
//! # Timing of every request as a JSON line when its span closes
//! LRES_LOG=lres_resolve=debug LRES_LOG_FORMAT=json LRES_LOG_SPANS=close cargo test
//! ```
//!
//! Nothing is installed unless `LRES_LOG` or `RUST_LOG` is set.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Indented by span via `tracing-tree`.
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Which span lifecycle events are written as lines of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEvents {
    None,
    /// One line per closed span, with its busy and idle time.
    Close,
    /// Open, enter, exit and close.
    Full,
}

impl SpanEvents {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "close" => Self::Close,
            "full" => Self::Full,
            _ => Self::None,
        }
    }

    fn fmt_span(self) -> FmtSpan {
        match self {
            SpanEvents::None => FmtSpan::NONE,
            SpanEvents::Close => FmtSpan::CLOSE,
            SpanEvents::Full => FmtSpan::FULL,
        }
    }
}

/// Subscriber settings, read from the environment by [`TracingConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Filter directives; `None` disables tracing.
    pub directives: Option<String>,
    pub format: LogFormat,
    pub spans: SpanEvents,
}

impl TracingConfig {
    pub fn from_env() -> TracingConfig {
        let var = |name: &str| std::env::var(name).ok();
        TracingConfig::from_vars(
            var("LRES_LOG"),
            var("RUST_LOG"),
            var("LRES_LOG_FORMAT"),
            var("LRES_LOG_SPANS"),
        )
    }

    /// `lres_log` takes precedence over `rust_log`.
    pub fn from_vars(
        lres_log: Option<String>,
        rust_log: Option<String>,
        format: Option<String>,
        spans: Option<String>,
    ) -> TracingConfig {
        TracingConfig {
            directives: lres_log.or(rust_log),
            format: format.as_deref().map_or(LogFormat::Text, LogFormat::parse),
            spans: spans.as_deref().map_or(SpanEvents::None, SpanEvents::parse),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.directives.is_some()
    }

    /// Install the global subscriber. Returns `false` when tracing is
    /// disabled or a subscriber is already installed.
    pub fn init(&self) -> bool {
        let Some(directives) = &self.directives else {
            return false;
        };
        let filter = EnvFilter::builder().parse_lossy(directives);
        let installed = match self.format {
            LogFormat::Tree => {
                let tree_layer = tracing_tree::HierarchicalLayer::default()
                    .with_indent_amount(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_span_retrace(true)
                    .with_verbose_exit(self.spans == SpanEvents::Full)
                    .with_targets(true);
                Registry::default().with(filter).with(tree_layer).try_init()
            }
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_events(self.spans.fmt_span())
                    .with_writer(std::io::stderr);
                Registry::default().with(filter).with(json_layer).try_init()
            }
            LogFormat::Text => {
                let text_layer = fmt::layer()
                    .with_span_events(self.spans.fmt_span())
                    .with_writer(std::io::stderr);
                Registry::default().with(filter).with(text_layer).try_init()
            }
        };
        installed.is_ok()
    }
}

/// Initialise the global tracing subscriber from the environment.
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_tracing() {
    TracingConfig::from_env().init();
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tracing_config_tests;
