//! Markdown to HTML conversion command.

use std::io::{Read, Write};
use std::path::PathBuf;

use blockmark_config::{CliSettings, Config};
use blockmark_markdown::{ParseOptions, parse};
use blockmark_renderer::{MalformedPolicy, RenderContext, Renderer, ValueOrder};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the conversion.
#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert (default: stdin).
    input: Option<PathBuf>,

    /// File to write HTML to (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover blockmark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Add annotated attribute values after existing ones.
    #[arg(long)]
    append_values: bool,

    /// Add annotated attribute values before existing ones (overrides config).
    #[arg(long, conflicts_with = "append_values")]
    prepend_values: bool,

    /// Drop malformed attribute words instead of failing.
    #[arg(long)]
    skip_malformed: bool,

    /// Fail on malformed attribute words (overrides config).
    #[arg(long, conflicts_with = "skip_malformed")]
    fail_malformed: bool,

    /// Enable tables, strikethrough and task lists (overrides config).
    #[arg(long)]
    gfm: bool,

    /// Disable tables, strikethrough and task lists.
    #[arg(long, conflicts_with = "gfm")]
    no_gfm: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the conversion.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, I/O or rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        let html = convert(&markdown, &config)?;

        if let Some(path) = &self.output {
            std::fs::write(path, &html)?;
            Output::new().success(&format!("Wrote {}", path.display()));
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    }

    /// Overrides derived from command line flags. Unset flags keep config values.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            value_order: flag_pair(
                self.append_values,
                self.prepend_values,
                ValueOrder::Append,
                ValueOrder::Prepend,
            ),
            malformed_attributes: flag_pair(
                self.skip_malformed,
                self.fail_malformed,
                MalformedPolicy::Skip,
                MalformedPolicy::Fail,
            ),
            gfm: flag_pair(self.gfm, self.no_gfm, true, false),
        }
    }
}

/// Value selected by one of two mutually exclusive flags, if either is set.
fn flag_pair<T>(on: bool, off: bool, on_value: T, off_value: T) -> Option<T> {
    if on {
        Some(on_value)
    } else if off {
        Some(off_value)
    } else {
        None
    }
}

/// Parse and render a markdown document with the given configuration.
pub(crate) fn convert(markdown: &str, config: &Config) -> Result<String, CliError> {
    let parse_options = ParseOptions {
        gfm: config.markdown.gfm,
        heading_attributes: config.markdown.heading_attributes,
    };
    let blocks = parse(markdown, &parse_options);
    let ctx = RenderContext::from_blocks(&blocks);
    tracing::info!(
        blocks = blocks.len(),
        references = ctx.reference_count(),
        "Rendering document"
    );
    let html = Renderer::new()
        .with_options(config.render)
        .render(&blocks, &ctx)?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn args(argv: &[&str]) -> ConvertArgs {
        TestCli::parse_from(std::iter::once("blockmark").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_cli_settings_default_leaves_config() {
        let settings = args(&[]).cli_settings();
        assert_eq!(settings.value_order, None);
        assert_eq!(settings.malformed_attributes, None);
        assert_eq!(settings.gfm, None);
    }

    #[test]
    fn test_cli_settings_flags() {
        let settings = args(&["--append-values", "--skip-malformed", "--no-gfm"]).cli_settings();
        assert_eq!(settings.value_order, Some(ValueOrder::Append));
        assert_eq!(settings.malformed_attributes, Some(MalformedPolicy::Skip));
        assert_eq!(settings.gfm, Some(false));
    }

    #[test]
    fn test_cli_settings_restore_defaults() {
        let settings = args(&["--prepend-values", "--fail-malformed", "--gfm"]).cli_settings();
        assert_eq!(settings.value_order, Some(ValueOrder::Prepend));
        assert_eq!(settings.malformed_attributes, Some(MalformedPolicy::Fail));
        assert_eq!(settings.gfm, Some(true));
    }

    #[test]
    fn test_conflicting_value_order_flags() {
        let result = TestCli::try_parse_from(["blockmark", "--append-values", "--prepend-values"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_prepend_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("blockmark.toml");
        std::fs::write(&config, "[render]\nvalue_order = \"append\"\n").unwrap();

        let args = args(&["--config", config.to_str().unwrap(), "--prepend-values"]);
        let loaded = Config::load(args.config.as_deref(), Some(&args.cli_settings())).unwrap();
        assert_eq!(loaded.render.value_order, ValueOrder::Prepend);
        assert_eq!(
            convert("# T {.a .b}", &loaded).unwrap(),
            "<h1 class=\"b a\">T</h1>\n"
        );
    }

    #[test]
    fn test_convert_default_config() {
        let html = convert("# Title {.main}\n\nSome *text*.\n", &Config::default()).unwrap();
        assert_eq!(
            html,
            "<h1 class=\"main\">Title</h1>\n<p>Some <em>text</em>.</p>\n"
        );
    }

    #[test]
    fn test_convert_malformed_fails_by_default() {
        let result = convert("```sh {.ok =bad}\nls\n```\n", &Config::default());
        assert!(matches!(result, Err(CliError::Render(_))));
    }

    #[test]
    fn test_convert_malformed_skipped() {
        let mut config = Config::default();
        config.render.malformed_attributes = MalformedPolicy::Skip;
        let html = convert("```sh {.ok =bad}\nls\n```\n", &config).unwrap();
        assert_eq!(html, "<pre class=\"ok\"><code class=\"sh\">ls</code></pre>\n");
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        let output = dir.path().join("doc.html");
        let config = dir.path().join("blockmark.toml");
        std::fs::write(&input, "---\n\nDone.\n").unwrap();
        std::fs::write(&config, "").unwrap();

        args(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .execute()
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "<hr class=\"thin\" />\n<p>Done.</p>\n"
        );
    }

    #[test]
    fn test_execute_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "x").unwrap();
        let missing = dir.path().join("nope.toml");

        let err = args(&[
            input.to_str().unwrap(),
            "--config",
            missing.to_str().unwrap(),
        ])
        .execute()
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
