//! Command-line argument definitions using clap.

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::{Config, FilenameStyle};

/// Reddit saved-posts media downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "reddit-saved-downloader",
    version,
    about = "Download media from your saved Reddit posts",
    long_about = "Downloads the images, RedGifs and Reddit-hosted videos linked from saved posts.\n\n\
                  Reads an exported saved-posts JSON file, or fetches the listing directly with a \
                  session cookie. Runs are resumable: processed posts are remembered in the output directory.",
    arg_required_else_help = true
)]
pub struct Args {
    /// Saved-posts JSON file to read.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory where media is saved.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of simultaneous downloads.
    #[arg(short = 'c', long = "concurrent")]
    pub concurrent: Option<usize>,

    /// Filename style.
    #[arg(short, long, value_enum)]
    pub style: Option<StyleArg>,

    /// Also write logs to this file.
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Reddit username whose saved posts are fetched.
    /// Cannot be combined with --input; a value from the environment is ignored then.
    #[arg(short, long, env = "REDDIT_USERNAME")]
    pub username: Option<String>,

    /// Value of the reddit_session cookie.
    #[arg(long, env = "REDDIT_SESSION", hide_env_values = true)]
    pub session: Option<String>,

    /// Path to configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Retries per download after the first attempt.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Forget previously processed posts before planning.
    #[arg(long)]
    pub reset_ledger: bool,

    /// Keep zero-byte and .tmp files from earlier runs.
    #[arg(long)]
    pub no_cleanup: bool,
}

/// CLI filename style argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StyleArg {
    /// "{title} --- {post_id}{ext}"
    Basic,
    /// "{title}{ext}"
    Pretty,
    /// "{title}-{post_id}-{url_hash}{ext}"
    Advanced,
}

impl From<StyleArg> for FilenameStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Basic => FilenameStyle::Basic,
            StyleArg::Pretty => FilenameStyle::Pretty,
            StyleArg::Advanced => FilenameStyle::Advanced,
        }
    }
}

impl Args {
    /// Parse the process arguments, exiting with a usage error on conflict.
    pub fn parse_checked() -> Self {
        Self::try_parse_checked_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args`, rejecting `--input` together with an explicit `--username`.
    ///
    /// A username taken from `REDDIT_USERNAME` does not conflict.
    pub fn try_parse_checked_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command();
        let matches = command.try_get_matches_from_mut(args)?;

        let input_given = matches.get_one::<PathBuf>("input").is_some();
        let username_typed = matches.value_source("username") == Some(ValueSource::CommandLine);
        if input_given && username_typed {
            return Err(command.error(
                ErrorKind::ArgumentConflict,
                "--input cannot be used with --username",
            ));
        }

        Self::from_arg_matches(&matches).map_err(|e| e.format(&mut command))
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        // An input file takes precedence over remote credentials
        if let Some(input) = self.input {
            config.input_file = Some(input);
            config.account.username = None;
        } else if let Some(username) = self.username {
            config.account.username = Some(username);
        }

        if let Some(session) = self.session {
            config.account.session_cookie = Some(session);
        }

        if let Some(dir) = self.output {
            config.options.output_directory = dir;
        }

        if let Some(concurrent) = self.concurrent {
            config.options.concurrency = concurrent;
        }

        if let Some(style) = self.style {
            config.options.filename_style = style.into();
        }

        if let Some(retries) = self.max_retries {
            config.options.max_retries = retries;
        }

        if self.no_cleanup {
            config.options.cleanup_incomplete = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv<'a>(args: &'a [&'a str]) -> impl Iterator<Item = &'a str> {
        std::iter::once("reddit-saved-downloader").chain(args.iter().copied())
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_checked_from(argv(args)).unwrap()
    }

    #[test]
    fn test_merge_overrides() {
        let args = parse(&[
            "-i", "saved.json", "-o", "/tmp/media", "-c", "8", "-s", "advanced", "--max-retries",
            "5", "--no-cleanup",
        ]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.input_file, Some(PathBuf::from("saved.json")));
        assert_eq!(config.options.output_directory, PathBuf::from("/tmp/media"));
        assert_eq!(config.options.concurrency, 8);
        assert_eq!(config.options.filename_style, FilenameStyle::Advanced);
        assert_eq!(config.options.max_retries, 5);
        assert!(!config.options.cleanup_incomplete);
    }

    #[test]
    fn test_defaults_keep_config() {
        let args = parse(&["-i", "saved.json"]);
        let mut config = Config::default();
        config.options.concurrency = 2;
        args.merge_into_config(&mut config);

        assert_eq!(config.options.concurrency, 2);
        assert_eq!(config.options.filename_style, FilenameStyle::Basic);
        assert!(config.options.cleanup_incomplete);
    }

    #[test]
    fn test_input_conflicts_with_typed_username() {
        let err = Args::try_parse_checked_from(argv(&["-i", "saved.json", "-u", "someone"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let args = parse(&["-u", "someone"]);
        assert_eq!(args.username.as_deref(), Some("someone"));
    }

    #[test]
    fn test_input_clears_username() {
        let args = parse(&["-i", "saved.json"]);
        let mut config = Config::default();
        config.account.username = Some("from_file".into());
        args.merge_into_config(&mut config);

        assert!(config.account.username.is_none());
    }

    #[test]
    fn test_unknown_style_rejected() {
        let result = Args::try_parse_from(["reddit-saved-downloader", "-i", "x.json", "-s", "fancy"]);
        assert!(result.is_err());
    }
}
