use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use uncomment::{Config, Registry, run_with_config};

/// uncomment - strip comments from source files.
///
/// Removes single-line and multi-line comments while leaving string literals
/// alone, then tidies the blank lines left behind.
#[derive(Parser, Debug)]
#[command(
    name = "uncomment",
    author,
    version,
    about = "Strip comments from source files, leaving string literals untouched",
    long_about = r#"Strip comments from source files, leaving string literals untouched.

Comment markers that sit inside a string literal are kept. After removal,
runs of blank lines are capped at two and leading/trailing blank lines are
dropped.

Files are rewritten in place unless --output is given; the original is kept
as <file>.bak unless --no-backup is passed.

Supported languages:
  Python, JavaScript, TypeScript, Java, C/C++, Shell, Perl, Ruby, PHP,
  CSS/SCSS/Sass/Less, HTML/XML, SQL, Lua, R, MATLAB, Rust, Go, C#, Swift,
  Kotlin, YAML, TOML

Typical usage:
  uncomment script.py
  uncomment script.js -o clean_script.js
  uncomment ./src -r --no-backup
  uncomment ./project -o ./clean_project -r
"#
)]
struct Args {
    /// Input file or directory.
    #[arg(value_name = "INPUT", required_unless_present = "list_languages")]
    input: Option<PathBuf>,

    /// Output file or directory (defaults to rewriting the input in place).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Process directories recursively.
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Do not create <file>.bak before rewriting a file in place.
    #[arg(long = "no-backup")]
    no_backup: bool,

    /// Do not clean up the blank lines left by removed comments.
    #[arg(long = "preserve-whitespace")]
    preserve_whitespace: bool,

    /// Follow symbolic links during traversal.
    #[arg(long = "follow-symlinks")]
    follow_symlinks: bool,

    /// Disable reading .gitignore / .ignore / git exclude files.
    #[arg(long = "no-gitignore")]
    no_gitignore: bool,

    /// Additional glob patterns to exclude (files or directories).
    ///
    /// Patterns are evaluated relative to the input directory, e.g.:
    ///
    ///   uncomment src -r --exclude 'vendor/**,*.min.js'
    #[arg(
        long = "exclude",
        short = 'E',
        value_name = "GLOB",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    excludes: Vec<String>,

    /// Skip files larger than this many bytes.
    #[arg(long = "max-bytes", value_name = "N")]
    max_bytes: Option<u64>,

    /// Print a JSON report of processed files instead of a summary line.
    #[arg(long = "json")]
    json: bool,

    /// JSON file with extra language rules.
    ///
    /// An array of objects with `id`, `extensions`, `single_line`,
    /// `multi_line` ([{"start": .., "end": ..}]) and `string_delimiters`.
    /// These rules are consulted before the built-in ones and replace a
    /// built-in rule with the same id.
    #[arg(long = "rules", value_name = "FILE")]
    rules: Option<PathBuf>,

    /// List the known languages and their extensions, then exit.
    #[arg(long = "list-languages")]
    list_languages: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let registry = match &args.rules {
        Some(path) => Registry::from_rules_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        None => Registry::builtin(),
    };

    if args.list_languages {
        for rule in registry.rules() {
            println!("{:<12} {}", rule.id, rule.extensions.join(", "));
        }
        return Ok(());
    }

    let Some(input) = args.input else {
        anyhow::bail!("No input path given.");
    };

    let cfg = Config {
        input,
        output: args.output,
        recursive: args.recursive,
        backup: !args.no_backup,
        preserve_whitespace: args.preserve_whitespace,
        follow_symlinks: args.follow_symlinks,
        no_gitignore: args.no_gitignore,
        excludes: args.excludes,
        max_bytes: args.max_bytes,
        json: args.json,
    };

    run_with_config(cfg, &registry)
}
