use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use serde::Serialize;
use tracing::{error, info, warn};

pub mod comments;
pub mod error;
pub mod language;
pub mod scanner;
pub mod whitespace;

pub use crate::error::Error;
pub use crate::language::{CommentPair, LanguageRule, Registry};

use crate::comments::strip_comments;

/// Configuration passed from the CLI layer (main.rs) into the core logic.
#[derive(Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub recursive: bool,
    pub backup: bool,
    pub preserve_whitespace: bool,
    pub follow_symlinks: bool,
    pub no_gitignore: bool,
    pub excludes: Vec<String>,
    pub max_bytes: Option<u64>,
    pub json: bool,
}

/// Per-file switches.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub backup: bool,
    pub preserve_whitespace: bool,
}

/// What happened to one file that was processed successfully.
#[derive(Debug)]
pub struct Outcome {
    pub language: String,
    pub output: PathBuf,
    pub backup: Option<PathBuf>,
}

/// One entry of the `--json` report.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub output: Option<String>,
    pub language: Option<String>,
    pub backup: Option<String>,
    pub success: bool,
    pub message: Option<String>,
}

/// Strip comments from `content` using the rule registered as `language`.
pub fn process(
    registry: &Registry,
    content: &str,
    language: &str,
    preserve_whitespace: bool,
) -> error::Result<String> {
    let rule = registry
        .get(language)
        .ok_or_else(|| Error::UnknownLanguage(language.to_string()))?;
    Ok(strip_comments(content, rule, preserve_whitespace))
}

/// Strip comments from the file at `input` and write the result.
///
/// With no `output` (or an output naming the input itself) the file is
/// rewritten in place, after copying the original to `<input>.bak` when
/// backups are on. A failed backup is only a warning. An `output` that is an
/// existing directory receives a file of the same name.
///
/// A file whose extension is not registered is left untouched.
pub fn process_file(
    registry: &Registry,
    input: &Path,
    output: Option<&Path>,
    options: Options,
) -> error::Result<Outcome> {
    let rule = registry
        .detect_language(input)
        .ok_or_else(|| Error::UnsupportedLanguage(input.to_path_buf()))?;

    let bytes = fs::read(input).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let original = String::from_utf8_lossy(&bytes);

    let mut cleaned = strip_comments(&original, rule, options.preserve_whitespace);
    if original.ends_with('\n') && !cleaned.is_empty() && !cleaned.ends_with('\n') {
        cleaned.push('\n');
    }

    let output = resolve_output(input, output);

    let mut backup = None;
    if options.backup && is_same_file(input, &output) {
        let path = backup_path(input);
        match fs::copy(input, &path) {
            Ok(_) => {
                info!(backup = %path.display(), "backup created");
                backup = Some(path);
            }
            Err(source) => {
                let err = anyhow::Error::new(Error::Backup { path, source });
                warn!("{err:#}");
            }
        }
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: output.clone(),
            source,
        })?;
    }
    fs::write(&output, cleaned).map_err(|source| Error::Write {
        path: output.clone(),
        source,
    })?;

    Ok(Outcome {
        language: rule.id.clone(),
        output,
        backup,
    })
}

pub fn run_with_config(cfg: Config, registry: &Registry) -> Result<()> {
    let options = Options {
        backup: cfg.backup,
        preserve_whitespace: cfg.preserve_whitespace,
    };

    let mut walk_errors = 0;
    let reports = if cfg.input.is_file() {
        let display = cfg.input.to_string_lossy().into_owned();
        vec![process_one(
            registry,
            &cfg.input,
            &display,
            cfg.output.as_deref(),
            options,
        )]
    } else if cfg.input.is_dir() {
        let (reports, errors) = process_directory(&cfg, registry, options)?;
        walk_errors = errors;
        reports
    } else {
        bail!("{} is not a valid file or directory", cfg.input.display());
    };

    let failed = reports.iter().filter(|r| !r.success).count();

    if cfg.json {
        let json = serde_json::to_string_pretty(&reports)?;
        println!("{json}");
    } else {
        println!("Processed {} file(s) successfully", reports.len() - failed);
    }

    if failed > 0 || walk_errors > 0 {
        bail!("One or more files could not be processed. See stderr for details.");
    }

    Ok(())
}

fn process_one(
    registry: &Registry,
    input: &Path,
    display_path: &str,
    output: Option<&Path>,
    options: Options,
) -> FileReport {
    match process_file(registry, input, output, options) {
        Ok(outcome) => {
            info!(
                path = display_path,
                language = %outcome.language,
                output = %outcome.output.display(),
                "comments removed"
            );
            FileReport {
                path: display_path.to_string(),
                output: Some(normalize_for_matching(&outcome.output)),
                language: Some(outcome.language),
                backup: outcome.backup.as_deref().map(normalize_for_matching),
                success: true,
                message: None,
            }
        }
        Err(err) => {
            let language = registry.detect_language(input).map(|r| r.id.clone());
            let err = anyhow::Error::new(err);
            error!("Failed to process {display_path}: {err:#}");
            FileReport {
                path: display_path.to_string(),
                output: None,
                language,
                backup: None,
                success: false,
                message: Some(format!("{err:#}")),
            }
        }
    }
}

/// Walk `cfg.input` and process every file with a registered extension.
///
/// Returns the per-file reports and the number of walk errors.
fn process_directory(
    cfg: &Config,
    registry: &Registry,
    options: Options,
) -> Result<(Vec<FileReport>, usize)> {
    let exclude_globset = build_exclude_globset(&cfg.excludes)?;

    // Canonicalise the root so relative output paths are stable.
    let canon_root = cfg
        .input
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", cfg.input.display()))?;

    let mut builder = WalkBuilder::new(&canon_root);
    builder.follow_links(cfg.follow_symlinks);
    builder.current_dir(canon_root.clone());
    // Dotfiles like `.eslintrc.js` are source too.
    builder.hidden(false);

    if !cfg.recursive {
        builder.max_depth(Some(1));
    }

    if cfg.no_gitignore {
        builder
            .git_ignore(false)
            .git_exclude(false)
            .git_global(false)
            .ignore(false);
    } else {
        builder
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            .ignore(true)
            .require_git(false);
    }

    // Values moved into the 'static filter closure must be owned separately.
    let root_for_filter = canon_root.clone();

    builder.filter_entry(move |entry: &DirEntry| {
        if entry.depth() == 0 {
            return true;
        }

        if entry.file_name() == ".git" && entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return false;
        }

        let Some(ref gs) = exclude_globset else {
            return true;
        };

        let path = entry.path();
        let rel = path.strip_prefix(&root_for_filter).unwrap_or(path);
        let rel_norm = normalize_for_matching(rel);

        if gs.is_match(&rel_norm) {
            return false;
        }

        // Let patterns like `vendor/**` prune a whole directory early.
        if entry.file_type().is_some_and(|ft| ft.is_dir()) && !rel_norm.ends_with('/') {
            let rel_dir = format!("{rel_norm}/");
            if gs.is_match(&rel_dir) {
                return false;
            }
        }

        true
    });

    let mut reports = Vec::new();
    let mut walk_errors = 0;

    for result in builder.build() {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                error!("Walk error: {err}");
                walk_errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if registry.detect_language(path).is_none() {
            continue;
        }

        let display_path = make_display_path(&canon_root, path);

        if let Some(limit) = cfg.max_bytes
            && let Ok(meta) = fs::metadata(path)
            && meta.len() > limit
        {
            warn!(
                "Skipping {} (size {} bytes > max {} bytes)",
                display_path,
                meta.len(),
                limit
            );
            continue;
        }

        let output = cfg.output.as_ref().map(|dir| {
            let rel = path.strip_prefix(&canon_root).unwrap_or(path);
            dir.join(rel)
        });

        reports.push(process_one(
            registry,
            path,
            &display_path,
            output.as_deref(),
            options,
        ));
    }

    Ok((reports, walk_errors))
}

/// Build a GlobSet from the user–provided `--exclude` patterns.
/// Returns `Ok(None)` if there are no patterns.
fn build_exclude_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();

    for pat in patterns {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }

        let glob =
            Glob::new(pat).with_context(|| format!("Invalid --exclude glob pattern: {pat}"))?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .context("Failed to build exclude glob set")?;

    Ok(Some(set))
}

/// `<path>.bak`, keeping the original extension.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

fn resolve_output(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        None => input.to_path_buf(),
        Some(out) if out.is_dir() => match input.file_name() {
            Some(name) => out.join(name),
            None => out.to_path_buf(),
        },
        Some(out) => out.to_path_buf(),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Produce a display path relative to `root` (stable regardless of current working directory).
pub fn make_display_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);

    // If root is a file and path == root, rel is empty.
    if rel.as_os_str().is_empty() {
        return path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
    }

    normalize_for_matching(rel)
}

/// Convert paths to a stable, slash-separated form for matching/printing.
fn normalize_for_matching(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
