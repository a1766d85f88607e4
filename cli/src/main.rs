use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use console::style;
use globset::{Glob, GlobSet, GlobSetBuilder};
use penwise_core::{
    Category, Config, EditBatch, EditorSession, HighlightScope, NewlineOutcome, Severity,
    StyleAnalyzer, StyleIssue, StyleReport, TextRange, Theme, TypewriterMode,
};
use serde::Serialize;
use serde_yaml::Value as YamlValue;
use tracing::debug;
use walkdir::WalkDir;

/// penwise CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "penwise",
    about = "Markdown-aware highlighting, list editing and prose style checks."
)]
struct Cli {
    /// Path to config file (YAML). Defaults to penwise.yml if present.
    #[arg(long, global = true, default_value = "penwise.yml")]
    config: PathBuf,

    /// Set config overrides (repeatable as key=value). Example: --set analyzer.long_sentence_words=30
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", num_args = 0..)]
    sets: Vec<String>,

    /// Log core decisions to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the prose style analyzer over files or directories.
    Check(CheckArgs),
    /// Print the attribute runs the highlighter produces for a file.
    Highlight(HighlightArgs),
    /// Show the edit a newline at the caret would make.
    Newline(NewlineArgs),
    /// Show the edit for indenting (or outdenting) the selected lines.
    Indent(IndentArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Files or directories to check.
    #[arg(value_name = "PATH", default_value = ".", num_args = 0..)]
    paths: Vec<PathBuf>,

    /// Emit JSON output for automation.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Strict mode: exit non-zero when any warning-severity issue is found.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Print only the summary line.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Enable only these categories (comma-separated). Implies disabling others.
    #[arg(long, value_delimiter = ',', value_name = "CAT[,CAT]")]
    only: Vec<String>,

    /// Disable categories (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "CAT[,CAT]")]
    disable: Vec<String>,

    /// Skip paths matching these globs.
    #[arg(long, value_name = "GLOB")]
    ignore: Vec<String>,
}

#[derive(Debug, Args)]
struct HighlightArgs {
    file: PathBuf,

    /// Caret byte offset.
    #[arg(long, default_value_t = 0)]
    caret: usize,

    /// Selection length in bytes, starting at the caret.
    #[arg(long, default_value_t = 0)]
    length: usize,

    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct NewlineArgs {
    file: PathBuf,

    #[arg(long)]
    caret: usize,

    #[arg(long, default_value_t = 0)]
    length: usize,

    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct IndentArgs {
    file: PathBuf,

    #[arg(long)]
    start: usize,

    #[arg(long)]
    end: usize,

    #[arg(long, action = ArgAction::SetTrue)]
    outdent: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    word_count: usize,
    density_per_100_words: f32,
    category_counts: BTreeMap<Category, usize>,
    issues: Vec<StyleIssue>,
}

#[derive(Debug, Serialize)]
struct OutputReport {
    files: Vec<FileResult>,
    total_word_count: usize,
    total_issues: usize,
    density_per_100_words: f32,
}

#[derive(Debug, Serialize)]
struct EditOutput<'a> {
    batch: Option<&'a EditBatch>,
    text: &'a str,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (mut cfg, config_root) = load_config(&cli.config)?;
    apply_overrides(&mut cfg, &cli.sets)?;

    match cli.command {
        Command::Check(args) => run_check(cfg, &config_root, args),
        Command::Highlight(args) => run_highlight(&cfg, args),
        Command::Newline(args) => run_newline(&cfg, args),
        Command::Indent(args) => run_indent(&cfg, args),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("penwise_core=debug,info"),
        _ => EnvFilter::new("penwise_core=trace,debug"),
    });
    // Keep an already-installed subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_check(mut cfg: Config, config_root: &Path, args: CheckArgs) -> anyhow::Result<()> {
    apply_category_filter(&mut cfg, &args.only, &args.disable)?;
    let analyzer = StyleAnalyzer::new(cfg.analyzer);

    let ignore = build_ignore_set(&args.ignore)?;
    let mut files = collect_files(&args.paths, ignore.as_ref())?;
    files.sort();
    debug!(files = files.len(), "checking files");

    let mut file_reports = Vec::new();
    let mut total_words = 0usize;
    let mut total_issues = 0usize;
    let mut saw_warning = false;

    for path in files {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let rel_path = pathdiff::diff_paths(&path, config_root).unwrap_or_else(|| path.clone());
        let rel_path_clean = rel_path.to_string_lossy().replace('\\', "/");

        let report = analyzer.report(&content);
        let density = report.density_per_100_words();
        total_words += report.word_count;
        total_issues += report.issues.len();
        saw_warning |= report.has_warnings();

        if !args.quiet && !args.json {
            print_human_report(&rel_path_clean, &content, &report, density);
        }

        file_reports.push(FileResult {
            path: rel_path_clean,
            word_count: report.word_count,
            density_per_100_words: density,
            category_counts: report.category_counts,
            issues: report.issues,
        });
    }

    let overall_density = if total_words == 0 {
        total_issues as f32
    } else {
        (total_issues as f32) * 100.0 / total_words as f32
    };

    let output = OutputReport {
        files: file_reports,
        total_word_count: total_words,
        total_issues,
        density_per_100_words: overall_density,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "\n{} words, {} issues, density {:.2} per 100 words",
            total_words, total_issues, overall_density
        );
    }

    if args.strict && saw_warning {
        std::process::exit(1);
    }

    Ok(())
}

fn run_highlight(cfg: &Config, args: HighlightArgs) -> anyhow::Result<()> {
    let text = read_buffer(&args.file)?;
    let mut session = EditorSession::new(cfg)?;
    let highlight = session
        .text_did_change(&text, TextRange::new(args.caret, args.length))?
        .ok_or_else(|| anyhow!("session is mid-edit"))?;
    let runs = highlight.runs();

    if args.json {
        #[derive(Serialize)]
        struct Out<'a> {
            #[serde(flatten)]
            highlight: &'a penwise_core::Highlight,
            runs: &'a [penwise_core::AttributeRun],
        }
        let out = Out {
            highlight: &highlight,
            runs: &runs,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if highlight.gated {
        println!(
            "{}",
            style("buffer exceeds the size gate; base styling only").yellow()
        );
    }
    println!(
        "{} active {}..{}",
        style(args.file.display()).bold(),
        highlight.active_range.offset,
        highlight.active_range.end()
    );
    if let Some(scroll) = &highlight.scroll {
        println!("  scroll to line {}", scroll.line + 1);
    }
    for run in &runs {
        println!(
            "  {:>6}..{:<6} {:<24} {}",
            run.range.offset,
            run.range.end(),
            style(format!("{:?}", preview(run.range.slice(&text)))).cyan(),
            serde_json::to_string(&run.attributes)?
        );
    }
    Ok(())
}

fn run_newline(cfg: &Config, args: NewlineArgs) -> anyhow::Result<()> {
    let text = read_buffer(&args.file)?;
    let mut session = EditorSession::new(cfg)?;
    let batch = match session.newline(&text, TextRange::new(args.caret, args.length))? {
        NewlineOutcome::Edit(batch) => Some(batch),
        NewlineOutcome::Default => None,
    };
    print_edit(&text, batch.as_ref(), args.json)
}

fn run_indent(cfg: &Config, args: IndentArgs) -> anyhow::Result<()> {
    if args.end < args.start {
        bail!("--end ({}) is before --start ({})", args.end, args.start);
    }
    let text = read_buffer(&args.file)?;
    let mut session = EditorSession::new(cfg)?;
    let selection = TextRange::new(args.start, args.end - args.start);
    let batch = session.indent(&text, selection, args.outdent)?;
    print_edit(&text, Some(&batch), args.json)
}

fn print_edit(text: &str, batch: Option<&EditBatch>, json: bool) -> anyhow::Result<()> {
    let updated = batch.map_or_else(|| text.to_string(), |b| b.apply(text));
    if json {
        let out = EditOutput {
            batch,
            text: &updated,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    let Some(batch) = batch else {
        println!(
            "{}",
            style("not a list line; the editor inserts a plain newline").dim()
        );
        return Ok(());
    };
    for edit in &batch.edits {
        println!(
            "  replace {}..{} with {}",
            edit.range.offset,
            edit.range.end(),
            style(format!("{:?}", edit.replacement)).green()
        );
    }
    println!(
        "  selection {}..{}",
        batch.selection.offset,
        batch.selection.end()
    );
    println!("{}", style("---").dim());
    print!("{updated}");
    if !updated.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn read_buffer(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn preview(snippet: &str) -> String {
    const MAX: usize = 20;
    if snippet.chars().count() <= MAX {
        return snippet.to_string();
    }
    let mut out: String = snippet.chars().take(MAX - 1).collect();
    out.push('…');
    out
}

fn build_ignore_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob {pattern}"))?);
    }
    Ok(Some(builder.build()?))
}

fn collect_files(paths: &[PathBuf], ignore: Option<&GlobSet>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path).into_iter();
            while let Some(entry_res) = walker.next() {
                let entry = entry_res?;
                let entry_path = entry.path();
                if ignore.is_some_and(|set| set.is_match(entry_path)) {
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
                if entry.file_type().is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() && is_supported(path) {
            if ignore.is_some_and(|set| set.is_match(path)) {
                continue;
            }
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "md" | "markdown" | "txt"),
        None => false,
    }
}

fn load_config(path: &Path) -> anyhow::Result<(Config, PathBuf)> {
    if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let value: YamlValue = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML {}", path.display()))?;
        let cfg: Config = serde_yaml::from_value(value)
            .with_context(|| format!("Invalid config structure in {}", path.display()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => env::current_dir()?,
        };
        Ok((cfg, dir))
    } else {
        debug!(path = %path.display(), "no config file; using defaults");
        Ok((Config::default(), env::current_dir()?))
    }
}

fn parse_categories(names: &[String]) -> anyhow::Result<Vec<Category>> {
    names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .map(|n| Category::parse(n).ok_or_else(|| anyhow!("unknown category `{}`", n.trim())))
        .collect()
}

fn apply_category_filter(
    cfg: &mut Config,
    only: &[String],
    disable: &[String],
) -> anyhow::Result<()> {
    let only = parse_categories(only)?;
    let disable = parse_categories(disable)?;
    let disabled = &mut cfg.analyzer.disabled_categories;
    if !only.is_empty() {
        disabled.extend(Category::ALL.into_iter().filter(|c| !only.contains(c)));
    }
    disabled.extend(disable);
    disabled.sort();
    disabled.dedup();
    Ok(())
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn apply_overrides(cfg: &mut Config, sets: &[String]) -> anyhow::Result<()> {
    for kv in sets {
        let Some((key, val)) = kv.split_once('=') else {
            bail!("override `{kv}` is not KEY=VALUE");
        };
        let (key, val) = (key.trim(), val.trim());
        let analyzer = &mut cfg.analyzer;
        match key {
            "analyzer.repetition_window" => {
                analyzer.repetition_window = val.parse().unwrap_or(analyzer.repetition_window);
            }
            "analyzer.long_sentence_words" => {
                analyzer.long_sentence_words = val.parse().unwrap_or(analyzer.long_sentence_words);
            }
            "analyzer.adverb_limit" => {
                analyzer.adverb_limit = val.parse().unwrap_or(analyzer.adverb_limit);
            }
            "analyzer.filler_noun_limit" => {
                analyzer.filler_noun_limit = val.parse().unwrap_or(analyzer.filler_noun_limit);
            }
            "analyzer.ignored_keys" => {
                analyzer
                    .ignored_keys
                    .extend(val.split(',').map(|k| k.trim().to_string()));
            }
            "lists.indent_width" => {
                cfg.lists.indent_width = val.parse().unwrap_or(cfg.lists.indent_width);
            }
            "lists.use_tabs" => cfg.lists.use_tabs = parse_flag(val),
            "style.typewriter" => {
                cfg.style.typewriter = if parse_flag(val) || val.eq_ignore_ascii_case("typewriter")
                {
                    TypewriterMode::Typewriter
                } else {
                    TypewriterMode::Normal
                };
            }
            "style.scope" => {
                cfg.style.scope = match val.to_lowercase().as_str() {
                    "line" => HighlightScope::Line,
                    "sentence" => HighlightScope::Sentence,
                    "paragraph" => HighlightScope::Paragraph,
                    other => bail!("unknown scope `{other}`"),
                };
            }
            "style.theme" => {
                cfg.style.theme = if val.eq_ignore_ascii_case("dark") {
                    Theme::Dark
                } else {
                    Theme::Light
                };
            }
            "style.mark_current_line" => cfg.style.mark_current_line = parse_flag(val),
            "style.fixed_scroll" => cfg.style.fixed_scroll = parse_flag(val),
            _ => debug!(key, "ignoring unknown override"),
        }
    }
    Ok(())
}

/// One-based line and column (in chars) of a byte offset.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let head = text.get(..offset).unwrap_or(text);
    let line = head.matches('\n').count() + 1;
    let line_start = head.rfind('\n').map_or(0, |i| i + 1);
    (line, head[line_start..].chars().count() + 1)
}

fn print_human_report(path: &str, text: &str, report: &StyleReport, density: f32) {
    println!(
        "{} ({} words, density {:.2}/100w)",
        style(path).bold(),
        report.word_count,
        density
    );
    if report.issues.is_empty() {
        println!("  {}", style("clean").green());
        return;
    }
    for issue in &report.issues {
        let (line, column) = line_col(text, issue.range.offset);
        let tag = match issue.severity {
            Severity::Warning => style(issue.category).red(),
            Severity::Info => style(issue.category).yellow(),
        };
        println!("  [{}] {}:{} {}", tag, line, column, issue.message);
        let snippet = issue.range.slice(text);
        if !snippet.trim().is_empty() {
            println!("      → {}", preview(snippet));
        }
        if let Some(replacement) = issue.fix.as_ref().and_then(|f| f.replacement.as_deref()) {
            println!("      fix: {:?}", replacement);
        }
    }
}
