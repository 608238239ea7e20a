use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;
use wayfinder_core::ProgressCallback;
use wayfinder_core::map::{MapOptions, execute_map};
use wayfinder_core::probe::{ProbeOptions, execute_probe};
use wayfinder_core::report::{ReportFormat, render_map_report, render_probe_report};
use wayfinder_scanner::{ProbeConfig, default_next_selectors};

// Helper functions for the map and probe handlers

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    debug!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{}  Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// User-supplied selectors, or the built-in "next" selectors when none were given
pub fn resolve_selectors(selectors: Vec<String>) -> Vec<String> {
    if selectors.is_empty() {
        default_next_selectors()
    } else {
        selectors
    }
}

/// Print the report, or save it when an output path was given. `~` is expanded.
pub fn write_report(report: &str, output: Option<&str>) -> anyhow::Result<Option<PathBuf>> {
    let Some(output) = output else {
        print!("{}", report);
        return Ok(None);
    };

    let path = PathBuf::from(shellexpand::tilde(output).as_ref());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, report).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), msg);
    std::process::exit(1);
}

fn load_targets(sub_matches: &ArgMatches) -> Vec<String> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    load_urls_from_source(url, hosts_file).unwrap_or_else(|e| fail(e))
}

fn report_format(sub_matches: &ArgMatches) -> ReportFormat {
    sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

fn progress_printer(quiet: bool) -> Option<ProgressCallback> {
    if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            eprintln!("{}", msg);
        }))
    }
}

fn finish(report: &str, output: Option<&String>, quiet: bool) {
    match write_report(report, output.map(String::as_str)) {
        Ok(Some(path)) if !quiet => {
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        Ok(_) => {}
        Err(e) => fail(format!("{:#}", e)),
    }
}

pub async fn handle_map(sub_matches: &ArgMatches, quiet: bool) {
    let urls = load_targets(sub_matches);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let max_label_chars = *sub_matches.get_one::<usize>("max-label").unwrap_or(&20);
    let format = report_format(sub_matches);

    if !quiet {
        print_divider();
        println!("{}", "  NAVIGATION MAP".bright_white().bold());
        print_divider();
        println!("{} Pages: {}", "→".blue(), urls.len());
        println!("{} Label limit: {} chars", "→".blue(), max_label_chars);
        println!("{} Timeout: {}s\n", "→".blue(), timeout_secs);
    }

    let options = MapOptions {
        urls,
        timeout_secs,
        max_label_chars,
        show_progress_bars: !quiet,
    };

    let maps = execute_map(options, progress_printer(quiet))
        .await
        .unwrap_or_else(|e| fail(format!("Map failed: {}", e)));

    if !quiet {
        println!("\n{} Map complete!\n", "✓".green().bold());
    }

    let report = render_map_report(&maps, format).unwrap_or_else(|e| fail(e));
    finish(&report, sub_matches.get_one::<String>("output"), quiet);
}

pub async fn handle_probe(sub_matches: &ArgMatches, quiet: bool) {
    let urls = load_targets(sub_matches);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let transitions = *sub_matches.get_one::<usize>("transitions").unwrap_or(&2);
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&4);
    let selectors = resolve_selectors(
        sub_matches
            .get_many::<String>("selector")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    );
    let format = report_format(sub_matches);

    if !quiet {
        print_divider();
        println!("{}", "  PAGINATION PROBE".bright_white().bold());
        print_divider();
        println!("{} Pages: {}", "→".blue(), urls.len());
        println!("{} Selectors: {}", "→".blue(), selectors.len());
        println!("{} Workers: {}", "→".blue(), threads);
        println!("{} Transitions: {}\n", "→".blue(), transitions);
    }

    let config = ProbeConfig::default()
        .with_load_timeout(Duration::from_secs(timeout_secs))
        .with_max_transitions(transitions);
    let options = ProbeOptions {
        urls,
        selectors,
        config,
        concurrency: threads,
        show_progress_bars: !quiet,
    };

    let results = execute_probe(options, progress_printer(quiet))
        .await
        .unwrap_or_else(|e| fail(format!("Probe failed: {}", e)));

    if !quiet {
        println!("\n{} Probe complete!\n", "✓".green().bold());
    }

    let report = render_probe_report(&results, format).unwrap_or_else(|e| fail(e));
    finish(&report, sub_matches.get_one::<String>("output"), quiet);
}
