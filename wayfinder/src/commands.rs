use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

fn url_args(cmd: clap::Command, verb: &str) -> clap::Command {
    cmd.arg(
        arg!(-u --"url" <URL>)
            .required(false)
            .help(format!("The URL to {}", verb))
            .value_parser(clap::value_parser!(Url))
            .conflicts_with("hosts-file"),
    )
    .arg(
        arg!(-H --"hosts-file" <PATH>)
            .required(false)
            .help(format!("Path to a newline-delimited file of URLs to {}", verb))
            .value_parser(clap::value_parser!(std::path::PathBuf))
            .conflicts_with("url"),
    )
    .group(
        clap::ArgGroup::new("target")
            .args(["url", "hosts-file"])
            .required(true),
    )
}

fn report_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save report to file (default: display to screen)"),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    )
    .arg(
        arg!(--"timeout" <SECS>)
            .required(false)
            .help("Seconds to wait for each page load")
            .value_parser(clap::value_parser!(u64).range(1..))
            .default_value("10"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("wayfinder")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wayfinder")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(true)
        .subcommand(report_args(url_args(
            command!("map")
                .about("Extract the navigation map of a page or collection of pages")
                .arg(
                    arg!(--"max-label" <CHARS>)
                        .required(false)
                        .help("Longest text, in characters, that still counts as a label")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                ),
            "map",
        )))
        .subcommand(report_args(url_args(
            command!("probe")
                .about("Detect whether listing pages paginate, and how")
                .arg(
                    arg!(-s --"selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector for a 'next' control; repeat to try several in order")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of pages probed concurrently")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"transitions" <NUM>)
                        .required(false)
                        .help("Number of 'next' clicks to attempt")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                ),
            "probe",
        )))
}
