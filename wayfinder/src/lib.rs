// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    load_urls_from_file, load_urls_from_source, parse_url_line, resolve_selectors, write_report,
};

pub use wayfinder_core::map::{MapOptions, SiteMap, execute_map};
pub use wayfinder_core::probe::{ProbeOptions, execute_probe};
pub use wayfinder_core::report::{ReportFormat, extract_url_path};
