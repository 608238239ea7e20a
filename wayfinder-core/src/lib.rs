use colored::Colorize;
use std::sync::Arc;

pub mod map;
pub mod probe;
pub mod report;
pub mod site;

/// Callback for human-readable progress lines during a run
pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

pub fn print_banner() {
    println!(
        "{}",
        r#"
 __      __              _____.__            .___
/  \    /  \_____  ___.__/ ____\__| ____    __| _/___________
\   \/\/   /\__  \<   |  \   __\|  |/    \  / __ |/ __ \_  __ \
 \        /  / __ \\___  ||  |  |  |   |  \/ /_/ \  ___/|  | \/
  \__/\  /  (____  / ____||__|  |__|___|  /\____ |\___  >__|
       \/        \/\/                   \/      \/    \/"#
            .bright_cyan()
    );
    println!(
        "  {} {}\n",
        "navigation maps & pagination probes".bright_white(),
        concat!("v", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
