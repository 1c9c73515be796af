//! Terminal output and reporting for Rustform.

use colored::Colorize;

use crate::plan::{Action, Plan};

/// Print a section banner.
pub fn banner(name: &str) {
    let header = format!("RUSTFORM [{}]", name);
    let stars = "*".repeat(80_usize.saturating_sub(header.len()));
    println!("\n{} {}", header.bright_white().bold(), stars.bright_black());
}

/// Print a planned create.
pub fn planned_create(addr: &str) {
    println!("  {} {}", "+".green().bold(), addr.bright_white());
}

/// Print a planned no-op.
pub fn planned_noop(addr: &str) {
    println!("  {} {}", "~".bright_black(), addr.bright_black());
}

/// Print a created resource.
pub fn created(addr: &str, id: &str) {
    println!(
        "{}: [{}] => {}",
        "created".yellow(),
        addr.bright_white().bold(),
        id
    );
}

/// Print an unchanged resource.
pub fn unchanged(addr: &str) {
    println!("{}: [{}]", "ok".green(), addr.bright_white().bold());
}

/// Print an output value.
pub fn output(name: &str, value: &str) {
    println!("{} = {}", name.bright_white().bold(), value.green());
}

/// Print a warning.
pub fn warning(msg: &str) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

/// Print an error.
pub fn error(msg: &str) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print a whole plan with its summary line.
pub fn plan(plan: &Plan) {
    for action in &plan.actions {
        match action {
            Action::Create { addr } => planned_create(&addr.to_string()),
            Action::Noop { addr } => planned_noop(&addr.to_string()),
        }
    }
    println!();
    summary(plan.to_add(), plan.unchanged());
}

/// Print the plan/apply recap line.
pub fn summary(added: usize, unchanged_count: usize) {
    println!(
        "{}: {}={} {}={}",
        "Plan".bright_white().bold(),
        "add".green(),
        added,
        "unchanged".bright_black(),
        unchanged_count,
    );
}
