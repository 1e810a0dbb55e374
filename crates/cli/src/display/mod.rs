use recursive_wrapper_core::{PlanReport, UpdatePlan};
use std::fmt::Write;

use crate::commands::status::BuildStatus;

pub fn print_plan(plan: &UpdatePlan) {
    println!("📋 Wrapper update plan:");
    for (index, step) in plan.describe().iter().enumerate() {
        println!("   {}. {}", index + 1, step);
    }
    println!("   Init script: {}", plan.init_script_path().display());
}

pub fn print_report(report: &PlanReport) {
    let copied: usize = report.bootstrapped.iter().map(|b| b.copied.len()).sum();
    if copied > 0 {
        println!("📄 Bootstrapped {} missing wrapper file(s)", copied);
    }
    println!("✅ Updated wrapper of {}", report.updated.join(", "));
}

/// Indented tree of builds and their wrapper distributions
pub fn format_status_tree(status: &BuildStatus) -> String {
    let mut out = String::new();
    write_status(&mut out, status, 0);
    out
}

fn write_status(out: &mut String, status: &BuildStatus, depth: usize) {
    let indent = "  ".repeat(depth);
    let icon = if depth == 0 { "📦" } else { "└─" };
    let distribution = match (&status.gradle_version, &status.distribution_type) {
        (Some(version), Some(distribution_type)) => {
            format!("Gradle {version} ({distribution_type})")
        }
        _ => "no wrapper".to_string(),
    };
    let _ = writeln!(
        out,
        "{indent}{icon} {} {} [{}]",
        status.name,
        distribution,
        status.root_dir.display()
    );
    if status.distribution_sha256_sum.is_some() {
        let _ = writeln!(out, "{indent}   🔒 checksum pinned");
    }
    if !status.missing_files.is_empty() && status.missing_files.len() < 4 {
        let _ = writeln!(
            out,
            "{indent}   ⚠️  missing {}",
            status.missing_files.join(", ")
        );
    }
    for child in &status.included_builds {
        write_status(out, child, depth + 1);
    }
}
