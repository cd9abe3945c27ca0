// Human-readable walk summary

use crate::snapshot::Snapshot;

/// Generate a plain-text summary of a snapshot.
pub fn generate_summary_report(snapshot: &Snapshot) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Nodes mapped: {}\n", snapshot.mapped()));
    report.push_str(&format!("  Supernodes: {}\n", snapshot.supernodes()));
    report.push_str(&format!("  Nodes without location: {}\n", snapshot.non_mapped));
    report.push_str(&format!("  Hosts scraped: {}\n", snapshot.hosts_scraped));

    let links: usize = snapshot
        .node_info
        .iter()
        .map(|info| info.data.link_info.len())
        .sum();
    report.push_str(&format!("  Links reported: {}\n", links));

    report.push_str(&format!(
        "  Generated: {}\n",
        snapshot.date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    report
}
