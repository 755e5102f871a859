use ratatui::prelude::*;

use crate::core::cluster::{Capability, CapabilityFlags};

/// Badge for one capability: green when in use, cyan when only present
pub fn capability_span(flags: &CapabilityFlags, capability: Capability) -> Span<'static> {
    let label = capability.label();
    if flags.using(capability) {
        Span::styled(
            format!("{}*", label),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else if flags.has(capability) {
        Span::styled(label.to_string(), Style::default().fg(Color::Cyan))
    } else {
        Span::styled("-".repeat(label.len()), Style::default().fg(Color::DarkGray))
    }
}

pub fn capability_line(flags: &CapabilityFlags) -> Line<'static> {
    let mut spans = Vec::with_capacity(Capability::ALL.len() * 2);
    for capability in Capability::ALL {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(capability_span(flags, capability));
    }
    Line::from(spans)
}

/// Get color for a YARN node state
pub fn state_color(state: &str) -> Color {
    match state {
        "RUNNING" => Color::Green,
        "NEW" | "DECOMMISSIONING" => Color::LightYellow,
        "UNHEALTHY" | "LOST" => Color::Red,
        "DECOMMISSIONED" | "SHUTDOWN" | "REBOOTED" => Color::DarkGray,
        _ => Color::White,
    }
}

/// Format megabytes for the node table
pub fn format_mb(mb: f64) -> String {
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else {
        format!("{:.0} MB", mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mb() {
        assert_eq!(format_mb(512.0), "512 MB");
        assert_eq!(format_mb(6144.0), "6.0 GB");
    }

    #[test]
    fn test_capability_badges() {
        let flags = CapabilityFlags {
            has_cpu: true,
            using_cpu: true,
            has_gpu: true,
            ..Default::default()
        };
        let line = capability_line(&flags);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "CPU* GPU ----");
    }
}
