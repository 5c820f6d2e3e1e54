// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotgroup_domain::{Plot, PreviewGroup, UngroupedPlot};
use serde::Serialize;
use std::fmt::Write;

/// One label/value line of a popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupRow {
    pub label: String,
    pub value: String,
}

/// Structured popup content; rendered to HTML only at the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupContent {
    pub title: String,
    pub rows: Vec<PopupRow>,
}

impl PopupContent {
    fn new(title: String) -> Self {
        Self {
            title,
            rows: Vec::new(),
        }
    }

    fn row(mut self, label: &str, value: String) -> Self {
        self.rows.push(PopupRow {
            label: label.to_string(),
            value,
        });
        self
    }

    /// Returns the value of the first row with this label.
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }

    /// Renders the popup as an HTML fragment. All text is escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html: String = format!(
            "<div class=\"plot-popup\"><h4>{}</h4><dl>",
            escape_html(&self.title)
        );
        for row in &self.rows {
            let _ = write!(
                html,
                "<dt>{}</dt><dd>{}</dd>",
                escape_html(&row.label),
                escape_html(&row.value)
            );
        }
        html.push_str("</dl></div>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped: String = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn with_plot_rows(content: PopupContent, plot: &Plot) -> PopupContent {
    let parcel: String = match (plot.so_thua, plot.so_to) {
        (Some(thua), Some(to)) => format!("Parcel {thua}, sheet {to}"),
        (Some(thua), None) => format!("Parcel {thua}"),
        (None, Some(to)) => format!("Sheet {to}"),
        (None, None) => String::from("Unknown"),
    };
    content
        .row(
            "Farmer",
            plot.farmer_name
                .clone()
                .unwrap_or_else(|| String::from("Unknown")),
        )
        .row("Area", format!("{:.2} ha", plot.area_ha))
        .row(
            "Planting date",
            plot.planting_date
                .map_or_else(|| String::from("Not recorded"), |d| d.to_string()),
        )
        .row("Cadastral", parcel)
}

/// Popup for a plot inside a group.
#[must_use]
pub fn group_plot_popup(group: &PreviewGroup, plot: &Plot) -> PopupContent {
    let supervisor: String = group
        .supervisor
        .as_ref()
        .map_or_else(|| String::from("Unassigned"), |s| s.full_name.clone());
    with_plot_rows(PopupContent::new(format!("Plot {}", plot.plot_id)), plot)
        .row(
            "Group",
            format!("{} (#{})", group.group_name, group.group_number),
        )
        .row("Supervisor", supervisor)
}

/// Popup for an ungrouped plot.
#[must_use]
pub fn ungrouped_plot_popup(ungrouped: &UngroupedPlot) -> PopupContent {
    let mut content: PopupContent = with_plot_rows(
        PopupContent::new(format!("Ungrouped plot {}", ungrouped.plot.plot_id)),
        &ungrouped.plot,
    )
    .row("Reason", ungrouped.reason.label().to_string());

    if !ungrouped.reason_description.is_empty() {
        content = content.row("Details", ungrouped.reason_description.clone());
    }
    if let Some(distance) = ungrouped.distance_to_nearest_group {
        content = content.row("Nearest group", format!("{distance:.0} m"));
    }
    if !ungrouped.nearby_groups.is_empty() {
        let nearby: Vec<String> = ungrouped
            .nearby_groups
            .iter()
            .map(|g| {
                format!(
                    "{} (#{}, {:.0} m)",
                    g.group_name, g.group_number, g.distance_meters
                )
            })
            .collect();
        content = content.row("Nearby groups", nearby.join(", "));
    }
    if !ungrouped.suggestions.is_empty() {
        content = content.row("Suggestions", ungrouped.suggestions.join("; "));
    }
    content
}
