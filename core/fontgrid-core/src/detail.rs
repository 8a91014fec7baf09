//! Detail panel text for the selected entry (made by FontLab https://www.fontlab.com/)

use crate::entry::FontEntry;
use crate::tags::axis_label;

/// Axis lines shown before the summary is cut short.
pub const MAX_AXIS_LINES: usize = 15;
/// Tags shown in the compact tag line.
pub const MAX_AXIS_TAGS: usize = 15;

pub const NO_SELECTION: &str = "フォント未選択";
pub const SYSTEM_KIND: &str = "システムフォント";
pub const FOLDER_KIND: &str = "外部フォント";
pub const NO_AXES: &str = "可変フォント軸はありません";

/// The three labels of the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub name: String,
    pub kind: String,
    pub axes: String,
}

impl DetailPanel {
    pub fn for_selection(entry: Option<&FontEntry>) -> Self {
        match entry {
            None => Self {
                name: NO_SELECTION.to_string(),
                kind: String::new(),
                axes: String::new(),
            },
            Some(entry) => Self {
                name: entry.display_name().to_string(),
                kind: if entry.is_system_font() { SYSTEM_KIND } else { FOLDER_KIND }.to_string(),
                axes: axis_summary(entry),
            },
        }
    }
}

/// One `"<tag> <label> <min>-<max>"` line per axis.
///
/// Past [`MAX_AXIS_LINES`] the last shown line ends in `...`.
pub fn axis_summary(entry: &FontEntry) -> String {
    if entry.axis_tags().is_empty() {
        return NO_AXES.to_string();
    }
    let lines: Vec<String> = entry
        .axis_ranges()
        .iter()
        .take(MAX_AXIS_LINES)
        .map(|range| {
            let label = axis_label(&range.tag).unwrap_or(range.tag.as_str());
            format!("{} {} {:.1}-{:.1}", range.tag, label, range.min, range.max)
        })
        .collect();
    let mut summary = lines.join("\n");
    if entry.axis_ranges().len() > MAX_AXIS_LINES {
        summary.push_str("...");
    }
    summary
}

/// Space-separated axis tags; empty for static fonts.
pub fn axis_tag_line(entry: &FontEntry) -> String {
    let tags = entry.axis_tags();
    let mut line = tags
        .iter()
        .take(MAX_AXIS_TAGS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    if tags.len() > MAX_AXIS_TAGS {
        line.push_str(" ...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AxisData, AxisRange};

    fn axes(tags: &[(&str, f32, f32)]) -> AxisData {
        AxisData {
            tags: tags.iter().map(|(t, _, _)| t.to_string()).collect(),
            ranges: tags
                .iter()
                .map(|(t, min, max)| AxisRange {
                    tag: t.to_string(),
                    min: *min,
                    max: *max,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_selection() {
        let panel = DetailPanel::for_selection(None);
        assert_eq!(panel.name, NO_SELECTION);
        assert!(panel.kind.is_empty() && panel.axes.is_empty());
    }

    #[test]
    fn static_font_has_no_axes() {
        let entry = FontEntry::system("Arial", AxisData::default());
        let panel = DetailPanel::for_selection(Some(&entry));
        assert_eq!(panel.kind, SYSTEM_KIND);
        assert_eq!(panel.axes, NO_AXES);
        assert_eq!(axis_tag_line(&entry), "");
    }

    #[test]
    fn axis_lines_use_labels_and_one_decimal() {
        let entry = FontEntry::folder(
            "Roboto Flex",
            "/f/RobotoFlex.ttf",
            axes(&[("wght", 100.0, 1000.0), ("ZZZZ", 0.0, 1.5)]),
        );
        let panel = DetailPanel::for_selection(Some(&entry));
        assert_eq!(panel.kind, FOLDER_KIND);
        assert_eq!(panel.axes, "wght Weight 100.0-1000.0\nZZZZ ZZZZ 0.0-1.5");
        assert_eq!(axis_tag_line(&entry), "wght ZZZZ");
    }

    #[test]
    fn long_axis_lists_are_truncated() {
        let many: Vec<(String, f32, f32)> =
            (0..17).map(|i| (format!("A{i:03}"), 0.0, 1.0)).collect();
        let refs: Vec<(&str, f32, f32)> =
            many.iter().map(|(t, a, b)| (t.as_str(), *a, *b)).collect();
        let entry = FontEntry::system("Many", axes(&refs));

        let summary = axis_summary(&entry);
        assert_eq!(summary.lines().count(), MAX_AXIS_LINES);
        assert_eq!(summary.lines().last(), Some("A014 A014 0.0-1.0..."));
        assert!(axis_tag_line(&entry).ends_with("A014 ..."));
    }

    #[test]
    fn exactly_fifteen_axes_are_not_marked() {
        let many: Vec<String> = (0..MAX_AXIS_LINES).map(|i| format!("B{i:03}")).collect();
        let refs: Vec<(&str, f32, f32)> = many.iter().map(|t| (t.as_str(), 1.0, 2.0)).collect();
        let entry = FontEntry::system("Fifteen", axes(&refs));

        let summary = axis_summary(&entry);
        assert_eq!(summary.lines().count(), MAX_AXIS_LINES);
        assert!(!summary.contains("..."));
        assert!(!axis_tag_line(&entry).contains("..."));
    }
}
