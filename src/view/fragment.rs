//! Generated markup fragments for list payloads

use serde::Serialize;

/// Content of a list container: either a "no data" message or a run of
/// items
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Fragment {
    Placeholder(String),
    Items(Vec<FragmentItem>),
}

/// One card in a list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentItem {
    /// CSS class of the card
    pub class: String,
    pub heading: String,
    /// Status class for a colored dot next to the first line
    pub indicator: Option<String>,
    pub lines: Vec<String>,
}

impl Fragment {
    pub fn items(&self) -> &[FragmentItem] {
        match self {
            Fragment::Placeholder(_) => &[],
            Fragment::Items(items) => items,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Fragment::Placeholder(_))
    }

    pub fn to_html(&self) -> String {
        match self {
            Fragment::Placeholder(message) => format!("<p>{}</p>", html_escape(message)),
            Fragment::Items(items) => items.iter().map(FragmentItem::to_html).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Fragment::Placeholder(message) => message.clone(),
            Fragment::Items(items) => items
                .iter()
                .map(FragmentItem::to_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl FragmentItem {
    fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"{}\"><div><strong>{}</strong></div>",
            html_escape(&self.class),
            html_escape(&self.heading)
        );

        for (i, line) in self.lines.iter().enumerate() {
            html.push_str("<div>");
            if i == 0 {
                if let Some(status) = &self.indicator {
                    html.push_str(&format!(
                        "<span class=\"status-indicator {}\"></span>",
                        html_escape(status)
                    ));
                }
            }
            html.push_str(&html_escape(line));
            html.push_str("</div>");
        }

        html.push_str("</div>");
        html
    }

    fn to_text(&self) -> String {
        let mut text = format!("  {}", self.heading);
        for line in &self.lines {
            text.push_str("\n    ");
            text.push_str(line);
        }
        text
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
