//! Document model and page layout for the PDF renderer
//!
//! Two input shapes are accepted. Structured sections are the primary one;
//! flat text with `PAGE <n>` marker lines is adapted into one section per
//! slice, each starting on a fresh page.

use std::sync::OnceLock;

use regex::Regex;

use super::fonts::text_width;
use super::{ReportContent, EXECUTIVE_SUMMARY_HEADING, REPORT_TITLE};
use report_agent::summary::Domain;

/// US letter, in points
pub(crate) const PAGE_WIDTH: f32 = 612.0;
pub(crate) const PAGE_HEIGHT: f32 = 792.0;
pub(crate) const MARGIN: f32 = 72.0;

/// A heading followed by a body paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
    /// Start this section at the top of a new page
    pub page_break_before: bool,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
            page_break_before: false,
        }
    }

    fn on_new_page(mut self) -> Self {
        self.page_break_before = true;
        self
    }
}

/// Input accepted by the PDF renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Title block followed by ordered sections
    Structured {
        title: String,
        subtitle: Option<String>,
        sections: Vec<Section>,
    },
    /// Pre-formatted text with `PAGE <n>` marker lines
    Marked(String),
}

impl DocumentInput {
    /// Title block, optional executive summary, then sales and marketing
    pub fn from_report(content: &ReportContent) -> Self {
        let mut sections = Vec::new();

        if let Some(summary) = &content.executive_summary {
            sections.push(Section::new(EXECUTIVE_SUMMARY_HEADING, summary.clone()));
        }
        sections.push(Section::new(
            format!("1. {}", Domain::Sales.heading()),
            content.sales.clone(),
        ));
        sections.push(Section::new(
            format!("2. {}", Domain::Marketing.heading()),
            content.marketing.clone(),
        ));

        DocumentInput::Structured {
            title: REPORT_TITLE.to_string(),
            subtitle: Some(format!("Report Date: {}", content.date_stamp())),
            sections,
        }
    }

    /// Convert the marker shape into the structured shape
    pub fn into_structured(self) -> (String, Option<String>, Vec<Section>) {
        match self {
            DocumentInput::Structured {
                title,
                subtitle,
                sections,
            } => (title, subtitle, sections),
            DocumentInput::Marked(text) => {
                let sections = split_marked_pages(&text)
                    .into_iter()
                    .enumerate()
                    .map(|(i, body)| {
                        let section = Section::new("", body);
                        if i > 0 {
                            section.on_new_page()
                        } else {
                            section
                        }
                    })
                    .collect();
                (String::new(), None, sections)
            }
        }
    }
}

fn page_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*PAGE[ \t]*\d+[ \t]*\r?$").expect("page marker pattern is valid")
    })
}

/// Split flat text on `PAGE <n>` marker lines, trimming each slice
pub fn split_marked_pages(text: &str) -> Vec<String> {
    page_marker()
        .split(text)
        .map(|page| page.trim().to_string())
        .collect()
}

/// Font face used for a laid-out line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Face {
    Regular,
    Bold,
}

/// Text style: face, size and line height in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Style {
    pub face: Face,
    pub size: f32,
    pub leading: f32,
}

pub(crate) const TITLE: Style = Style {
    face: Face::Bold,
    size: 18.0,
    leading: 22.0,
};

pub(crate) const HEADING: Style = Style {
    face: Face::Bold,
    size: 12.0,
    leading: 16.0,
};

pub(crate) const BODY: Style = Style {
    face: Face::Regular,
    size: 10.0,
    leading: 12.0,
};

/// A line of text placed on a page; `y` is the baseline from the page bottom
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedLine {
    pub text: String,
    pub style: Style,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Flows lines top to bottom, opening a new page when the current one is full
struct Paginator {
    pages: Vec<Page>,
    used: f32,
}

impl Paginator {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            used: 0.0,
        }
    }

    fn usable_height() -> f32 {
        PAGE_HEIGHT - 2.0 * MARGIN
    }

    fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.used = 0.0;
    }

    fn space(&mut self, points: f32) {
        // Vertical space at the top of a page is dropped
        if self.used > 0.0 {
            self.used += points;
        }
    }

    fn line(&mut self, text: String, style: Style) {
        if self.used > 0.0 && self.used + style.leading > Self::usable_height() {
            self.break_page();
        }

        let y = PAGE_HEIGHT - MARGIN - self.used - style.size;
        self.used += style.leading;

        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                text,
                style,
                x: MARGIN,
                y,
            });
        }
    }

    fn paragraph(&mut self, text: &str, style: Style) {
        for raw_line in text.lines() {
            if raw_line.trim().is_empty() {
                self.space(style.leading);
                continue;
            }
            for wrapped in wrap(raw_line, style, line_width()) {
                self.line(wrapped, style);
            }
        }
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Lay the document out into pages
pub(crate) fn layout(input: DocumentInput) -> Vec<Page> {
    let (title, subtitle, sections) = input.into_structured();
    let mut pager = Paginator::new();

    if !title.is_empty() {
        pager.paragraph(&title, TITLE);
        pager.space(12.0);
    }
    if let Some(subtitle) = subtitle {
        pager.paragraph(&subtitle, BODY);
        pager.space(24.0);
    }

    for section in sections {
        if section.page_break_before {
            pager.break_page();
        }
        if !section.heading.is_empty() {
            pager.paragraph(&section.heading, HEADING);
            pager.space(6.0);
        }
        pager.paragraph(&section.body, BODY);
        pager.space(24.0);
    }

    pager.finish()
}

/// Horizontal room between the margins
pub(crate) fn line_width() -> f32 {
    PAGE_WIDTH - 2.0 * MARGIN
}

/// Greedy word wrap by measured glyph width; words wider than a line are split
pub(crate) fn wrap(text: &str, style: Style, max_width: f32) -> Vec<String> {
    let fits = |s: &str| text_width(s, style) <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{} {}", current, word);
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if fits(word) {
            current.push_str(word);
            continue;
        }
        for c in word.chars() {
            current.push(c);
            if current.chars().count() > 1 && !fits(&current) {
                current.pop();
                lines.push(std::mem::replace(&mut current, c.to_string()));
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn page_text(page: &Page) -> String {
        page.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_split_marked_pages() {
        let text = "Intro\n  page 2  \nMiddle part\nPAGE 2\n\n  Closing words  \n";
        let pages = split_marked_pages(text);
        assert_eq!(pages, vec!["Intro", "Middle part", "Closing words"]);
    }

    #[test]
    fn test_split_without_markers() {
        assert_eq!(split_marked_pages("  just text \n"), vec!["just text"]);
    }

    #[test]
    fn test_marker_must_be_own_line() {
        let pages = split_marked_pages("See PAGE 2 for details\nmore");
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_marked_layout_starts_new_pages() {
        let input = DocumentInput::Marked("First\nPAGE 2\nSecond\npage 3\nThird".to_string());
        let pages = layout(input);
        assert_eq!(pages.len(), 3);
        assert_eq!(page_text(&pages[0]), "First");
        assert_eq!(page_text(&pages[1]), "Second");
        assert_eq!(page_text(&pages[2]), "Third");
    }

    #[test]
    fn test_structured_section_order() {
        let content = ReportContent::new(
            NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
            "Revenue grew 5%.",
            "Clicks doubled.",
        )
        .with_executive_summary(Some("Solid day."));

        let pages = layout(DocumentInput::from_report(&content));
        assert_eq!(pages.len(), 1);

        let text = page_text(&pages[0]);
        let order = [
            "Daily Company Performance Report",
            "Report Date: 2025-08-26",
            "Executive Summary",
            "Solid day.",
            "1. Sales Performance Summary",
            "Revenue grew 5%.",
            "2. Marketing Campaign Summary",
            "Clicks doubled.",
        ];
        let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_executive_summary_is_optional() {
        let content = ReportContent::new(
            NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
            "a",
            "b",
        );
        let pages = layout(DocumentInput::from_report(&content));
        assert!(!page_text(&pages[0]).contains(EXECUTIVE_SUMMARY_HEADING));
    }

    #[test]
    fn test_long_body_flows_onto_new_pages() {
        let body = (0..200)
            .map(|i| format!("Paragraph line {} with some analysis.", i))
            .collect::<Vec<_>>()
            .join("\n");
        let content = ReportContent::new(NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(), body, "b");

        let pages = layout(DocumentInput::from_report(&content));
        assert!(pages.len() >= 4);
        for page in &pages {
            for line in &page.lines {
                assert!(line.y >= MARGIN - line.style.size);
                assert!(line.y <= PAGE_HEIGHT - MARGIN);
            }
        }
        assert!(page_text(pages.last().unwrap()).contains("2. Marketing Campaign Summary"));
    }

    fn right_edges_within_margin(pages: &[Page]) -> bool {
        pages.iter().flat_map(|p| &p.lines).all(|line| {
            line.x + text_width(&line.text, line.style) <= PAGE_WIDTH - MARGIN + 1e-3
        })
    }

    #[test]
    fn test_wrap() {
        // "the quick" is 40.02pt at 10pt Helvetica
        assert_eq!(
            wrap("the quick brown fox", BODY, 45.0),
            vec!["the quick", "brown fox"]
        );
        // Each W is 9.44pt
        assert_eq!(wrap("WWWWWWW", BODY, 30.0), vec!["WWW", "WWW", "W"]);
        assert_eq!(wrap("   ", BODY, 100.0), Vec::<String>::new());
    }

    #[test]
    fn test_wide_glyphs_stay_inside_margin() {
        let caps = "TOTAL REVENUE WAS UP SHARPLY ACROSS ALL REGIONS WITH NEW DEALS CLOSED \
                    IN EMEA AND APAC MARKETS TODAY";
        let digits = (0..60)
            .map(|i| format!("{:08}", i * 1_234_567))
            .collect::<Vec<_>>()
            .join(" ");
        let wide = "WMWMWMWMWM ".repeat(40);
        let unbroken = "W".repeat(200);

        for body in [caps.to_string(), digits, wide, unbroken] {
            let content = ReportContent::new(
                NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
                body.clone(),
                body.clone(),
            )
            .with_executive_summary(Some(body.to_uppercase()));
            let pages = layout(DocumentInput::from_report(&content));
            assert!(right_edges_within_margin(&pages), "overflow for {:?}", body);

            let marked = layout(DocumentInput::Marked(format!("{}\nPAGE 2\n{}", body, body)));
            assert!(right_edges_within_margin(&marked));
        }
    }

    #[test]
    fn test_caps_line_wraps_earlier_than_lowercase() {
        let lower = "total revenue was up sharply across all regions with new deals closed \
                     in emea and apac markets today";
        assert_eq!(wrap(lower, BODY, line_width()).len(), 1);
        assert_eq!(wrap(&lower.to_uppercase(), BODY, line_width()).len(), 2);
    }
}
