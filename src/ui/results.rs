use crate::search::model::SnippetResult;
use crate::ui::highlight::highlight_snippet;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::collections::HashMap;

/// Search results as a list of collapsible code blocks.
///
/// Items keep the order the service returned them in. Each block is expanded
/// until toggled; expand state is keyed by snippet id and starts over whenever
/// the result set is replaced.
#[derive(Debug, Default)]
pub struct ResultView {
    items: Vec<SnippetResult>,
    bodies: Vec<Vec<Line<'static>>>,
    expanded: HashMap<String, bool>,
    selected: usize,
    scroll: u16,
    follow_selection: bool,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every item; expand state, selection and scroll are reset
    pub fn replace(&mut self, results: Vec<SnippetResult>) {
        self.bodies = results
            .iter()
            .map(|r| highlight_snippet(&r.content, &r.file_path, r.first_line()))
            .collect();
        self.items = results;
        self.expanded.clear();
        self.selected = 0;
        self.scroll = 0;
        self.follow_selection = true;
    }

    pub fn items(&self) -> &[SnippetResult] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(true)
    }

    /// Flip one block between expanded and collapsed; returns the new state
    pub fn toggle(&mut self, id: &str) -> bool {
        let next = !self.is_expanded(id);
        self.expanded.insert(id.to_string(), next);
        next
    }

    pub fn toggle_selected(&mut self) -> Option<bool> {
        let id = self.items.get(self.selected)?.id.clone();
        self.follow_selection = true;
        Some(self.toggle(&id))
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
        self.follow_selection = true;
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.follow_selection = true;
    }

    /// Scroll by whole lines without moving the selection
    pub fn scroll_by(&mut self, delta: i32) {
        let max = i64::try_from(self.total_rows().saturating_sub(1)).unwrap_or(i64::MAX);
        let next = (i64::from(self.scroll) + i64::from(delta)).clamp(0, max);
        self.scroll = u16::try_from(next).unwrap_or(u16::MAX);
        self.follow_selection = false;
    }

    fn block_rows(&self, index: usize) -> usize {
        let body = if self.is_expanded(&self.items[index].id) {
            self.bodies[index].len()
        } else {
            0
        };
        // header + body + separator
        1 + body + 1
    }

    /// Row of the header of item `index` within the rendered lines
    pub fn header_row(&self, index: usize) -> usize {
        (0..index.min(self.items.len()))
            .map(|i| self.block_rows(i))
            .sum()
    }

    fn total_rows(&self) -> usize {
        (0..self.items.len()).map(|i| self.block_rows(i)).sum()
    }

    /// Scroll offset for a viewport of `height` rows, moved so the selected
    /// header stays visible unless the user scrolled away on purpose
    pub fn scroll_for(&mut self, height: u16) -> u16 {
        if self.follow_selection && height > 0 {
            let row = self.header_row(self.selected);
            let scroll = usize::from(self.scroll);
            let height = usize::from(height);
            let target = if row < scroll {
                row
            } else if row >= scroll + height {
                row + 1 - height
            } else {
                scroll
            };
            // Paragraph scrolling stops at u16::MAX rows
            self.scroll = u16::try_from(target).unwrap_or(u16::MAX);
        }
        self.scroll
    }

    /// Build the lines for every block. `focused` highlights the selected
    /// header.
    pub fn render_lines(&self, focused: bool) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for (i, item) in self.items.iter().enumerate() {
            let expanded = self.is_expanded(&item.id);
            let marker = if expanded { "▼ " } else { "▶ " };

            let header_style = if focused && i == self.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            };

            lines.push(Line::from(vec![
                Span::styled(marker.to_string(), header_style),
                Span::styled(item.file_path.clone(), header_style),
                Span::styled(
                    format!("  line {}", item.first_line()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));

            if expanded {
                lines.extend(self.bodies[i].iter().cloned());
            }
            lines.push(Line::from(""));
        }

        lines
    }
}
