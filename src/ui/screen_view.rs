use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::focus::graph::FocusableSection;
use crate::focus::tree::{Element, ElementId, ElementTree, Scope, SectionId};
use crate::route::ModalKind;
use crate::ui::layout::{self, KioskLayout};
use crate::ui::theme::Theme;

/// Full-frame widget for the kiosk display: header, sectioned element list,
/// hint footer, and the modal overlay when one is open.
pub struct ScreenView<'a> {
    pub title: &'a str,
    pub tree: &'a ElementTree,
    pub sections: &'a [FocusableSection],
    pub focused: Option<ElementId>,
    pub modal: Option<ModalKind>,
    /// Countdown shown inside the idle-warning interstitial.
    pub warning_remaining: Option<Duration>,
    pub volume_label: &'a str,
    /// Count of silently swallowed synthesis failures, surfaced for staff.
    pub muted_failures: usize,
    pub large_text: bool,
    pub low_screen: bool,
    pub theme: &'a Theme,
}

impl ScreenView<'_> {
    fn section_label(&self, id: Option<SectionId>) -> Option<&str> {
        let id = id?;
        self.sections
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.label.as_str())
    }

    fn element_style(&self, element: &Element) -> Style {
        let colors = &self.theme.colors;
        if Some(element.id) == self.focused {
            Style::default()
                .fg(colors.focus_fg())
                .bg(colors.focus_bg())
                .add_modifier(Modifier::BOLD)
        } else if !element.interactive {
            Style::default().fg(colors.fg())
        } else if !element.enabled {
            Style::default().fg(colors.disabled())
        } else {
            Style::default().fg(colors.fg())
        }
    }

    /// One line per element, with a section title line wherever the section
    /// marker changes.
    fn scope_lines(&self, scope: Scope) -> Vec<Line<'_>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();
        let mut last_section: Option<Option<SectionId>> = None;

        for element in self.tree.elements.iter().filter(|e| e.scope == scope) {
            if !element.visible {
                continue;
            }
            if last_section != Some(element.section) {
                last_section = Some(element.section);
                if let Some(label) = self.section_label(element.section) {
                    if !lines.is_empty() {
                        lines.push(Line::from(""));
                    }
                    lines.push(Line::from(Span::styled(
                        format!(" {label}"),
                        Style::default()
                            .fg(colors.section_title())
                            .add_modifier(Modifier::BOLD),
                    )));
                }
            }

            let marker = if Some(element.id) == self.focused {
                " > "
            } else {
                "   "
            };
            lines.push(Line::from(Span::styled(
                format!("{marker}{}", element.label),
                self.element_style(element),
            )));
            if self.large_text {
                lines.push(Line::from(""));
            }
        }
        lines
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut info = format!(" | volume {}", self.volume_label);
        if self.muted_failures > 0 {
            info.push_str(&format!(" | audio issues: {}", self.muted_failures));
        }
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                info,
                Style::default()
                    .fg(colors.disabled())
                    .bg(colors.header_bg()),
            ),
        ]))
        .style(Style::default().bg(colors.header_bg()));
        header.render(area, buf);
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let hints = [
            "[arrows] Move",
            "[enter] Select",
            "[esc] Back",
            "[h] Home",
            "[r] Repeat",
            "[?] Help",
        ];
        let packed = layout::pack_hint_lines(&hints, area.width as usize);
        let lines: Vec<Line> = packed
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.disabled()))))
            .collect();
        Paragraph::new(lines).render(area, buf);
    }

    fn render_modal(&self, kind: ModalKind, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = layout::centered_rect(60, 50, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(format!(" {} ", kind.title()))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = self.scope_lines(Scope::Modal);
        if kind == ModalKind::IdleWarning {
            if let Some(remaining) = self.warning_remaining {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(" Resetting in {} seconds", remaining.as_secs()),
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )));
            }
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

impl Widget for &ScreenView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Block::default()
            .style(Style::default().bg(colors.bg()))
            .render(area, buf);

        let layout = KioskLayout::new(area, self.low_screen);
        self.render_header(layout.header, buf);

        let body = Paragraph::new(self.scope_lines(Scope::Main))
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
        body.render(layout.body, buf);

        self.render_footer(layout.footer, buf);

        if let Some(kind) = self.modal {
            self.render_modal(kind, layout.body, buf);
        }
    }
}
