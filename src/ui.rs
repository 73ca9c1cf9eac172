use console::{strip_ansi_codes, Term};
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use std::default::Default;
use std::time::Duration;

use pdfdesk_protocol::api::DocumentMetadata;

use crate::catalog::{CatalogView, EMPTY_MESSAGE, LOADING_MESSAGE};
use crate::preview::PreviewView;
use crate::upload::UploadView;

/// Terminal rendering for the workspace panes
pub struct UI {
    term: Term,
}

impl UI {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Helper method to conditionally apply color based on terminal support
    fn colorize<F>(&self, text: &str, color_fn: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if self.supports_color() {
            color_fn(text)
        } else {
            text.to_string()
        }
    }

    /// Print a success message (color only if supported)
    pub fn success(&self, message: &str) {
        let output = self.colorize(message, |m| m.green().bold().to_string());
        println!("{}", output);
    }

    /// Print an error message (color only if supported)
    pub fn error(&self, message: &str) {
        let output = self.colorize(message, |m| m.red().bold().to_string());
        eprintln!("{}", output);
    }

    pub fn warning(&self, message: &str) {
        let output = self.colorize(message, |m| m.yellow().bold().to_string());
        println!("{}", output);
    }

    pub fn blank_line(&self) {
        println!();
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        let term_width = self.width();
        let title_len = title.width() + 4;
        let line_len = if term_width > title_len {
            (term_width - title_len) / 2
        } else {
            0
        };

        let line = "═".repeat(line_len.min(40));

        println!();
        if self.supports_color() {
            println!("{} {} {}", line.cyan(), title.cyan().bold(), line.cyan());
        } else {
            println!("{} {} {}", line, title, line);
        }
        println!();
    }

    pub fn separator(&self) {
        let line = "─".repeat(self.width().min(80));
        if self.supports_color() {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    /// Create a card-style display for information
    pub fn card(&self, title: &str, content: Vec<(&str, String)>) {
        let card_width = self.width().saturating_sub(4).clamp(50, 80);
        let supports_color = self.supports_color();

        println!("╭{}╮", "─".repeat(card_width - 2));
        let title_spaces = card_width.saturating_sub(title.width() + 4);
        if supports_color {
            println!("│ {} {}│", title.cyan().bold(), " ".repeat(title_spaces));
        } else {
            println!("│ {} {}│", title, " ".repeat(title_spaces));
        }
        println!("├{}┤", "─".repeat(card_width - 2));

        for (label, value) in content {
            // Width is measured on the plain text; values may carry color
            let label_width = strip_ansi_codes(label).width();
            let value_width = strip_ansi_codes(&value).width();
            let content_width = label_width + value_width + 4;

            let spaces = if content_width < card_width - 1 {
                card_width - content_width - 1
            } else {
                1
            };

            if supports_color {
                println!("│ {}: {}{}│", label.dimmed(), value, " ".repeat(spaces));
            } else {
                println!("│ {}: {}{}│", label, value, " ".repeat(spaces));
            }
        }

        println!("╰{}╯", "─".repeat(card_width - 2));
        println!();
    }

    /// Upload zone: prompt line plus the inline error, if any
    pub fn upload_zone(&self, view: &UploadView) {
        let prompt = if view.is_dragging {
            self.colorize(view.prompt, |m| m.cyan().bold().to_string())
        } else {
            self.colorize(view.prompt, |m| m.dimmed().to_string())
        };
        println!("{}", prompt);
        if let Some(error) = &view.error {
            self.error(error);
        }
    }

    /// Document list with the selected entry marked
    pub fn catalog(&self, view: &CatalogView<'_>) {
        match view {
            CatalogView::Error(message) => self.error(message),
            _ => {
                for (index, line) in catalog_lines(view).into_iter().enumerate() {
                    let selected = matches!(
                        view,
                        CatalogView::List(entries) if entries.get(index).is_some_and(|e| e.selected)
                    );
                    if selected {
                        println!("{}", self.colorize(&line, |m| m.green().bold().to_string()));
                    } else {
                        println!("{}", line);
                    }
                }
            }
        }
    }

    pub fn preview(&self, view: &PreviewView) {
        match view {
            PreviewView::Placeholder(message) => {
                println!("{}", self.colorize(message, |m| m.dimmed().to_string()));
            }
            PreviewView::Document(preview) => {
                self.card(
                    &preview.title,
                    vec![
                        ("Page", preview.render.page_number.to_string()),
                        ("Source", preview.render.source.clone()),
                        (preview.download.label, preview.download.href.clone()),
                    ],
                );
            }
        }
    }

    /// Get terminal width for responsive layout
    pub fn width(&self) -> usize {
        self.term.size().1 as usize
    }

    pub fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain lines for a catalog view, one per entry
pub fn catalog_lines(view: &CatalogView<'_>) -> Vec<String> {
    match view {
        CatalogView::Loading => vec![LOADING_MESSAGE.to_string()],
        CatalogView::Error(message) => vec![message.to_string()],
        CatalogView::Empty => vec![EMPTY_MESSAGE.to_string()],
        CatalogView::List(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let marker = if entry.selected { '>' } else { ' ' };
                format!(
                    "{} {:>2}. {}  {}",
                    marker,
                    index + 1,
                    entry.document.filename,
                    entry.document.size_label()
                )
            })
            .collect(),
    }
}

/// Card rows describing one record
pub fn document_rows(document: &DocumentMetadata) -> Vec<(&'static str, String)> {
    vec![
        ("ID", document.id.clone()),
        ("Filename", document.filename.clone()),
        ("Size", document.size_label()),
        ("Content type", document.content_type.clone()),
        ("Uploaded", format_uploaded_at(document)),
    ]
}

/// Upload time in local time, or the raw value when it is not RFC 3339
pub fn format_uploaded_at(document: &DocumentMetadata) -> String {
    match document.uploaded_at_parsed() {
        Some(at) => at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => document.uploaded_at.clone(),
    }
}

/// Spinner shown while a request is in flight
pub fn create_spinner(message: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .template("{spinner:.cyan} [{elapsed_precise:.dim}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
