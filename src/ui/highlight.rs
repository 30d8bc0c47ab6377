use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const THEME_NAME: &str = "base16-ocean.dark";
const TAB_WIDTH: usize = 4;

// Extensions missing from the bundled syntax set, mapped to the closest one it has
const EXTENSION_ALIASES: &[(&str, &str)] = &[
    ("ts", "js"),
    ("tsx", "js"),
    ("jsx", "js"),
    ("mjs", "js"),
    ("cjs", "js"),
    ("kt", "java"),
    ("kts", "java"),
    ("toml", "ini"),
];

struct SyntaxAssets {
    syntaxes: SyntaxSet,
    theme: Option<Theme>,
}

static ASSETS: Lazy<SyntaxAssets> = Lazy::new(|| {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(THEME_NAME)
        .or_else(|| themes.themes.values().next())
        .cloned();
    SyntaxAssets {
        syntaxes: SyntaxSet::load_defaults_newlines(),
        theme,
    }
});

/// Lowercased file extension used to pick a highlighting language
pub fn language_for(file_path: &str) -> Option<String> {
    Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

fn syntax_for<'a>(syntaxes: &'a SyntaxSet, file_path: &str) -> &'a SyntaxReference {
    let Some(ext) = language_for(file_path) else {
        return syntaxes.find_syntax_plain_text();
    };

    syntaxes
        .find_syntax_by_extension(&ext)
        .or_else(|| {
            EXTENSION_ALIASES
                .iter()
                .find(|(from, _)| *from == ext)
                .and_then(|(_, to)| syntaxes.find_syntax_by_extension(to))
        })
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
}

/// Name of the syntax used for `file_path` ("Plain Text" when unknown)
pub fn syntax_name(file_path: &str) -> String {
    syntax_for(&ASSETS.syntaxes, file_path).name.clone()
}

fn to_ratatui_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn clean(text: &str) -> String {
    text.trim_end_matches(['\n', '\r'])
        .replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Digits needed for the largest line number of the snippet
fn gutter_width(content: &str, first_line: usize) -> usize {
    let line_count = content.lines().count().max(1);
    (first_line + line_count - 1).to_string().len()
}

/// Render a snippet as highlighted lines with a line-number gutter that
/// starts at `first_line`.
pub fn highlight_snippet(content: &str, file_path: &str, first_line: u32) -> Vec<Line<'static>> {
    let first_line = first_line.max(1) as usize;
    let width = gutter_width(content, first_line);
    let gutter_style = Style::default().fg(Color::Rgb(125, 133, 147));

    let assets = &*ASSETS;
    let syntax = syntax_for(&assets.syntaxes, file_path);
    let mut highlighter = assets
        .theme
        .as_ref()
        .map(|theme| HighlightLines::new(syntax, theme));

    let mut lines = Vec::new();
    for (offset, raw) in LinesWithEndings::from(content).enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:>width$} │ ", first_line + offset),
            gutter_style,
        )];

        let highlighted = highlighter
            .as_mut()
            .and_then(|h| h.highlight_line(raw, &assets.syntaxes).ok());
        match highlighted {
            Some(ranges) => {
                for (style, text) in ranges {
                    let text = clean(text);
                    if !text.is_empty() {
                        spans.push(Span::styled(text, to_ratatui_style(style)));
                    }
                }
            }
            None => spans.push(Span::raw(clean(raw))),
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Render a snippet for plain terminal output, with ANSI colors when `color`
/// is set. Uses the same gutter as [`highlight_snippet`].
pub fn snippet_to_text(content: &str, file_path: &str, first_line: u32, color: bool) -> String {
    let first_line = first_line.max(1) as usize;
    let width = gutter_width(content, first_line);

    let assets = &*ASSETS;
    let syntax = syntax_for(&assets.syntaxes, file_path);
    let mut highlighter = match (&assets.theme, color) {
        (Some(theme), true) => Some(HighlightLines::new(syntax, theme)),
        _ => None,
    };

    let mut out = String::new();
    for (offset, raw) in LinesWithEndings::from(content).enumerate() {
        out.push_str(&format!("{:>width$} │ ", first_line + offset));
        let highlighted = highlighter
            .as_mut()
            .and_then(|h| h.highlight_line(raw, &assets.syntaxes).ok());
        match highlighted {
            Some(ranges) => {
                let cleaned: Vec<(syntect::highlighting::Style, String)> =
                    ranges.into_iter().map(|(style, text)| (style, clean(text))).collect();
                let borrowed: Vec<(syntect::highlighting::Style, &str)> =
                    cleaned.iter().map(|(style, text)| (*style, text.as_str())).collect();
                out.push_str(&as_24_bit_terminal_escaped(&borrowed, false));
                out.push_str("\x1b[0m");
            }
            None => out.push_str(&clean(raw)),
        }
        out.push('\n');
    }
    out
}
