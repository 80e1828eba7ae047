//! Multi-line SQL editor widget with syntax highlighting.
//!
//! Minimal text editing over a Vec of lines: character insert/delete, cursor
//! movement, Enter splits lines. Rendering tokenizes each line so keywords,
//! literals, and numbers get distinct colors.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Keywords recognized by the highlighter (uppercase canonical forms).
const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IS", "NULL", "AS", "GROUP", "BY", "ORDER",
    "ASC", "DESC", "LIMIT", "COUNT", "SUM", "AVG", "MIN", "MAX", "DISTINCT", "TRUE", "FALSE",
];

/// Token classes for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    StringLiteral,
    Number,
    Operator,
    Whitespace,
    Comment,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

/// Tokenize one line of SQL for highlighting. Lossless: concatenating the
/// token texts reproduces the input.
pub fn tokenize_sql(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let ch = chars[i];
        let start = i;

        if ch.is_whitespace() {
            while i < len && chars[i].is_whitespace() {
                i += 1;
            }
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                kind: TokenKind::Whitespace,
            });
        } else if ch == '-' && i + 1 < len && chars[i + 1] == '-' {
            i = len;
            tokens.push(Token {
                text: chars[start..].iter().collect(),
                kind: TokenKind::Comment,
            });
        } else if ch == '\'' {
            i += 1;
            while i < len && chars[i] != '\'' {
                i += 1;
            }
            if i < len {
                i += 1; // closing quote
            }
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                kind: TokenKind::StringLiteral,
            });
        } else if ch.is_ascii_digit() {
            while i < len && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                kind: TokenKind::Number,
            });
        } else if ch.is_alphabetic() || ch == '_' {
            while i < len && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = if SQL_KEYWORDS.contains(&word.to_uppercase().as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token { text: word, kind });
        } else {
            if i + 1 < len {
                let two: String = chars[i..i + 2].iter().collect();
                if matches!(two.as_str(), ">=" | "<=" | "<>" | "!=") {
                    i += 2;
                    tokens.push(Token {
                        text: two,
                        kind: TokenKind::Operator,
                    });
                    continue;
                }
            }
            i += 1;
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                kind: TokenKind::Operator,
            });
        }
    }

    tokens
}

/// Color per token class.
pub fn token_color(kind: TokenKind) -> Color {
    match kind {
        TokenKind::Keyword => Color::Rgb(100, 140, 255),
        TokenKind::Identifier => Color::Rgb(80, 220, 120),
        TokenKind::StringLiteral => Color::Rgb(240, 220, 80),
        TokenKind::Number => Color::Rgb(220, 120, 255),
        TokenKind::Operator | TokenKind::Whitespace => Color::Rgb(200, 200, 210),
        TokenKind::Comment => Color::Rgb(100, 100, 120),
    }
}

/// Multi-line editor state.
#[derive(Debug, Clone)]
pub struct EditorState {
    /// Lines of text in the buffer. Never empty.
    pub lines: Vec<String>,
    /// Cursor row (0-indexed).
    pub cursor_row: usize,
    /// Cursor column (0-indexed, in chars not bytes).
    pub cursor_col: usize,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// Create an editor pre-filled with the given text, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        let mut state = Self::new();
        state.set_text(text);
        state
    }

    /// Full text content.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the buffer, cursor moves to the end.
    pub fn set_text(&mut self, text: &str) {
        self.lines = if text.is_empty() {
            vec![String::new()]
        } else {
            text.lines().map(|l| l.to_string()).collect()
        };
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor_row = self.lines.len() - 1;
        self.cursor_col = self.lines[self.cursor_row].chars().count();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        let line = &mut self.lines[self.cursor_row];
        let pos = char_to_byte_pos(line, self.cursor_col);
        line.insert(pos, ch);
        self.cursor_col += 1;
    }

    pub fn insert_newline(&mut self) {
        let line = &self.lines[self.cursor_row];
        let pos = char_to_byte_pos(line, self.cursor_col);
        let rest = line[pos..].to_string();
        self.lines[self.cursor_row] = line[..pos].to_string();
        self.cursor_row += 1;
        self.lines.insert(self.cursor_row, rest);
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let from = char_to_byte_pos(line, self.cursor_col - 1);
            let to = char_to_byte_pos(line, self.cursor_col);
            line.replace_range(from..to, "");
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].chars().count();
            self.lines[self.cursor_row].push_str(&current);
        }
    }

    pub fn delete_char(&mut self) {
        let line_len = self.lines[self.cursor_row].chars().count();
        if self.cursor_col < line_len {
            let line = &mut self.lines[self.cursor_row];
            let from = char_to_byte_pos(line, self.cursor_col);
            let to = char_to_byte_pos(line, self.cursor_col + 1);
            line.replace_range(from..to, "");
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].chars().count();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.lines[self.cursor_row].chars().count() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.lines[self.cursor_row].chars().count());
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.lines[self.cursor_row].chars().count());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.lines[self.cursor_row].chars().count();
    }

    /// Syntax-highlighted lines without a cursor.
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        self.lines.iter().map(|line| highlight_line(line)).collect()
    }

    /// Syntax-highlighted lines with inverse-video cursor on the cursor row.
    pub fn render_lines_with_cursor(&self) -> Vec<Line<'static>> {
        self.lines
            .iter()
            .enumerate()
            .map(|(row, line)| {
                if row == self.cursor_row {
                    highlight_line_with_cursor(line, self.cursor_col)
                } else {
                    highlight_line(line)
                }
            })
            .collect()
    }
}

fn highlight_line(line: &str) -> Line<'static> {
    if line.is_empty() {
        return Line::from(Span::raw(" "));
    }
    let spans: Vec<Span<'static>> = tokenize_sql(line)
        .into_iter()
        .map(|tok| Span::styled(tok.text, Style::default().fg(token_color(tok.kind))))
        .collect();
    Line::from(spans)
}

fn highlight_line_with_cursor(line: &str, cursor_col: usize) -> Line<'static> {
    let cursor_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Rgb(255, 255, 255))
        .add_modifier(Modifier::BOLD);

    let n = line.chars().count();
    if n == 0 {
        return Line::from(Span::styled("\u{2588}", cursor_style));
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut char_idx = 0;
    for tok in tokenize_sql(line) {
        let color = token_color(tok.kind);
        for ch in tok.text.chars() {
            if char_idx == cursor_col {
                spans.push(Span::styled(ch.to_string(), cursor_style));
            } else {
                spans.push(Span::styled(ch.to_string(), Style::default().fg(color)));
            }
            char_idx += 1;
        }
    }
    if cursor_col >= n {
        spans.push(Span::styled("\u{2588}", cursor_style));
    }
    Line::from(spans)
}

/// Convert a char-based column index to a byte position.
fn char_to_byte_pos(s: &str, char_col: usize) -> usize {
    s.char_indices()
        .nth(char_col)
        .map(|(pos, _)| pos)
        .unwrap_or(s.len())
}
