//! Styled string builder
//!
//! [`TermString`] assembles help and error messages from a flat sequence of
//! tokens. Text tokens contribute to the visible width, control tokens
//! ([`Seq`]) do not, so wrapping and column math never need to strip escape
//! sequences after the fact. Words are atomic wrapping units; punctuation
//! and brackets merge with their neighbours so that `(`, word, `)` never
//! split across lines.

use crate::csi::{cha, Seq, Style};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Word {
        text: String,
        width: usize,
        /// glued to the previous word, no separating space
        merge: bool,
    },
    Seq(Seq),
    Break,
}

/// One format specifier found by [`TermString::split_phrase`]
///
/// `%o` produces code `o` with no index, `%n2` produces code `n` and
/// index 2 (1-based).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FmtSpec {
    pub code: char,
    pub index: Option<usize>,
}

/// String with styled segments and embedded control sequences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermString {
    tokens: Vec<Token>,
    /// the next word glues to the previous one, set after an opening bracket
    merge_next: bool,
}

fn char_width(s: &str) -> usize {
    s.chars().count()
}

fn merges_left(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if matches!(c, '.' | ',' | ';' | '!' | '?') => chars.next() != Some('='),
        Some(c) => matches!(c, ')' | ']' | '}'),
        None => false,
    }
}

fn opens_right(word: &str) -> bool {
    matches!(word.chars().last(), Some('(' | '[' | '{'))
}

impl TermString {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Append a control sequence, collapsing consecutive duplicates
    pub fn seq(&mut self, seq: Seq) {
        if self.tokens.last() == Some(&Token::Seq(seq.clone())) {
            return;
        }
        self.tokens.push(Token::Seq(seq));
    }

    pub fn seqs<I>(&mut self, seqs: I)
    where
        I: IntoIterator<Item = Seq>,
    {
        for s in seqs {
            self.seq(s);
        }
    }

    /// Append an atomic word, a space separates it from the previous word
    /// unless merge rules apply
    pub fn word(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let merge = std::mem::take(&mut self.merge_next) || merges_left(word);
        self.merge_next = opens_right(word);
        self.tokens.push(Token::Word {
            width: char_width(word),
            text: word.to_string(),
            merge,
        });
    }

    /// Split on whitespace and append every piece as a word
    ///
    /// Embedded line feeds become hard breaks.
    pub fn words(&mut self, text: &str) {
        for (ix, line) in text.split('\n').enumerate() {
            if ix != 0 {
                self.push_break();
            }
            for word in line.split_whitespace() {
                self.word(word);
            }
        }
    }

    /// Append text glued to the previous word, no separating space
    pub fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.merge_next = opens_right(text);
        self.tokens.push(Token::Word {
            width: char_width(text),
            text: text.to_string(),
            merge: true,
        });
    }

    /// Append a word wrapped in a style and a reverting sequence
    pub fn styled(&mut self, style: &Style, word: &str, revert: &Style) {
        if style.is_plain() {
            return self.word(word);
        }
        self.seq(Seq::Sgr(style.clone()));
        self.word(word);
        self.seq(Seq::Sgr(revert.clone()));
    }

    /// Same as [`styled`](Self::styled) but glued to the previous word
    pub fn styled_merged(&mut self, style: &Style, text: &str, revert: &Style) {
        if style.is_plain() {
            return self.push_str(text);
        }
        self.seq(Seq::Sgr(style.clone()));
        self.push_str(text);
        self.seq(Seq::Sgr(revert.clone()));
    }

    pub fn push_break(&mut self) {
        self.merge_next = false;
        self.tokens.push(Token::Break);
    }

    /// Append all tokens of another string
    pub fn append(&mut self, other: &TermString) {
        let mut merge_first = std::mem::take(&mut self.merge_next);
        for token in &other.tokens {
            match token {
                Token::Word { text, width, .. } if merge_first => {
                    merge_first = false;
                    self.tokens.push(Token::Word {
                        text: text.clone(),
                        width: *width,
                        merge: true,
                    });
                }
                t => self.tokens.push(t.clone()),
            }
        }
    }

    /// Append another string with its first word glued to the previous one
    pub fn append_merged(&mut self, other: &TermString) {
        self.merge_next = true;
        self.append(other);
    }

    /// Visible width, counting the single spaces between unmerged words
    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut first = true;
        for token in &self.tokens {
            if let Token::Word { width, merge, .. } = token {
                len += width + usize::from(!first && !merge);
                first = false;
            }
        }
        len
    }

    /// Per-token visible lengths, control tokens excluded
    pub fn lengths(&self) -> Vec<usize> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word { width, .. } => Some(*width),
                _ => None,
            })
            .collect()
    }

    /// Width of the widest wrapping unit (a word plus everything merged
    /// onto it)
    pub(crate) fn max_unit_width(&self) -> usize {
        let mut best = 0;
        let mut cur = 0;
        for token in &self.tokens {
            match token {
                Token::Word { width, merge, .. } => {
                    if *merge {
                        cur += width;
                    } else {
                        best = best.max(cur);
                        cur = *width;
                    }
                }
                Token::Break => {
                    best = best.max(cur);
                    cur = 0;
                }
                Token::Seq(_) => {}
            }
        }
        best.max(cur)
    }
}

/// Phrase splitting
impl TermString {
    /// Parse a phrase with `%x` format specifiers and `(a|b)` alternation
    /// groups
    ///
    /// Plain text is appended as words, every specifier is handed to
    /// `on_spec` which appends its own rendition. Alternation groups pick
    /// alternative `alt`, falling back to the first one when `alt` is out
    /// of bounds. A group without a top level `|` is literal text.
    pub fn split_phrase<F>(&mut self, phrase: &str, alt: usize, on_spec: &mut F)
    where
        F: FnMut(FmtSpec, &mut TermString),
    {
        let mut rest = phrase;
        while let Some(open) = rest.find('(') {
            let tail = &rest[open..];
            match tail[1..].find(')') {
                Some(close) => {
                    let group = &tail[1..1 + close];
                    if group.contains('|') {
                        self.split_words(&rest[..open], on_spec);
                        let picked = group
                            .split('|')
                            .nth(alt)
                            .or_else(|| group.split('|').next())
                            .unwrap_or("");
                        self.split_words(picked, on_spec);
                        rest = &tail[close + 2..];
                    } else {
                        // literal parentheses
                        self.split_words(&rest[..open + close + 2], on_spec);
                        rest = &tail[close + 2..];
                    }
                }
                None => break,
            }
        }
        self.split_words(rest, on_spec);
    }

    fn split_words<F>(&mut self, text: &str, on_spec: &mut F)
    where
        F: FnMut(FmtSpec, &mut TermString),
    {
        for word in text.split_whitespace() {
            let mut parts = word.split('%');
            if let Some(head) = parts.next() {
                self.word(head);
            }
            for part in parts {
                let mut chars = part.chars();
                let code = match chars.next() {
                    Some(c) => c,
                    None => continue,
                };
                let digits: String = chars.take_while(|c| c.is_ascii_digit()).collect();
                let index = digits.parse::<usize>().ok();
                on_spec(FmtSpec { code, index }, self);
                self.push_str(&part[code.len_utf8() + digits.len()..]);
            }
        }
    }
}

/// Wrapping
impl TermString {
    /// Word-wrap the body into the window `[start_col, width)`
    ///
    /// The caller is expected to have moved the cursor to `start_col`
    /// already; each wrapped line begins with a `cha` move back to it. When
    /// the widest wrapping unit does not fit in the window the body starts
    /// on a fresh line and wraps from column 0 instead.
    #[must_use]
    pub fn wrap(&self, start_col: usize, width: usize) -> TermString {
        let mut out = TermString::new();
        let col = if start_col + self.max_unit_width() <= width {
            start_col
        } else {
            out.push_break();
            0
        };

        let mut line_len = col;
        let mut cur_style: Option<Style> = None;
        let mut ix = 0;
        while ix < self.tokens.len() {
            match &self.tokens[ix] {
                Token::Seq(Seq::Sgr(style)) => {
                    out.seq(Seq::Sgr(style.clone()));
                    cur_style = Some(style.clone());
                    ix += 1;
                }
                Token::Seq(other) => {
                    out.seq(other.clone());
                    ix += 1;
                }
                Token::Break => {
                    out.push_break();
                    out.seq(cha(col));
                    if let Some(style) = &cur_style {
                        out.seq(Seq::Sgr(style.clone()));
                    }
                    line_len = col;
                    ix += 1;
                }
                Token::Word { .. } => {
                    // a wrapping unit is a word plus everything merged onto
                    // it, with any control tokens in between
                    let mut end = ix + 1;
                    let mut unit_width = match &self.tokens[ix] {
                        Token::Word { width, .. } => *width,
                        _ => 0,
                    };
                    while let Some(token) = self.tokens.get(end) {
                        match token {
                            Token::Word {
                                width, merge: true, ..
                            } => {
                                unit_width += width;
                                end += 1;
                            }
                            Token::Seq(_) => {
                                // part of the unit only if a merged word follows
                                match self.tokens[end..]
                                    .iter()
                                    .find(|t| !matches!(t, Token::Seq(_)))
                                {
                                    Some(Token::Word { merge: true, .. }) => end += 1,
                                    _ => break,
                                }
                            }
                            _ => break,
                        }
                    }

                    let fresh = line_len == col;
                    let needed = unit_width + usize::from(!fresh);
                    if !fresh && line_len + needed > width {
                        out.push_break();
                        out.seq(cha(col));
                        if let Some(style) = &cur_style {
                            out.seq(Seq::Sgr(style.clone()));
                        }
                        line_len = col;
                    }
                    let fresh = line_len == col;
                    for (off, token) in self.tokens[ix..end].iter().enumerate() {
                        match token {
                            Token::Word { text, width, merge } => {
                                out.tokens.push(Token::Word {
                                    text: text.clone(),
                                    width: *width,
                                    // the unit starts the line or follows with a space
                                    merge: if off == 0 { fresh } else { *merge },
                                });
                            }
                            other => out.tokens.push(other.clone()),
                        }
                    }
                    line_len += unit_width + usize::from(!fresh);
                    ix = end;
                }
            }
        }
        out
    }
}

/// Rendering
impl TermString {
    fn render(&self, styles: bool) -> String {
        let mut out = String::new();
        let mut col = 0;
        let mut no_space = true;
        for token in &self.tokens {
            match token {
                Token::Word { text, width, merge } => {
                    if !no_space && !merge {
                        out.push(' ');
                        col += 1;
                    }
                    out.push_str(text);
                    col += width;
                    no_space = false;
                }
                Token::Break => {
                    // no trailing padding in front of a line break
                    while out.ends_with(' ') {
                        out.pop();
                    }
                    out.push('\n');
                    col = 0;
                    no_space = true;
                }
                Token::Seq(seq) => match seq {
                    Seq::Move(crate::csi::Move::Column(n)) => {
                        let target = n.saturating_sub(1);
                        if styles {
                            out.push_str(&seq.to_string());
                        } else {
                            for _ in col..target {
                                out.push(' ');
                            }
                        }
                        col = col.max(target);
                        no_space = true;
                    }
                    Seq::Move(crate::csi::Move::Forward(n)) => {
                        if styles {
                            out.push_str(&seq.to_string());
                        } else {
                            for _ in 0..*n {
                                out.push(' ');
                            }
                        }
                        col += n;
                        no_space = true;
                    }
                    other => {
                        if styles {
                            out.push_str(&other.to_string());
                        }
                    }
                },
            }
        }
        out
    }

    /// Plain rendition: styles dropped, cursor moves degraded to padding
    #[must_use]
    pub fn plain(&self) -> String {
        self.render(false)
    }

    /// Wire rendition with every control sequence emitted
    #[must_use]
    pub fn ansi(&self) -> String {
        self.render(true)
    }
}

impl std::fmt::Display for TermString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.plain())
    }
}

impl From<&str> for TermString {
    fn from(value: &str) -> Self {
        let mut ts = TermString::new();
        ts.words(value);
        ts
    }
}
