//! ANSI control sequences
//!
//! Everything the library emits on the wire is a CSI sequence: an
//! introducer, semicolon separated numeric parameters and a final command
//! byte. Styles are SGR sequences (final byte `m`), layout uses cursor
//! movements, mostly `cuf` ([`Move::Forward`]) and `cha` ([`Move::Column`]).

use std::fmt::Write;

pub(crate) const CSI: &str = "\x1b[";

/// Single SGR attribute
///
/// A [`Style`] is an ordered sequence of those, rendered as one sequence:
/// `Bold` + `Fg(Color::Red)` becomes `ESC [ 1 ; 31 m`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Sgr {
    Reset,
    Bold,
    Faint,
    Italic,
    Underline,
    Blink,
    Invert,
    Conceal,
    Strike,
    /// resets both `Bold` and `Faint`
    NotBoldOrFaint,
    NotItalic,
    NotUnderlined,
    NotBlinking,
    NotInverted,
    NotConcealed,
    NotStruck,
    Fg(Color),
    Bg(Color),
}

/// Color payload for [`Sgr::Fg`] and [`Sgr::Bg`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Default,
    /// 8-bit palette index, rendered with the `38;5;n` / `48;5;n` form
    Extended(u8),
}

impl Color {
    fn base(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
            Color::BrightBlack => 60,
            Color::BrightRed => 61,
            Color::BrightGreen => 62,
            Color::BrightYellow => 63,
            Color::BrightBlue => 64,
            Color::BrightMagenta => 65,
            Color::BrightCyan => 66,
            Color::BrightWhite => 67,
            Color::Default => 9,
            Color::Extended(_) => 8,
        }
    }
}

impl Sgr {
    fn write_params(self, out: &mut String) {
        let simple = match self {
            Sgr::Reset => 0,
            Sgr::Bold => 1,
            Sgr::Faint => 2,
            Sgr::Italic => 3,
            Sgr::Underline => 4,
            Sgr::Blink => 5,
            Sgr::Invert => 7,
            Sgr::Conceal => 8,
            Sgr::Strike => 9,
            Sgr::NotBoldOrFaint => 22,
            Sgr::NotItalic => 23,
            Sgr::NotUnderlined => 24,
            Sgr::NotBlinking => 25,
            Sgr::NotInverted => 27,
            Sgr::NotConcealed => 28,
            Sgr::NotStruck => 29,
            Sgr::Fg(Color::Extended(n)) => {
                let _ = write!(out, "38;5;{}", n);
                return;
            }
            Sgr::Bg(Color::Extended(n)) => {
                let _ = write!(out, "48;5;{}", n);
                return;
            }
            Sgr::Fg(c) => 30 + c.base(),
            Sgr::Bg(c) => 40 + c.base(),
        };
        let _ = write!(out, "{}", simple);
    }
}

/// SGR style, an ordered attribute list
///
/// Rendered as a single `m`-terminated sequence. An empty style renders
/// nothing at all, which lets optional per-option styles degrade to plain
/// text without special casing.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Style(Vec<Sgr>);

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Style(Vec::new())
    }

    #[must_use]
    pub fn reset() -> Self {
        Style(vec![Sgr::Reset])
    }

    #[must_use]
    pub fn with(mut self, attr: Sgr) -> Self {
        self.0.push(attr);
        self
    }

    #[must_use]
    pub fn bold(self) -> Self {
        self.with(Sgr::Bold)
    }

    #[must_use]
    pub fn underline(self) -> Self {
        self.with(Sgr::Underline)
    }

    #[must_use]
    pub fn faint(self) -> Self {
        self.with(Sgr::Faint)
    }

    #[must_use]
    pub fn fg(self, color: Color) -> Self {
        self.with(Sgr::Fg(color))
    }

    #[must_use]
    pub fn bg(self, color: Color) -> Self {
        self.with(Sgr::Bg(color))
    }

    pub(crate) fn is_plain(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let mut params = String::new();
        for (ix, attr) in self.0.iter().enumerate() {
            if ix != 0 {
                params.push(';');
            }
            attr.write_params(&mut params);
        }
        write!(f, "{}{}m", CSI, params)
    }
}

/// Cursor movement commands
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Move {
    /// `cuu` - cursor up
    Up(usize),
    /// `cud` - cursor down
    Down(usize),
    /// `cuf` - cursor forward
    Forward(usize),
    /// `cub` - cursor backward
    Back(usize),
    /// `cnl` - beginning of the line, some lines down
    NextLine(usize),
    /// `cpl` - beginning of the line, some lines up
    PrevLine(usize),
    /// `cha` - cursor to an absolute column, 1-based on the wire
    Column(usize),
    /// `cht` - forward by tab stops
    TabForward(usize),
    /// `cbt` - backward by tab stops
    TabBack(usize),
    /// `vpa` - cursor to an absolute row
    Row(usize),
    /// `vpr` - cursor down, same column
    RowDown(usize),
    /// `cup` - absolute row and column
    To(usize, usize),
}

/// In-place edit commands
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Edit {
    /// `ed` - erase display
    EraseDisplay(usize),
    /// `el` - erase line
    EraseLine(usize),
    /// `il` - insert blank lines
    InsertLines(usize),
    /// `dl` - delete lines
    DeleteLines(usize),
    /// `ich` - insert blank characters
    InsertChars(usize),
    /// `dch` - delete characters
    DeleteChars(usize),
    /// `ech` - erase characters
    EraseChars(usize),
    /// `rep` - repeat preceding character
    RepeatChar(usize),
    /// `tbc` - clear tab stops
    ClearTabs(usize),
}

/// Scroll and margin commands
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Scroll {
    /// `su` - scroll up
    Up(usize),
    /// `sd` - scroll down
    Down(usize),
    /// `sl` - scroll left
    Left(usize),
    /// `sr` - scroll right
    Right(usize),
    /// `decstbm` - set top and bottom margins
    Margins(usize, usize),
}

/// Any control sequence a [`TermString`](crate::TermString) can carry
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Seq {
    Sgr(Style),
    Move(Move),
    Edit(Edit),
    Scroll(Scroll),
}

/// `cuf` - the formatter uses this to skip over hidden name slots
#[must_use]
pub fn cuf(n: usize) -> Seq {
    Seq::Move(Move::Forward(n))
}

/// `cha` - the formatter uses this to reach a column start
///
/// Takes a 0-based column, the wire form is 1-based.
#[must_use]
pub fn cha(col: usize) -> Seq {
    Seq::Move(Move::Column(col + 1))
}

impl std::fmt::Display for Seq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seq::Sgr(style) => write!(f, "{}", style),
            Seq::Move(m) => match m {
                Move::Up(n) => write!(f, "{}{}A", CSI, n),
                Move::Down(n) => write!(f, "{}{}B", CSI, n),
                Move::Forward(n) => write!(f, "{}{}C", CSI, n),
                Move::Back(n) => write!(f, "{}{}D", CSI, n),
                Move::NextLine(n) => write!(f, "{}{}E", CSI, n),
                Move::PrevLine(n) => write!(f, "{}{}F", CSI, n),
                Move::Column(n) => write!(f, "{}{}G", CSI, n),
                Move::TabForward(n) => write!(f, "{}{}I", CSI, n),
                Move::TabBack(n) => write!(f, "{}{}Z", CSI, n),
                Move::Row(n) => write!(f, "{}{}d", CSI, n),
                Move::RowDown(n) => write!(f, "{}{}e", CSI, n),
                Move::To(row, col) => write!(f, "{}{};{}H", CSI, row, col),
            },
            Seq::Edit(e) => match e {
                Edit::EraseDisplay(n) => write!(f, "{}{}J", CSI, n),
                Edit::EraseLine(n) => write!(f, "{}{}K", CSI, n),
                Edit::InsertLines(n) => write!(f, "{}{}L", CSI, n),
                Edit::DeleteLines(n) => write!(f, "{}{}M", CSI, n),
                Edit::InsertChars(n) => write!(f, "{}{}@", CSI, n),
                Edit::DeleteChars(n) => write!(f, "{}{}P", CSI, n),
                Edit::EraseChars(n) => write!(f, "{}{}X", CSI, n),
                Edit::RepeatChar(n) => write!(f, "{}{}b", CSI, n),
                Edit::ClearTabs(n) => write!(f, "{}{}g", CSI, n),
            },
            Seq::Scroll(s) => match s {
                Scroll::Up(n) => write!(f, "{}{}S", CSI, n),
                Scroll::Down(n) => write!(f, "{}{}T", CSI, n),
                Scroll::Left(n) => write!(f, "{}{} @", CSI, n),
                Scroll::Right(n) => write!(f, "{}{} A", CSI, n),
                Scroll::Margins(top, bottom) => write!(f, "{}{};{}r", CSI, top, bottom),
            },
        }
    }
}
