//! Argument stream
//!
//! [`Args`] is the input to one parse: a sequence of word tokens plus an
//! optional completion cursor pointing at the word being completed. Raw
//! command lines are split by a small shell-aware tokenizer that
//! understands quotes and backslash escapes, enough to cooperate with the
//! words a shell hands over in `COMP_LINE`.

/// Pre-tokenized arguments for one parse
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub(crate) items: Vec<String>,
    /// index of the word being completed, parsing runs in completion mode
    /// when set
    pub(crate) comp: Option<usize>,
}

impl Args {
    /// Completion cursor on the word at `ix`, may point one past the last
    /// word to complete a fresh empty word
    #[must_use]
    pub fn set_comp(mut self, ix: usize) -> Self {
        self.comp = Some(ix);
        self
    }

    /// Split a raw command line, recognizing an optional completion point
    /// (a byte offset into the line)
    #[must_use]
    pub fn from_line(line: &str, comp_point: Option<usize>) -> Self {
        match comp_point {
            None => Args {
                items: tokenize(line).0,
                comp: None,
            },
            Some(point) => {
                let point = point.min(line.len());
                let (mut items, open) = tokenize(&line[..point]);
                if !open {
                    items.push(String::new());
                }
                let comp = items.len() - 1;
                Args {
                    items,
                    comp: Some(comp),
                }
            }
        }
    }

    /// Arguments of the current process, program name dropped
    #[must_use]
    pub fn current() -> Self {
        Args {
            items: std::env::args().skip(1).collect(),
            comp: None,
        }
    }
}

impl From<&[&str]> for Args {
    fn from(items: &[&str]) -> Self {
        Args {
            items: items.iter().map(|s| s.to_string()).collect(),
            comp: None,
        }
    }
}

impl<const N: usize> From<&[&str; N]> for Args {
    fn from(items: &[&str; N]) -> Self {
        Args::from(items.as_slice())
    }
}

impl From<Vec<String>> for Args {
    fn from(items: Vec<String>) -> Self {
        Args { items, comp: None }
    }
}

/// Split into words the way a shell would
///
/// Returns the words and whether the final word was still open when the
/// input ended, which is how the completion cursor distinguishes "complete
/// this word" from "complete a fresh word".
pub(crate) fn tokenize(input: &str) -> (Vec<String>, bool) {
    #[derive(PartialEq)]
    enum Mode {
        Plain,
        Single,
        Double,
    }

    let mut words = Vec::new();
    let mut cur = String::new();
    let mut open = false;
    let mut mode = Mode::Plain;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Plain => match c {
                '\'' => {
                    mode = Mode::Single;
                    open = true;
                }
                '"' => {
                    mode = Mode::Double;
                    open = true;
                }
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        cur.push(escaped);
                    }
                    open = true;
                }
                c if c.is_whitespace() => {
                    if open {
                        words.push(std::mem::take(&mut cur));
                        open = false;
                    }
                }
                c => {
                    cur.push(c);
                    open = true;
                }
            },
            Mode::Single => match c {
                '\'' => mode = Mode::Plain,
                c => cur.push(c),
            },
            Mode::Double => match c {
                '"' => mode = Mode::Plain,
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        if !matches!(escaped, '"' | '\\' | '$' | '`') {
                            cur.push('\\');
                        }
                        cur.push(escaped);
                    }
                }
                c => cur.push(c),
            },
        }
    }
    if open {
        words.push(cur);
    }
    (words, open)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_split_on_whitespace() {
        assert_eq!(
            tokenize("a  b\tc").0,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn quotes_keep_spaces() {
        assert_eq!(
            tokenize(r#"-m 'hello world' "two  spaces""#).0,
            vec![
                "-m".to_string(),
                "hello world".to_string(),
                "two  spaces".to_string()
            ]
        );
    }

    #[test]
    fn backslash_escapes_outside_single_quotes() {
        assert_eq!(
            tokenize(r"a\ b 'c\d'").0,
            vec!["a b".to_string(), r"c\d".to_string()]
        );
    }

    #[test]
    fn empty_quoted_word_is_a_word() {
        assert_eq!(tokenize("-s ''").0, vec!["-s".to_string(), String::new()]);
    }

    #[test]
    fn completion_point_mid_word_truncates_it() {
        let args = Args::from_line("prog --ver --flag", Some(10));
        assert_eq!(args.items, vec!["prog".to_string(), "--ver".to_string()]);
        assert_eq!(args.comp, Some(1));
    }

    #[test]
    fn completion_point_after_space_opens_a_fresh_word() {
        let args = Args::from_line("prog -a ", Some(8));
        assert_eq!(
            args.items,
            vec!["prog".to_string(), "-a".to_string(), String::new()]
        );
        assert_eq!(args.comp, Some(2));
    }
}
