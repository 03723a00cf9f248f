use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Number,
    String,
    Template,
    Ident,

    // Operators
    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    Comma,
    Dot,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Newline,

    // Keywords
    Print,
    With,
    As,
    True,
    False,
    None,
    If,
    Else,
    Elif,
    For,
    While,
    Def,
    Return,

    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            String => "string",
            Template => "template string",
            Ident => "identifier",
            Assign => "'='",
            Plus => "'+'",
            Minus => "'-'",
            Asterisk => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Equal => "'=='",
            NotEqual => "'!='",
            GreaterThan => "'>'",
            LessThan => "'<'",
            Comma => "','",
            Dot => "'.'",
            Colon => "':'",
            SemiColon => "';'",
            LParen => "'('",
            RParen => "')'",
            LBrace => "'{'",
            RBrace => "'}'",
            LBracket => "'['",
            RBracket => "']'",
            Newline => "newline",
            Print => "'print'",
            With => "'with'",
            As => "'as'",
            True => "'True'",
            False => "'False'",
            None => "'None'",
            If => "'if'",
            Else => "'else'",
            Elif => "'elif'",
            For => "'for'",
            While => "'while'",
            Def => "'def'",
            Return => "'return'",
            Eof => "end of input",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. For string and template literals this is the
    /// literal's content without the surrounding quotes.
    pub text: Rc<str>,
    pub line: usize,
    pub col: usize,
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "print" => Some(TokenKind::Print),
        "with" => Some(TokenKind::With),
        "as" => Some(TokenKind::As),
        "True" => Some(TokenKind::True),
        "False" => Some(TokenKind::False),
        "None" => Some(TokenKind::None),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "elif" => Some(TokenKind::Elif),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "def" => Some(TokenKind::Def),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}

/// Character produced by a backslash escape, shared by string literals and
/// template rendering.
pub fn escaped_char(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Scanner over a source text. Each instance is independent; cloning one
/// restarts nothing but copies the current position.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    col: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self {
            input,
            iter,
            line: 1,
            col: 0,
            finished: false,
        }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.iter.next();
        if let Some((_, ch)) = next {
            if ch == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
        next
    }

    fn bump_if(&mut self, func: impl FnOnce(char) -> bool) -> bool {
        match self.iter.peek() {
            Some(&(_, ch)) if func(ch) => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.iter.peek().map(|(_, ch)| *ch)
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn rest(&mut self) -> &'a str {
        let idx = self.next_idx();
        &self.input[idx..]
    }

    fn token(kind: TokenKind, text: &str, line: usize, col: usize) -> Token {
        Token {
            kind,
            text: text.into(),
            line,
            col,
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, col: usize) -> Token {
        while self.bump_if(|ch| ch.is_ascii_alphanumeric() || ch == '_') {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        let kind = keywords(ident).unwrap_or(TokenKind::Ident);
        Self::token(kind, ident, line, col)
    }

    fn read_number(&mut self, start: usize, line: usize, col: usize) -> Token {
        let mut seen_dot = false;
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_ascii_digit() => {}
                Some('.') if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.bump();
        }

        let end = self.next_idx();
        Self::token(TokenKind::Number, &self.input[start..end], line, col)
    }

    /// Reads a quoted literal whose opening quote was already consumed.
    /// Template literals keep their escapes untouched so that rendering can
    /// tell an escaped brace from a placeholder.
    fn read_string(&mut self, quote: char, kind: TokenKind, line: usize, col: usize) -> Token {
        let mut triple = String::with_capacity(3);
        triple.extend([quote, quote]);
        if self.rest().starts_with(&triple) {
            self.bump();
            self.bump();
            triple.push(quote);
            return self.read_triple_quoted(&triple, kind, line, col);
        }

        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    tracing::debug!(line, col, "unterminated string literal");
                    break;
                }
                Some(ch) if ch == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    let Some((_, escaped)) = self.bump() else {
                        value.push('\\');
                        break;
                    };
                    match escaped_char(escaped) {
                        Some(translated) if kind == TokenKind::String => value.push(translated),
                        _ => {
                            value.push('\\');
                            value.push(escaped);
                        }
                    }
                }
                Some(ch) => {
                    self.bump();
                    value.push(ch);
                }
            }
        }
        Self::token(kind, &value, line, col)
    }

    fn read_triple_quoted(
        &mut self,
        delimiter: &str,
        kind: TokenKind,
        line: usize,
        col: usize,
    ) -> Token {
        let start = self.next_idx();
        let end = match self.rest().find(delimiter) {
            Some(offset) => start + offset,
            None => self.input.len(),
        };
        while self.next_idx() < end {
            self.bump();
        }
        for _ in 0..delimiter.chars().count() {
            self.bump();
        }
        Self::token(kind, &self.input[start..end], line, col)
    }

    fn skip_comment(&mut self) {
        while self.bump_if(|ch| ch != '\n') {}
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.finished {
                return None;
            }
            while self.bump_if(|ch| ch.is_whitespace() && ch != '\n') {}

            let (line, col) = (self.line, self.col);
            let Some((idx, ch)) = self.bump() else {
                self.finished = true;
                return Some(Self::token(TokenKind::Eof, "", line, col));
            };

            let kind = match ch {
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\n' => TokenKind::Newline,
                '=' => {
                    if self.bump_if(|ch| ch == '=') {
                        TokenKind::Equal
                    } else {
                        TokenKind::Assign
                    }
                }
                '!' => {
                    if self.bump_if(|ch| ch == '=') {
                        TokenKind::NotEqual
                    } else {
                        tracing::trace!(line, col, "skipping lone '!'");
                        continue;
                    }
                }
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Asterisk,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '<' => TokenKind::LessThan,
                '>' => TokenKind::GreaterThan,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                ':' => TokenKind::Colon,
                ';' => TokenKind::SemiColon,
                '"' | '\'' => return Some(self.read_string(ch, TokenKind::String, line, col)),
                'f' if matches!(self.peek_char(), Some('"' | '\'')) => {
                    let Some((_, quote)) = self.bump() else {
                        continue;
                    };
                    return Some(self.read_string(quote, TokenKind::Template, line, col));
                }
                c if Tokenizer::is_letter(c) => return Some(self.read_identifier(idx, line, col)),
                c if c.is_ascii_digit() => return Some(self.read_number(idx, line, col)),
                other => {
                    tracing::trace!(line, col, character = ?other, "skipping unrecognized character");
                    continue;
                }
            };

            let end = self.next_idx();
            return Some(Self::token(kind, &self.input[idx..end], line, col));
        }
    }
}

/// Scans the whole input. The result always ends with an `Eof` token.
pub fn tokenize(input: &str) -> Vec<Token> {
    let tokens: Vec<Token> = Tokenizer::new(input).collect();
    tracing::debug!(count = tokens.len(), "scanned source");
    tokens
}
