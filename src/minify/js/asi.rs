//! Automatic semicolon insertion.
//!
//! Once line breaks are removed, two statements that relied on a newline as
//! their terminator would merge. [`AsiContext`] follows the emitted token
//! stream and decides, at every line boundary, whether an explicit `;` must
//! take the place of the newline.
//!
//! The rules are pattern based, not a grammar:
//!
//! - a statement keyword (`const`, `if`, `return`, ...) or an IIFE opener
//!   `(function` / `(async function` on the next line gets a `;` when the
//!   previous line ends in something that can end an expression;
//! - an identifier on the next line gets a `;` after `)`, `]`, `}`, a
//!   literal, an identifier or a postfix `++`/`--`;
//! - `return`, `break`, `continue` and `yield` are always terminated by a newline;
//! - nothing is inserted after a control-flow head such as `if (x)`, before
//!   `else`, `catch` or `finally`, or before the `while` of a `do {} while`.

use super::lexer::LiteralKind;

/// A token as seen by the ASI rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Punct(u8),
    Literal(LiteralKind),
    /// `(` directly followed by `function` or `async function`.
    IifeOpen,
    /// `++` or `--`.
    Increment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParenKind {
    /// `if (`, `for (`, `while (`, `with (`: a statement follows the `)`.
    ControlHead,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// Body of `do { }`, closed by `while (...)`.
    Do,
    Other,
}

/// What the previous line ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev<'a> {
    Start,
    Word(&'a str),
    Punct(u8),
    CloseParen(ParenKind),
    CloseBlock(BlockKind),
    Literal(LiteralKind),
    /// `++` or `--` in postfix position.
    Postfix,
}

/// Transient per-script state for semicolon insertion.
///
/// Created for a single script block and dropped with it. `pos` is the
/// source offset of the token being emitted. `literals` pairs every
/// protected literal's source range with its offset in the output, in
/// source order, so the output can be checked against the source.
#[derive(Debug)]
pub struct AsiContext<'a> {
    pub pos: usize,
    pub literals: Vec<(std::ops::Range<usize>, usize)>,
    prev: Prev<'a>,
    prev_word: Option<&'a str>,
    parens: Vec<ParenKind>,
    blocks: Vec<BlockKind>,
    /// Set when the pending `while` closes a `do` block.
    while_closes_do: bool,
    inserted: usize,
}

impl Default for AsiContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AsiContext<'a> {
    pub fn new() -> Self {
        Self {
            pos: 0,
            literals: Vec::new(),
            prev: Prev::Start,
            prev_word: None,
            parens: Vec::new(),
            blocks: Vec::new(),
            while_closes_do: false,
            inserted: 0,
        }
    }

    /// Number of semicolons inserted so far.
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Record an emitted token.
    pub fn observe(&mut self, token: Token<'a>) {
        let before = self.prev;
        self.prev = match token {
            Token::Word(word) => {
                self.while_closes_do =
                    word == "while" && before == Prev::CloseBlock(BlockKind::Do);
                self.prev_word = match before {
                    Prev::Word(w) => Some(w),
                    _ => None,
                };
                Prev::Word(word)
            }
            Token::Punct(b'(') | Token::IifeOpen => {
                let kind = if self.opens_control_head(before) {
                    ParenKind::ControlHead
                } else {
                    ParenKind::Other
                };
                self.parens.push(kind);
                Prev::Punct(b'(')
            }
            Token::Punct(b')') => Prev::CloseParen(self.parens.pop().unwrap_or(ParenKind::Other)),
            Token::Punct(b'{') => {
                let kind = if before == Prev::Word("do") {
                    BlockKind::Do
                } else {
                    BlockKind::Other
                };
                self.blocks.push(kind);
                Prev::Punct(b'{')
            }
            Token::Punct(b'}') => Prev::CloseBlock(self.blocks.pop().unwrap_or(BlockKind::Other)),
            Token::Increment if self.ends_expression() => Prev::Postfix,
            Token::Increment => Prev::Punct(b'+'),
            Token::Punct(c) => Prev::Punct(c),
            Token::Literal(kind) => Prev::Literal(kind),
        };
    }

    /// Record an inserted semicolon.
    pub fn observe_semicolon(&mut self) {
        self.inserted += 1;
        self.prev = Prev::Punct(b';');
    }

    /// Decide whether a `;` replaces the line break before `next`.
    pub fn needs_semicolon(&self, next: Token<'_>) -> bool {
        if !self.ends_expression() {
            return self.ends_restricted_statement() && !closes_statement(next);
        }

        match next {
            Token::Word(word) if is_statement_keyword(word) => {
                !(word == "while" && self.prev == Prev::CloseBlock(BlockKind::Do))
            }
            Token::IifeOpen => true,
            Token::Word(word) => !is_reserved(word) || is_value_keyword(word),
            Token::Literal(LiteralKind::String) | Token::Increment => true,
            _ => false,
        }
    }

    /// True when the previous line can end an expression statement.
    fn ends_expression(&self) -> bool {
        match self.prev {
            Prev::Word(word) => !is_reserved(word) || is_value_keyword(word),
            Prev::CloseParen(kind) => kind == ParenKind::Other,
            Prev::CloseBlock(_) | Prev::Literal(_) | Prev::Postfix | Prev::Punct(b']') => true,
            Prev::Start | Prev::Punct(_) => false,
        }
    }

    /// `return`, `break`, `continue` and `yield` may not span a line break.
    fn ends_restricted_statement(&self) -> bool {
        matches!(self.prev, Prev::Word("return" | "break" | "continue" | "yield"))
    }

    fn opens_control_head(&self, before: Prev<'_>) -> bool {
        match before {
            Prev::Word("if" | "for" | "with" | "switch" | "catch") => true,
            Prev::Word("while") => !self.while_closes_do,
            Prev::Word("await") => self.prev_word == Some("for"),
            _ => false,
        }
    }
}

fn closes_statement(next: Token<'_>) -> bool {
    matches!(next, Token::Punct(b'}' | b';' | b')'))
}

/// Keywords that start a statement and trigger insertion after a complete line.
pub fn is_statement_keyword(word: &str) -> bool {
    matches!(
        word,
        "const"
            | "let"
            | "var"
            | "function"
            | "class"
            | "if"
            | "for"
            | "while"
            | "do"
            | "try"
            | "switch"
            | "return"
            | "export"
            | "import"
            | "new"
            | "yield"
            | "throw"
            | "break"
            | "continue"
            | "await"
    )
}

/// Keywords that evaluate to a value and may end an expression.
fn is_value_keyword(word: &str) -> bool {
    matches!(word, "this" | "null" | "true" | "false" | "super")
}

/// Reserved words (plus contextual keywords that continue an expression).
pub fn is_reserved(word: &str) -> bool {
    matches!(
        word,
        "await"
            | "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "export"
            | "extends"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "let"
            | "new"
            | "return"
            | "switch"
            | "throw"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "yield"
            | "async"
            | "of"
            | "as"
            | "from"
            | "this"
            | "null"
            | "true"
            | "false"
            | "super"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(tokens: &[Token<'static>]) -> AsiContext<'static> {
        let mut ctx = AsiContext::new();
        for token in tokens {
            ctx.observe(*token);
        }
        ctx
    }

    #[test]
    fn test_keyword_after_value() {
        let ctx = context(&[Token::Word("x"), Token::Punct(b'='), Token::Word("1")]);
        assert!(ctx.needs_semicolon(Token::Word("const")));
        assert!(ctx.needs_semicolon(Token::IifeOpen));
        assert!(!ctx.needs_semicolon(Token::Word("instanceof")));
        assert!(!ctx.needs_semicolon(Token::Punct(b'(')));
        assert!(!ctx.needs_semicolon(Token::Punct(b'.')));
    }

    #[test]
    fn test_no_insert_after_operator() {
        let ctx = context(&[Token::Word("a"), Token::Punct(b'+')]);
        assert!(!ctx.needs_semicolon(Token::Word("b")));
        assert!(!ctx.needs_semicolon(Token::Word("new")));
    }

    #[test]
    fn test_control_head() {
        let ctx = context(&[
            Token::Word("if"),
            Token::Punct(b'('),
            Token::Word("x"),
            Token::Punct(b')'),
        ]);
        assert!(!ctx.needs_semicolon(Token::Word("return")));
        assert!(!ctx.needs_semicolon(Token::Word("foo")));
    }

    #[test]
    fn test_for_await_head() {
        let ctx = context(&[
            Token::Word("for"),
            Token::Word("await"),
            Token::Punct(b'('),
            Token::Word("x"),
            Token::Punct(b')'),
        ]);
        assert!(!ctx.needs_semicolon(Token::Word("foo")));
    }

    #[test]
    fn test_do_while() {
        let ctx = context(&[
            Token::Word("do"),
            Token::Punct(b'{'),
            Token::Word("a"),
            Token::Punct(b'}'),
        ]);
        assert!(!ctx.needs_semicolon(Token::Word("while")));

        let ctx = context(&[Token::Word("if"), Token::Punct(b'{'), Token::Punct(b'}')]);
        assert!(ctx.needs_semicolon(Token::Word("while")));
    }

    #[test]
    fn test_continuation_keywords() {
        let ctx = context(&[Token::Punct(b'{'), Token::Punct(b'}')]);
        assert!(!ctx.needs_semicolon(Token::Word("else")));
        assert!(!ctx.needs_semicolon(Token::Word("catch")));
        assert!(!ctx.needs_semicolon(Token::Word("finally")));
        assert!(ctx.needs_semicolon(Token::Word("foo")));
    }

    #[test]
    fn test_restricted_return() {
        let ctx = context(&[Token::Word("return")]);
        assert!(ctx.needs_semicolon(Token::Punct(b'(')));
        assert!(ctx.needs_semicolon(Token::Word("x")));
        assert!(!ctx.needs_semicolon(Token::Punct(b'}')));
    }

    #[test]
    fn test_restricted_yield() {
        let ctx = context(&[Token::Punct(b'{'), Token::Word("yield")]);
        assert!(ctx.needs_semicolon(Token::Word("foo")));
        assert!(!ctx.needs_semicolon(Token::Punct(b'}')));
    }

    #[test]
    fn test_increment() {
        let ctx = context(&[Token::Word("i"), Token::Increment]);
        assert!(ctx.needs_semicolon(Token::Word("foo")));

        let ctx = context(&[Token::Word("x")]);
        assert!(ctx.needs_semicolon(Token::Increment));
    }

    #[test]
    fn test_template_is_tagged_not_terminated() {
        let ctx = context(&[Token::Word("tag")]);
        assert!(!ctx.needs_semicolon(Token::Literal(LiteralKind::Template)));
        assert!(ctx.needs_semicolon(Token::Literal(LiteralKind::String)));
    }
}
