/// Recursive-descent parser for the model description language.
///
/// A model file is exactly one `header { ... }` block followed by state
/// blocks until the end of input. No resolution is done here -- ties,
/// targets and symbols are checked by the normalizer and matrix builder.
use crate::ast::{Header, Provenance, RawModel, RawState};
use crate::error::HmmError;
use crate::lexer::{Spanned, Token};
use std::collections::HashMap;

mod blocks;
mod values;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    /// Cursor position, for backtracking with [`Parser::rewind`].
    fn mark(&self) -> usize {
        self.pos
    }

    fn rewind(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn expect(&mut self, expected: Token, shown: &str) -> Result<(), HmmError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {}", shown, self.describe())))
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<u32, HmmError> {
        let s = self.cur();
        let line = s.line;
        if let Token::Word(w) = &s.token {
            if w == expected {
                self.advance();
                return Ok(line);
            }
        }
        Err(self.err(format!("expected '{}', got {}", expected, self.describe())))
    }

    fn expect_lbrace(&mut self) -> Result<(), HmmError> {
        self.expect(Token::LBrace, "{")
    }

    fn expect_semi(&mut self) -> Result<(), HmmError> {
        self.expect(Token::Semi, ";")
    }

    fn take_word(&mut self) -> Result<String, HmmError> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected identifier, got {}", self.describe())))
        }
    }

    fn err(&self, msg: impl Into<String>) -> HmmError {
        HmmError::grammar(&self.filename, self.cur_line(), msg)
    }

    fn prov(&self, line: u32) -> Provenance {
        Provenance {
            file: self.filename.clone(),
            line,
        }
    }

    fn describe(&self) -> String {
        match self.peek() {
            Token::Word(w) => format!("'{}'", w),
            Token::Colon => "':'".to_owned(),
            Token::Semi => "';'".to_owned(),
            Token::LBrace => "'{'".to_owned(),
            Token::RBrace => "'}'".to_owned(),
            Token::Eof => "end of input".to_owned(),
        }
    }

    // -- Top level ----------------------------------------------

    fn parse_file(&mut self) -> Result<RawModel, HmmError> {
        let header = self.parse_header()?;

        let mut states: Vec<(String, RawState)> = Vec::new();
        let mut seen: HashMap<String, u32> = HashMap::new();
        while self.peek() != &Token::Eof {
            let (name, state) = self.parse_state()?;
            if let Some(first) = seen.get(&name) {
                return Err(HmmError::grammar(
                    &self.filename,
                    state.prov.line,
                    format!(
                        "duplicate state '{}': first declared at line {}",
                        name, first
                    ),
                ));
            }
            seen.insert(name.clone(), state.prov.line);
            states.push((name, state));
        }

        tracing::debug!(
            file = %self.filename,
            states = states.len(),
            "parsed model"
        );
        Ok(RawModel { header, states })
    }
}

/// Parse a token stream into a header and its state blocks.
///
/// Fails on the first malformed block; nothing partial is returned.
pub fn parse(tokens: &[Spanned], filename: &str) -> Result<RawModel, HmmError> {
    check_terminated(tokens, filename)?;
    let mut p = Parser::new(tokens, filename);
    p.parse_file()
}

/// Parse only the leading `header { ... }` block.
pub fn parse_header(tokens: &[Spanned], filename: &str) -> Result<Header, HmmError> {
    check_terminated(tokens, filename)?;
    let mut p = Parser::new(tokens, filename);
    p.parse_header()
}

/// The cursor relies on a trailing [`Token::Eof`], as produced by the lexer.
fn check_terminated(tokens: &[Spanned], filename: &str) -> Result<(), HmmError> {
    match tokens.last() {
        Some(Spanned {
            token: Token::Eof, ..
        }) => Ok(()),
        last => Err(HmmError::grammar(
            filename,
            last.map_or(1, |s| s.line),
            "unexpected end of input",
        )),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FieldValue;
    use crate::lexer;

    fn lex_and_parse(src: &str) -> Result<RawModel, HmmError> {
        let tokens = lexer::lex(&lexer::strip_comments(src));
        parse(&tokens, "test.model")
    }

    fn grammar_message(err: HmmError) -> (u32, String) {
        match err {
            HmmError::Grammar { line, message, .. } => (line, message),
            other => panic!("expected grammar error, got {:?}", other),
        }
    }

    const TOY: &str = "\
# toy model
header {
  alphabet AB;
}
begin {
  trans X:0.6 Y:0.4;
  type 0;
}
X {
  trans X:0.7 Y:0.3;
  only A:0.9 B:0.1;
  label x;
  end 1;
}
Y {
  tied_trans X;
  trans Y X;
  tied_letter X;
  label y;
}
";

    #[test]
    fn parses_header_and_states_in_order() {
        let model = lex_and_parse(TOY).expect("toy model parses");
        assert_eq!(model.header.get("alphabet"), Some("AB"));
        let names: Vec<&str> = model.states.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["begin", "X", "Y"]);

        let x = model.state("X").unwrap();
        assert_eq!(
            x.table("trans"),
            Some(&vec![("X".to_owned(), 0.7), ("Y".to_owned(), 0.3)])
        );
        assert_eq!(x.scalar("label"), Some("x"));
        assert_eq!(x.int("end"), Some(1));
        assert_eq!(x.prov.line, 9);

        let begin = model.state("begin").unwrap();
        assert_eq!(begin.int("type"), Some(0));
    }

    #[test]
    fn bare_targets_fall_back_to_a_list() {
        let model = lex_and_parse(TOY).unwrap();
        let y = model.state("Y").unwrap();
        assert_eq!(
            y.get("trans"),
            Some(&FieldValue::List(vec!["Y".to_owned(), "X".to_owned()]))
        );
        assert_eq!(y.scalar("tied_trans"), Some("X"));
        assert_eq!(y.scalar("tied_letter"), Some("X"));
    }

    #[test]
    fn empty_table_is_a_map() {
        let model = lex_and_parse("header { alphabet A; } s { trans ; only A:1; }").unwrap();
        let s = model.state("s").unwrap();
        assert_eq!(s.get("trans"), Some(&FieldValue::Map(Vec::new())));
    }

    #[test]
    fn header_only_model_has_no_states() {
        let model = lex_and_parse("header { alphabet ACGT; }").unwrap();
        assert!(model.states.is_empty());
        assert_eq!(model.header.alphabet(), Some(vec!['A', 'C', 'G', 'T']));
    }

    #[test]
    fn unterminated_state_block_is_rejected() {
        let err = lex_and_parse("header { alphabet A; }\ns {\n  only A:1;\n").unwrap_err();
        let (_, message) = grammar_message(err);
        assert!(message.contains("end of input"), "{}", message);
    }

    #[test]
    fn missing_semicolon_is_rejected() {
        let err = lex_and_parse("header { alphabet A; }\ns {\n  label x\n}").unwrap_err();
        let (line, message) = grammar_message(err);
        assert_eq!(line, 4);
        assert!(message.contains("expected ';'"), "{}", message);
    }

    #[test]
    fn header_keyword_is_required() {
        let err = lex_and_parse("heading { alphabet A; }").unwrap_err();
        let (line, message) = grammar_message(err);
        assert_eq!(line, 1);
        assert!(message.contains("expected 'header'"), "{}", message);
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = lex_and_parse("header { alphabet A; } s { label x; } }").unwrap_err();
        let (_, message) = grammar_message(err);
        assert!(message.contains("expected identifier"), "{}", message);
    }

    #[test]
    fn mixed_map_and_list_is_rejected() {
        let err = lex_and_parse("header { alphabet A; } s { trans a:0.5 b; }").unwrap_err();
        let (_, message) = grammar_message(err);
        assert!(message.contains("expected identifier, got ':'"), "{}", message);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let err = lex_and_parse("header { alphabet A; } s { only A:high; }").unwrap_err();
        assert!(grammar_message(err).1.contains("invalid probability 'high'"));

        let err = lex_and_parse("header { alphabet A; } s { type two; }").unwrap_err();
        assert!(grammar_message(err).1.contains("invalid integer 'two'"));
    }

    #[test]
    fn duplicate_state_names_are_rejected() {
        let err =
            lex_and_parse("header { alphabet A; }\ns { label a; }\ns { label b; }").unwrap_err();
        let (line, message) = grammar_message(err);
        assert_eq!(line, 3);
        assert!(message.contains("first declared at line 2"), "{}", message);
    }

    #[test]
    fn repeated_table_key_keeps_first_position_and_last_value() {
        let model =
            lex_and_parse("header { alphabet A; } P { trans P:0.1 Q:0.7 P:0.3; }").unwrap();
        assert_eq!(
            model.state("P").unwrap().table("trans"),
            Some(&vec![("P".to_owned(), 0.3), ("Q".to_owned(), 0.7)])
        );
    }

    #[test]
    fn token_stream_without_eof_is_rejected() {
        let (line, message) = grammar_message(parse(&[], "empty.model").unwrap_err());
        assert_eq!(line, 1);
        assert!(message.contains("unexpected end of input"), "{}", message);

        let mut tokens = lexer::lex("header { alphabet A; }");
        tokens.pop();
        assert!(parse(&tokens, "cut.model").is_err());
        assert!(parse_header(&tokens, "cut.model").is_err());
    }

    #[test]
    fn repeated_field_keeps_last_value() {
        let model = lex_and_parse("header { alphabet A; } s { label a; label b; }").unwrap();
        assert_eq!(model.state("s").unwrap().scalar("label"), Some("b"));
    }
}
