use super::Parser;
use crate::ast::{FieldValue, Header, RawState};
use crate::error::HmmError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    /// `header { key value; ... }`
    pub(super) fn parse_header(&mut self) -> Result<Header, HmmError> {
        self.expect_word("header")?;
        self.expect_lbrace()?;
        let mut header = Header::default();
        while self.peek() != &Token::RBrace {
            let key = self.take_word()?;
            let value = self.take_word()?;
            self.expect_semi()?;
            header.entries.insert(key, value);
        }
        self.advance();
        Ok(header)
    }

    /// `name { field value; ... }`
    pub(super) fn parse_state(&mut self) -> Result<(String, RawState), HmmError> {
        let line = self.cur_line();
        let name = self.take_word()?;
        self.expect_lbrace()?;
        let mut state = RawState::new(self.prov(line));
        while self.peek() != &Token::RBrace {
            let field = self.take_word()?;
            let value = match field.as_str() {
                "trans" | "only" => match self.parse_table()? {
                    Some(table) => FieldValue::Map(table),
                    None => FieldValue::List(self.parse_list()?),
                },
                "type" | "end" => FieldValue::Int(self.take_int()?),
                _ => FieldValue::Scalar(self.take_word()?),
            };
            self.expect_semi()?;
            state.fields.insert(field, value);
        }
        self.advance();
        Ok((name, state))
    }
}
