use super::Parser;
use crate::ast::ProbTable;
use crate::error::HmmError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    /// Try `key:prob key:prob ...` up to (not including) the `;`.
    ///
    /// Returns `Ok(None)` with the cursor rewound to where it started when a
    /// candidate key is not followed by `:`, so the caller can retry the same
    /// tokens as a list. A repeated key keeps its first position and takes
    /// the last value.
    pub(super) fn parse_table(&mut self) -> Result<Option<ProbTable>, HmmError> {
        let start = self.mark();
        let mut table = ProbTable::new();
        while self.peek() != &Token::Semi {
            let key = self.take_word()?;
            if self.peek() != &Token::Colon {
                self.rewind(start);
                return Ok(None);
            }
            self.advance();
            let prob = self.take_float()?;
            match table.iter().position(|(k, _)| *k == key) {
                Some(i) => table[i].1 = prob,
                None => table.push((key, prob)),
            }
        }
        Ok(Some(table))
    }

    /// Bare identifiers up to (not including) the `;`.
    pub(super) fn parse_list(&mut self) -> Result<Vec<String>, HmmError> {
        let mut items = Vec::new();
        while self.peek() != &Token::Semi {
            items.push(self.take_word()?);
        }
        Ok(items)
    }

    pub(super) fn take_float(&mut self) -> Result<f64, HmmError> {
        let w = self.take_word()?;
        w.parse::<f64>()
            .map_err(|_| self.err(format!("invalid probability '{}'", w)))
    }

    pub(super) fn take_int(&mut self) -> Result<i64, HmmError> {
        let w = self.take_word()?;
        w.parse::<i64>()
            .map_err(|_| self.err(format!("invalid integer '{}'", w)))
    }
}
