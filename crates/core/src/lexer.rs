/// Tokens of the model description language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and numbers alike: a run of `[A-Za-z0-9._-]`.
    /// Keywords, state names and probabilities are told apart by the parser.
    Word(String),
    Colon,
    Semi,
    LBrace,
    RBrace,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

/// Blank out every line whose first character is `#`.
///
/// The newline is kept so later lines keep their original line numbers.
pub fn strip_comments(src: &str) -> String {
    src.split_inclusive('\n')
        .map(|line| {
            if line.starts_with('#') {
                if line.ends_with('\n') {
                    "\n"
                } else {
                    ""
                }
            } else {
                line
            }
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

/// Split comment-free source text into tokens.
///
/// Whitespace and any character that is neither a word character nor one of
/// `: ; { }` is skipped silently. The stream always ends with [`Token::Eof`].
pub fn lex(src: &str) -> Vec<Spanned> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    while pos < chars.len() {
        let c = chars[pos];

        if c == '\n' {
            line += 1;
            pos += 1;
            continue;
        }

        let punct = match c {
            ':' => Some(Token::Colon),
            ';' => Some(Token::Semi),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            _ => None,
        };
        if let Some(token) = punct {
            tokens.push(Spanned { token, line });
            pos += 1;
            continue;
        }

        if is_word_char(c) {
            let start = pos;
            while pos < chars.len() && is_word_char(chars[pos]) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                line,
            });
            continue;
        }

        pos += 1;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    tracing::debug!(count = tokens.len() - 1, "lexed model source");
    tokens
}
