use std::ops::Range;

/// One whitespace-separated word of a command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The word with its quotes removed.
    pub text: String,
    /// Byte range of the word, quotes included, in the original line.
    pub span: Range<usize>,
    /// Whether any part of the word was quoted.
    pub quoted: bool,
}

impl Token {
    /// Returns `true` if this is the unquoted keyword `keyword`, in any case.
    ///
    /// A quoted `"where"` is a value, never a keyword.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Splits a command line into words the way a shell does.
///
/// Whitespace separates words; single or double quotes group characters,
/// including whitespace, and are removed from the word text. There is no
/// escaping. An unterminated quote runs to the end of the line.
pub struct Tokenizer {
    /// The input as `(byte offset, char)` pairs for easy iteration.
    input: Vec<(usize, char)>,
    /// Byte length of the input, the end of the last span.
    len: usize,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given command line.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.char_indices().collect(),
            len: input.len(),
            position: 0,
        }
    }

    /// Processes the entire input and returns its words.
    ///
    /// # Example
    /// ```
    /// # use flatdb::tokenizer::Tokenizer;
    /// let tokens = Tokenizer::new(r#"create_table "users" name:str"#).tokenize();
    /// assert_eq!(tokens[1].text, "users");
    /// assert!(tokens[1].quoted);
    /// assert_eq!(tokens[2].span, 21..29);
    /// ```
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.read_word());
        }

        tokens
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position].1
    }

    /// Returns the byte offset of the current position.
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map_or(self.len, |(offset, _)| *offset)
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads one word, concatenating quoted and unquoted parts until
    /// unquoted whitespace.
    fn read_word(&mut self) -> Token {
        let start = self.offset();
        let mut text = String::new();
        let mut quoted = false;

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_whitespace() {
                break;
            }
            if ch == '"' || ch == '\'' {
                quoted = true;
                self.read_quoted(ch, &mut text);
                continue;
            }
            text.push(ch);
            self.advance();
        }

        Token {
            text,
            span: start..self.offset(),
            quoted,
        }
    }

    /// Reads the inside of a quoted part opened by `quote`.
    fn read_quoted(&mut self, quote: char, text: &mut String) {
        self.advance(); // Skip the opening quote

        while !self.is_at_end() && self.current_char() != quote {
            text.push(self.current_char());
            self.advance();
        }

        if !self.is_at_end() {
            self.advance(); // Skip the closing quote
        }
    }
}

/// Shorthand for `Tokenizer::new(line).tokenize()`.
pub fn tokenize(line: &str) -> Vec<Token> {
    Tokenizer::new(line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        tokenize(line).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(
            texts("create_table users name:str age:int"),
            vec!["create_table", "users", "name:str", "age:int"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_quotes_group_whitespace() {
        let tokens = tokenize(r#"info "my table" 'x y'"#);

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "my table");
        assert!(tokens[1].quoted);
        assert_eq!(tokens[2].text, "x y");
        assert!(!tokens[0].quoted);
    }

    #[test]
    fn test_adjacent_parts_concatenate() {
        assert_eq!(texts(r#"name="Bob Smith""#), vec!["name=Bob Smith"]);
        assert_eq!(texts(r#"'it'"s""#), vec!["its"]);
    }

    #[test]
    fn test_spans_cover_raw_text() {
        let line = r#"select from users where name = "Bob""#;
        let tokens = tokenize(line);

        let last = tokens.last().unwrap();
        assert_eq!(&line[last.span.clone()], "\"Bob\"");
        assert_eq!(last.text, "Bob");
        assert_eq!(&line[tokens[3].span.clone()], "where");
    }

    #[test]
    fn test_spans_with_multibyte_text() {
        let line = "insert into t values ('héllo', 1)";
        let tokens = tokenize(line);

        assert_eq!(&line[tokens[4].span.start..], "('héllo', 1)");
        assert_eq!(tokens[4].text, "(héllo,");
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let tokens = tokenize("info 'open ended");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "open ended");
        assert_eq!(tokens[1].span.end, 16);
    }

    #[test]
    fn test_keywords() {
        let tokens = tokenize(r#"WHERE "where" Where"#);

        assert!(tokens[0].is_keyword("where"));
        assert!(!tokens[1].is_keyword("where"));
        assert!(tokens[2].is_keyword("where"));
    }
}
