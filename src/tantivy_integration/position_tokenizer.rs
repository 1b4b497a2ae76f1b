//! Tokenizer for annotation fields.
//!
//! A sentence's values for one annotation (word, lemma, pos, ...) are
//! stored as a single string with the values joined by [`TOKEN_SEPARATOR`].
//! The tokenizer emits value `i` at position `i`, so a hit at position `i`
//! in one annotation field lines up with token `i` in every other one.
//! Empty values (e.g. a token without an entity tag) still take up their
//! position but are not indexed.

use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

/// ASCII unit separator; unlike `|` or spaces it does not occur in tokens
pub const TOKEN_SEPARATOR: char = '\u{1F}';

pub struct AnnotationTokenStream<'a> {
    values: std::str::Split<'a, char>,
    next_position: usize,
    token: Token,
}

impl TokenStream for AnnotationTokenStream<'_> {
    fn advance(&mut self) -> bool {
        for value in self.values.by_ref() {
            let position = self.next_position;
            self.next_position += 1;
            if value.is_empty() {
                continue;
            }
            self.token.text.clear();
            self.token.text.push_str(value);
            self.token.position = position;
            self.token.offset_from = position;
            self.token.offset_to = position + 1;
            return true;
        }
        false
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}

#[derive(Clone, Default)]
pub struct AnnotationTokenizer;

impl Tokenizer for AnnotationTokenizer {
    type TokenStream<'a> = AnnotationTokenStream<'a>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        AnnotationTokenStream {
            values: text.split(TOKEN_SEPARATOR),
            next_position: 0,
            token: Token::default(),
        }
    }
}

/// Join one annotation's values for indexing
pub fn encode_annotation<S: AsRef<str>>(values: &[S]) -> String {
    let mut encoded = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            encoded.push(TOKEN_SEPARATOR);
        }
        // A stray separator inside a value would shift every later position
        encoded.extend(value.as_ref().chars().filter(|&c| c != TOKEN_SEPARATOR));
    }
    encoded
}

/// Split a stored annotation value back into per-token values
pub fn decode_annotation(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return Vec::new();
    }
    encoded.split(TOKEN_SEPARATOR).map(str::to_string).collect()
}
