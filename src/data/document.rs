use serde::{Deserialize, Serialize};

/// An annotated document in Odinson JSON form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub metadata: Vec<serde_json::Value>,
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(rename = "numTokens")]
    pub num_tokens: u32,
    pub fields: Vec<Field>,
}

/// A per-sentence field. Only token annotations are indexed; other kinds
/// (dependency graphs, ...) are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Field {
    #[serde(rename = "ai.lum.odinson.TokensField")]
    TokensField { name: String, tokens: Vec<String> },
    #[serde(other)]
    Other,
}

impl Sentence {
    /// Build a sentence from `(annotation, tokens)` pairs
    pub fn from_annotations<I, S>(annotations: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let fields: Vec<Field> = annotations
            .into_iter()
            .map(|(name, tokens)| Field::TokensField { name: name.into(), tokens })
            .collect();
        let num_tokens = fields
            .iter()
            .map(|f| match f {
                Field::TokensField { tokens, .. } => tokens.len() as u32,
                Field::Other => 0,
            })
            .max()
            .unwrap_or(0);
        Self { num_tokens, fields }
    }

    /// Values of one annotation, one per token
    pub fn tokens(&self, annotation: &str) -> Option<&[String]> {
        self.fields.iter().find_map(|field| match field {
            Field::TokensField { name, tokens } if name == annotation => Some(tokens.as_slice()),
            _ => None,
        })
    }

    pub fn annotation_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|field| match field {
            Field::TokensField { name, .. } => Some(name.as_str()),
            Field::Other => None,
        })
    }
}

impl Document {
    pub fn new(id: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self { id: id.into(), metadata: Vec::new(), sentences }
    }

    pub fn tokens(&self, sentence_idx: usize, annotation: &str) -> Option<&[String]> {
        self.sentences.get(sentence_idx)?.tokens(annotation)
    }

    pub fn sentence_length(&self, sentence_idx: usize) -> Option<u32> {
        self.sentences.get(sentence_idx).map(|s| s.num_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "id": "doc-1",
        "metadata": [],
        "sentences": [{
            "numTokens": 3,
            "fields": [
                {"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": ["Cats", "purr", "."]},
                {"$type": "ai.lum.odinson.TokensField", "name": "lemma", "tokens": ["cat", "purr", "."]},
                {"$type": "ai.lum.odinson.GraphField", "name": "dependencies", "edges": [[1, 0, "nsubj"]], "roots": [1]}
            ]
        }]
    }"#;

    #[test]
    fn test_parse_odinson_document() {
        let doc: Document = serde_json::from_str(DOC).unwrap();
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.sentence_length(0), Some(3));
        assert_eq!(doc.tokens(0, "lemma").unwrap()[0], "cat");
        assert!(doc.tokens(0, "dependencies").is_none());
        assert_eq!(doc.sentences[0].annotation_names().collect::<Vec<_>>(), vec!["word", "lemma"]);
    }

    #[test]
    fn test_sentence_from_annotations() {
        let words = vec!["a".to_string(), "b".to_string()];
        let sentence = Sentence::from_annotations(vec![("word", words.clone())]);
        assert_eq!(sentence.num_tokens, 2);
        assert_eq!(sentence.tokens("word"), Some(words.as_slice()));
    }
}
