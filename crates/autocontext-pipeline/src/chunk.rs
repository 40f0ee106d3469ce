use autocontext_core::error::{AutoContextError, Result};

/// Splits text into overlapping chunks on word boundaries
///
/// Sizes are measured in characters. A word longer than `chunk_size` becomes
/// a chunk of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AutoContextError::ConfigInvalid {
                key: "ingestion.chunk_size".to_string(),
                reason: "chunk_size must be greater than zero".to_string(),
            });
        }

        if chunk_overlap >= chunk_size {
            return Err(AutoContextError::ConfigInvalid {
                key: "ingestion.chunk_overlap".to_string(),
                reason: format!(
                    "overlap ({}) must be less than chunk_size ({})",
                    chunk_overlap, chunk_size
                ),
            });
        }

        Ok(Self { chunk_size, chunk_overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0usize;

        for word in text.split_whitespace() {
            let word_len = word.chars().count();

            if !current.is_empty() && current_len + 1 + word_len > self.chunk_size {
                chunks.push(current.join(" "));

                let (mut carried, mut carried_len) = self.trailing_overlap(&current);
                // Drop carried words until the incoming word fits
                while !carried.is_empty() && carried_len + 1 + word_len > self.chunk_size {
                    let removed = carried.remove(0);
                    carried_len = if carried.is_empty() {
                        0
                    } else {
                        carried_len - removed.chars().count() - 1
                    };
                }

                current = carried;
                current_len = carried_len;
            }

            current_len = if current.is_empty() { word_len } else { current_len + 1 + word_len };
            current.push(word);
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }

    /// Longest run of trailing words fitting in the overlap budget
    fn trailing_overlap<'a>(&self, words: &[&'a str]) -> (Vec<&'a str>, usize) {
        let mut carried = Vec::new();
        let mut carried_len = 0usize;

        for word in words.iter().rev() {
            let word_len = word.chars().count();
            let next_len = if carried.is_empty() { word_len } else { carried_len + 1 + word_len };
            if next_len > self.chunk_overlap {
                break;
            }
            carried.push(*word);
            carried_len = next_len;
        }

        carried.reverse();
        (carried, carried_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        assert_eq!(splitter.split("a short   sentence"), vec!["a short sentence"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        assert!(splitter.split("   \n\t ").is_empty());
    }

    #[test]
    fn test_chunks_share_overlap() {
        let splitter = TextSplitter::new(11, 5).unwrap();
        let chunks = splitter.split("aaa bbb ccc ddd eee");
        assert_eq!(chunks, vec!["aaa bbb ccc", "ccc ddd eee"]);
    }

    #[test]
    fn test_long_word_becomes_own_chunk() {
        let splitter = TextSplitter::new(5, 2).unwrap();
        let chunks = splitter.split("ab abcdefghij cd");
        assert_eq!(chunks, vec!["ab", "abcdefghij", "cd"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_size_and_keep_words(
            words in proptest::collection::vec("[a-z]{1,8}", 0..60),
            size in 10usize..40,
            overlap_ratio in 0usize..9,
        ) {
            let overlap = size * overlap_ratio / 10;
            let splitter = TextSplitter::new(size, overlap).unwrap();
            let text = words.join(" ");
            let chunks = splitter.split(&text);

            for chunk in &chunks {
                prop_assert!(chunk.chars().count() <= size);
                prop_assert!(!chunk.is_empty());
            }

            // Every word shows up in some chunk, in order
            let mut position = 0usize;
            for chunk in &chunks {
                let chunk_words: Vec<&str> = chunk.split(' ').collect();
                for w in chunk_words {
                    if position < words.len() && w == words[position] {
                        position += 1;
                    }
                }
            }
            prop_assert_eq!(position, words.len());
        }
    }
}
