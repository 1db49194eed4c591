//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! words, then characters) and merges the pieces back into chunks of at most
//! `chunk_size` characters, carrying up to `chunk_overlap` characters from
//! the end of one chunk into the next.

use std::collections::VecDeque;

use docent_core::retrieval::Passage;

use crate::loader::Document;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits document text into overlapping chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 120,
        }
    }
}

impl TextSplitter {
    /// Overlap is clamped below `chunk_size`; a zero `chunk_size` becomes 1.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split raw text into chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    /// Split every document, numbering chunks per source.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Passage> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .enumerate()
                    .map(|(i, chunk)| Passage::new(chunk, doc.source.clone(), i))
            })
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (position, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
            .map(|(i, sep)| (i, *sep))
            .unwrap_or((separators.len(), ""));
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|piece| !piece.is_empty())
                .map(String::from)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        let joiner = |window: &VecDeque<&str>| if window.is_empty() { 0 } else { sep_len };

        for piece in pieces {
            let len = char_len(piece);

            if total + len + joiner(&window) > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);

                // Drop from the front until only the overlap remains and the
                // next piece fits.
                while total > self.chunk_overlap
                    || (total > 0 && total + len + joiner(&window) > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + joiner(&window);
                }
            }

            total += len + joiner(&window);
            window.push_back(piece.as_str());
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
