//! Length-driven text splitting with overlap.
//!
//! Text is cut on a separator (newline by default) and the pieces are merged
//! greedily into windows of at most `chunk_size` characters. When a window is
//! emitted, the pieces at its tail are carried into the next one until at
//! most `chunk_overlap` characters remain. A piece that alone exceeds
//! `chunk_size` is cut into fixed character windows that overlap by exactly
//! `chunk_overlap` characters.
//!
//! Lengths are counted in `char`s, never bytes.

use std::collections::VecDeque;

use crate::config::ChunkingSettings;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl TextSplitter {
    pub fn new(settings: &ChunkingSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            separator: settings.separator.clone(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separator_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in text.split(self.separator.as_str()).filter(|p| !p.is_empty()) {
            let len = piece.chars().count();

            if len > self.chunk_size {
                self.emit(&window, &mut chunks);
                window.clear();
                total = 0;
                self.hard_split(piece, &mut chunks);
                continue;
            }

            let joiner = if window.is_empty() { 0 } else { separator_len };
            if total + len + joiner > self.chunk_size && !window.is_empty() {
                self.emit(&window, &mut chunks);

                // Keep a tail of the emitted window as overlap for the next chunk
                loop {
                    let joiner = if window.is_empty() { 0 } else { separator_len };
                    let overflowing = total > 0 && total + len + joiner > self.chunk_size;
                    if total <= self.chunk_overlap && !overflowing {
                        break;
                    }
                    let Some((_, dropped)) = window.pop_front() else {
                        break;
                    };
                    let joined = if window.is_empty() { 0 } else { separator_len };
                    total -= dropped + joined;
                }
            }

            let joiner = if window.is_empty() { 0 } else { separator_len };
            window.push_back((piece, len));
            total += len + joiner;
        }

        self.emit(&window, &mut chunks);
        chunks
    }

    /// Joins the window and pushes it, trimmed, unless it is blank.
    fn emit(&self, window: &VecDeque<(&str, usize)>, chunks: &mut Vec<String>) {
        if window.is_empty() {
            return;
        }
        let joined = window
            .iter()
            .map(|(piece, _)| *piece)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }

    /// Fixed windows of `chunk_size` stepping by `chunk_size - chunk_overlap`.
    /// Windows are not trimmed so neighbouring overlaps stay exact.
    fn hard_split(&self, piece: &str, chunks: &mut Vec<String>) {
        let chars: Vec<char> = piece.chars().collect();
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            if !window.trim().is_empty() {
                chunks.push(window);
            }
            if end == chars.len() {
                break;
            }
            start = end - self.chunk_overlap;
        }
    }
}
