//! Splitting a message into ordered, length-bounded segments.
//!
//! Lengths are counted in `char`s. When a message needs more than one
//! segment, every segment's wire text starts with a `[i/n] ` marker so the
//! receiver can put the parts back in order.
//!
//! The marker is not escaped: a message that itself contains text shaped
//! like `[2/5] ` cannot be told apart from an inserted marker.

use std::fmt;

/// Characters reserved for the `[i/n] ` marker (covers part counts up to 999).
pub const MARKER_BUDGET: usize = 11;

/// One wire-ready piece of a message.
///
/// Segments of a multi-part message normally carry a `[i/n] ` marker. The
/// exception is a `max_length` of 11 or less, which cannot hold a marker and
/// any content: those segments still report `total_segments > 1`, but
/// [`Self::marker`] is `None` and [`Self::text`] is the bare body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position of this segment.
    pub sequence_index: usize,
    /// Number of segments the message was split into.
    pub total_segments: usize,
    /// Segment content without the marker.
    pub body: String,
    marked: bool,
}

impl Segment {
    fn single(body: impl Into<String>) -> Self {
        Self {
            sequence_index: 1,
            total_segments: 1,
            body: body.into(),
            marked: false,
        }
    }

    /// The `[i/n] ` prefix, if this segment carries one.
    pub fn marker(&self) -> Option<String> {
        self.marked
            .then(|| format!("[{}/{}] ", self.sequence_index, self.total_segments))
    }

    /// The text handed to the transport: marker followed by the body.
    pub fn text(&self) -> String {
        self.marker()
            .map_or_else(|| self.body.clone(), |marker| marker + &self.body)
    }

    /// Length of [`Self::text`] in characters.
    pub fn len(&self) -> usize {
        self.marker().map_or(0, |marker| char_len(&marker)) + char_len(&self.body)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn is_last(&self) -> bool {
        self.sequence_index == self.total_segments
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(marker) = self.marker() {
            f.write_str(&marker)?;
        }
        f.write_str(&self.body)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

const fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Width of the widest marker for `total` parts, e.g. `[12/12] ` is 8.
const fn marker_width(total: usize) -> usize {
    2 * digits(total) + 4
}

/// Split `word` into consecutive pieces of at most `limit` characters.
fn hard_slice(word: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in word.char_indices() {
        if count == limit {
            pieces.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < word.len() {
        pieces.push(&word[start..]);
    }

    pieces
}

fn flush(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Greedily pack whitespace-terminated tokens into chunks of at most `limit`
/// characters, measured without the whitespace at the chunk's edges.
///
/// Separators between words are kept as written, so line breaks and tabs
/// survive inside a chunk. Only a word with no whitespace boundary that is
/// longer than `limit` on its own gets sliced.
fn pack(message: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for token in message.split_inclusive(char::is_whitespace) {
        let word = token.trim_end();

        if word.is_empty() {
            if !current.is_empty() {
                current.push_str(token);
                current_len += char_len(token);
            }
            continue;
        }

        let word_len = char_len(word);

        if word_len > limit {
            flush(&mut chunks, &current);
            current.clear();
            current_len = 0;

            for piece in hard_slice(word, limit) {
                flush(&mut chunks, piece);
            }
            continue;
        }

        if !current.is_empty() && current_len + word_len > limit {
            flush(&mut chunks, &current);
            current.clear();
            current_len = 0;
        }

        current.push_str(token);
        current_len += char_len(token);
    }

    flush(&mut chunks, &current);
    chunks
}

fn unmarked(chunks: Vec<String>) -> Vec<Segment> {
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(idx, body)| Segment {
            sequence_index: idx + 1,
            total_segments: total,
            body,
            marked: false,
        })
        .collect()
}

fn marked(chunks: Vec<String>) -> Vec<Segment> {
    unmarked(chunks)
        .into_iter()
        .map(|segment| Segment {
            marked: true,
            ..segment
        })
        .collect()
}

/// Split `message` into segments whose wire text is at most `max_length`
/// characters.
///
/// Any whitespace character separates words, and the separators between
/// words in the same segment are kept, so line layout survives. A word that
/// cannot fit in one segment on its own is sliced into consecutive pieces.
/// Nothing is dropped apart from whitespace at segment edges.
///
/// A `max_length` of zero is treated as one. When `max_length` is
/// [`MARKER_BUDGET`] or less it cannot hold a marker and at least one
/// character, so the pieces are emitted without markers even though
/// `total_segments` may exceed one.
pub fn segment(message: &str, max_length: usize) -> Vec<Segment> {
    let max_length = max_length.max(1);

    if char_len(message) <= max_length {
        return vec![Segment::single(message)];
    }

    let mut budget = MARKER_BUDGET;

    loop {
        if budget >= max_length {
            let chunks = pack(message, max_length);
            if chunks.is_empty() {
                return vec![Segment::single("")];
            }
            return unmarked(chunks);
        }

        let mut chunks = pack(message, max_length - budget);
        match chunks.len() {
            0 => return vec![Segment::single("")],
            1 => return vec![Segment::single(chunks.remove(0))],
            total if marker_width(total) <= budget => return marked(chunks),
            total => budget = marker_width(total),
        }
    }
}
