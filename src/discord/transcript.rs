//! Ticket transcript rendering.
//!
//! Channel history is flattened into plain text lines and split into
//! chunks small enough to post as code blocks, leaving headroom under
//! Discord's 2000-character message limit.

/// Maximum characters of transcript text per posted chunk.
const CHUNK_LIMIT: usize = 1900;

/// One archived message, already reduced to displayable parts.
#[derive(Debug, Clone)]
pub struct TranscriptLine {
    pub timestamp: String,
    pub author: String,
    pub content: String,
}

impl TranscriptLine {
    fn render(&self) -> String {
        format!("[{}] {}: {}", self.timestamp, self.author, self.content)
    }
}

/// Render lines oldest-first into chunks of at most `CHUNK_LIMIT`
/// characters. A single oversized line is split on char boundaries
/// rather than dropped.
pub fn chunk_transcript(lines: &[TranscriptLine]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines {
        let rendered = line.render();
        for piece in split_oversized(&rendered) {
            if !current.is_empty() && current.len() + 1 + piece.len() > CHUNK_LIMIT {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(piece);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split a rendered line into pieces no longer than `CHUNK_LIMIT` bytes,
/// never cutting through a multi-byte character.
fn split_oversized(line: &str) -> Vec<&str> {
    if line.len() <= CHUNK_LIMIT {
        return vec![line];
    }
    let mut pieces = Vec::new();
    let mut rest = line;
    while rest.len() > CHUNK_LIMIT {
        let mut cut = CHUNK_LIMIT;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }
    pieces.push(rest);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(author: &str, content: &str) -> TranscriptLine {
        TranscriptLine {
            timestamp: "2024-05-01 12:00".to_string(),
            author: author.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn renders_in_order() {
        let chunks = chunk_transcript(&[line("alice", "hello"), line("bob", "hi")]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0],
            "[2024-05-01 12:00] alice: hello\n[2024-05-01 12:00] bob: hi"
        );
    }

    #[test]
    fn empty_transcript_yields_no_chunks() {
        assert!(chunk_transcript(&[]).is_empty());
    }

    #[test]
    fn splits_at_the_chunk_limit() {
        let lines: Vec<_> = (0..100).map(|i| line("alice", &"x".repeat(50 + i % 3))).collect();
        let chunks = chunk_transcript(&lines);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= CHUNK_LIMIT);
        }
        // Nothing lost: total rendered length survives chunking.
        let rendered: usize = lines.iter().map(|l| l.render().len()).sum();
        let chunked: usize = chunks.iter().map(|c| c.chars().filter(|c| *c != '\n').count()).sum();
        let newlines_in_lines: usize = 0;
        assert_eq!(chunked + newlines_in_lines, rendered);
    }

    #[test]
    fn splits_oversized_lines_on_char_boundaries() {
        let big = "é".repeat(2000);
        let chunks = chunk_transcript(&[line("alice", &big)]);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= CHUNK_LIMIT);
        }
        let joined: String = chunks.join("");
        assert!(joined.ends_with('é'));
    }
}
