use serde::{Deserialize, Serialize};

/// Typed event carried on a `0:`-prefixed line of the generation stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Human-readable progress label, never part of the transcript
    Status {
        content: String,
    },
    
    /// Content fragment for the in-flight assistant turn
    Text {
        content: String,
    },
    
    /// Terminal failure reported by the backend
    Error {
        content: String,
    },
}

impl StreamEvent {
    pub fn status(content: impl Into<String>) -> Self {
        Self::Status { content: content.into() }
    }
    
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }
    
    pub fn error(content: impl Into<String>) -> Self {
        Self::Error { content: content.into() }
    }
    
    pub fn content(&self) -> &str {
        match self {
            Self::Status { content } | Self::Text { content } | Self::Error { content } => content,
        }
    }
}

/// One decoded line, kept in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Event(StreamEvent),
    Literal(String),
}

/// Output of one decoder invocation
///
/// Segments preserve the order lines arrived in. `events()` and `raw_text()`
/// are projections over them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeResult {
    segments: Vec<Segment>,
}

impl DecodeResult {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn push_event(&mut self, event: StreamEvent) {
        self.segments.push(Segment::Event(event));
    }
    
    pub fn push_literal(&mut self, line: impl Into<String>) {
        self.segments.push(Segment::Literal(line.into()));
    }
    
    /// Append everything from `other`, keeping order
    pub fn extend(&mut self, other: DecodeResult) {
        self.segments.extend(other.segments);
    }
    
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
    
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
    
    pub fn events(&self) -> impl Iterator<Item = &StreamEvent> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Event(event) => Some(event),
            Segment::Literal(_) => None,
        })
    }
    
    /// Concatenation of every line that was not a recognized event
    pub fn raw_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Literal(line) => Some(line.as_str()),
                Segment::Event(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
    
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
