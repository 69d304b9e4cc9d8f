use cadence_types::{DecodeResult, Segment, StreamEvent, Transcript};

/// What one [`MessageAccumulator::apply`] call observed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatorUpdate {
    /// The in-flight turn now holds a new running total
    pub content_changed: bool,
    /// Latest status label seen in this result
    pub status: Option<String>,
    /// First error event seen in this result
    pub error: Option<String>,
}

/// Folds decoded segments into the in-flight assistant turn
///
/// The accumulator owns the running total for the current turn and writes
/// the whole total into the transcript on every change, so the transcript
/// never depends on how the wire split the fragments.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    running: String,
    literal_tail: bool,
    latest_status: Option<String>,
    error: Option<String>,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn apply(&mut self, transcript: &mut Transcript, result: DecodeResult) -> AccumulatorUpdate {
        let mut update = AccumulatorUpdate::default();
        if self.error.is_some() {
            return update;
        }
        
        let before = self.running.len();
        
        for segment in result.into_segments() {
            match segment {
                Segment::Event(StreamEvent::Text { content }) => {
                    self.running.push_str(&content);
                    self.literal_tail = false;
                }
                Segment::Literal(line) => {
                    if self.literal_tail {
                        self.running.push('\n');
                    }
                    self.running.push_str(&line);
                    self.literal_tail = true;
                }
                Segment::Event(StreamEvent::Status { content }) => {
                    self.latest_status = Some(content.clone());
                    update.status = Some(content);
                }
                Segment::Event(StreamEvent::Error { content }) => {
                    self.error = Some(content.clone());
                    update.error = Some(content);
                    break;
                }
            }
        }
        
        // Running total only grows, so a length change is a content change
        if self.running.len() != before && !self.running.is_empty() {
            transcript.set_in_flight_content(&self.running);
            update.content_changed = true;
        }
        
        update
    }
    
    pub fn running_total(&self) -> &str {
        &self.running
    }
    
    pub fn latest_status(&self) -> Option<&str> {
        self.latest_status.as_deref()
    }
    
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    
    /// Start over for a new assistant turn
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
