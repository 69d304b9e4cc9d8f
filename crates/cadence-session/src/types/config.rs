#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the command channel between handles and the controller
    pub command_buffer: usize,
    /// Status label shown after the user stops a response
    pub stopped_label: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_buffer: 32,
            stopped_label: "stopped".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command_buffer(mut self, size: usize) -> Self {
        self.command_buffer = size.max(1);
        self
    }

    pub fn with_stopped_label(mut self, label: impl Into<String>) -> Self {
        self.stopped_label = label.into();
        self
    }
}
