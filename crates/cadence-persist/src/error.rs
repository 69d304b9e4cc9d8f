use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    
    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },
    
    #[error("Chat not found: {0}")]
    ChatNotFound(String),
    
    #[error("Invalid store response: {0}")]
    Decode(String),
    
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
