use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerbaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF parse error: {0}")]
    PdfParse(#[from] lopdf::Error),

    #[error("Encrypted PDF: {0}")]
    EncryptedPdf(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unknown correction index: {0}")]
    UnknownIndex(String),

    #[error("Unknown interest mode: {0}")]
    UnknownInterest(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[cfg(feature = "pdf")]
    #[error("PDF render error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VerbaError>;
