//! Error types for the name parsing modules.

/// Raised by the low-level enclosure partition when no balanced region exists.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnclosureError {
    #[error("No enclosed text found in {text:?}")]
    NotFound { text: String },
}

/// Structural failures while splitting an artist credit list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtistListError {
    /// Bracket balance could not be resolved; carries the tokens seen so far.
    #[error("Unexpected str list format for {text:?} - processed={processed:?} processing={processing:?}")]
    UnexpectedListFormat {
        text: String,
        processed: Vec<String>,
        processing: Vec<String>,
    },
    /// An unbalanced unzipped list ran out of counterparts.
    #[error("Unexpected end of unbalanced unzipped list for {text:?}")]
    UnexpectedListLength { text: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("Invalid number word={word:?}")]
    InvalidWord { word: String },
}
