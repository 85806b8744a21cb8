use thiserror::Error;

/// Hard failures while reading a COLLADA document.
///
/// Missing or partial data is never reported here; those cases surface as
/// `None` or as shorter buffers on the parsed model.
#[derive(Error, Debug)]
pub enum DaeError {
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Root element is <{0}>, expected <COLLADA>")]
    UnexpectedRoot(String),

    #[error("Invalid float token {token:?} in <{element}>")]
    InvalidFloat { token: String, element: String },

    #[error("Invalid integer token {token:?} in <{element}>")]
    InvalidInteger { token: String, element: String },

    #[error("Invalid {attribute} attribute {value:?} on <{element}>")]
    InvalidAttribute {
        attribute: String,
        value: String,
        element: String,
    },

    #[error("Negative count {value} in <{element}>")]
    NegativeCount { element: String, value: i32 },
}
