use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("quote url must not be empty")]
    EmptyUrl,
}
