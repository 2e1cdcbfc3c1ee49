use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification target url is empty")]
    EmptyUrl,

    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("notification endpoint answered {status}: {body}")]
    Rejected { status: u16, body: String },
}
