use thiserror::Error;

/// Failures that stop a scan. A single page failing to load is not one of
/// these; the crawler logs it and moves on.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("could not build or send HTTP request: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("bad keyword: {0}")]
    InvalidKeyword(String),

    #[error("could not read keyword file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("crawl worker panicked: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicked_task_becomes_join_error() {
        async fn run_worker() -> Result<()> {
            tokio::spawn(async {
                if true {
                    panic!("worker blew up");
                }
            })
            .await?;
            Ok(())
        }

        let err = run_worker().await.unwrap_err();
        assert!(matches!(err, ScanError::JoinError(_)));
        assert!(err.to_string().starts_with("crawl worker panicked"));
    }
}
