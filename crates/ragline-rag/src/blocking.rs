use std::future::Future;

use crate::error::RagError;

/// Drive `future` to completion on a private current-thread runtime.
///
/// Refuses to run inside an existing Tokio runtime, where blocking the
/// worker thread would stall every other task on it.
pub(crate) fn block_on<T>(
    future: impl Future<Output = Result<T, RagError>>,
) -> Result<T, RagError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(RagError::Runtime(std::io::Error::other(
            "blocking call made from within an async runtime; await the async variant instead",
        )));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RagError::Runtime)?;
    runtime.block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_future_to_completion() {
        let value = block_on(async { Ok::<_, RagError>(42) }).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn propagates_future_error() {
        let err = block_on(async { Err::<(), _>(RagError::NotFound("x".into())) }).unwrap_err();
        assert!(matches!(err, RagError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_nested_runtime() {
        let err = block_on(async { Ok::<_, RagError>(()) }).unwrap_err();
        assert!(matches!(err, RagError::Runtime(_)));
    }
}
