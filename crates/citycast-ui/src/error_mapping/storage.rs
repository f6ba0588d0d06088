use citycast_core::AppError;
use citycast_services::KvBackendError;

pub fn storage_error(e: KvBackendError) -> AppError {
    match e {
        KvBackendError::Storage(e) => AppError::Storage(e),
        KvBackendError::Other(e) => AppError::Other(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failure_message() {
        let err = storage_error(KvBackendError::storage("disk I/O error"));
        assert_eq!(err.user_message(), "Your city list could not be saved.");
    }
}
