use std::fmt;

/// Progress of a single archive job, in the order the pipeline emits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    CopyStarted,
    CopyFinished,
    CompressStarted,
    CompressFinished { archive_name: String },
    UploadStarted,
    UploadFinished { archive_name: String, bucket: String },
    Failed { message: String },
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::CopyStarted => write!(f, "copy starting"),
            StatusEvent::CopyFinished => write!(f, "copy complete"),
            StatusEvent::CompressStarted => write!(f, "compress starting"),
            StatusEvent::CompressFinished { archive_name } => {
                write!(f, "compress complete ({})", archive_name)
            }
            StatusEvent::UploadStarted => write!(f, "upload starting"),
            StatusEvent::UploadFinished { archive_name, bucket } => {
                write!(f, "upload complete: {} uploaded to {}", archive_name, bucket)
            }
            StatusEvent::Failed { message } => write!(f, "error: {}", message),
        }
    }
}

/// Receiver of status events.
///
/// The pipeline may call a sink from a worker thread, so implementations
/// must be thread-safe and must not touch presentation state directly.
pub trait StatusSink: Send + Sync {
    fn emit(&self, event: StatusEvent);
}

impl<F> StatusSink for F
where
    F: Fn(StatusEvent) + Send + Sync,
{
    fn emit(&self, event: StatusEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_status_messages() {
        assert_eq!(StatusEvent::CopyStarted.to_string(), "copy starting");
        assert_eq!(StatusEvent::CopyFinished.to_string(), "copy complete");
        assert_eq!(StatusEvent::CompressStarted.to_string(), "compress starting");
        assert_eq!(
            StatusEvent::CompressFinished { archive_name: "2024.zip".to_string() }.to_string(),
            "compress complete (2024.zip)"
        );
        assert_eq!(StatusEvent::UploadStarted.to_string(), "upload starting");
        assert_eq!(
            StatusEvent::UploadFinished {
                archive_name: "2024.zip".to_string(),
                bucket: "my-bucket".to_string(),
            }
            .to_string(),
            "upload complete: 2024.zip uploaded to my-bucket"
        );
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: StatusEvent| seen.lock().unwrap().push(event.to_string());

        sink.emit(StatusEvent::CopyStarted);
        sink.emit(StatusEvent::CopyFinished);

        assert_eq!(*seen.lock().unwrap(), vec!["copy starting", "copy complete"]);
    }
}
