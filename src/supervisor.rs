//! Process supervision
//!
//! Last-resort handlers around the service entry point: a panic hook that
//! logs and exits, and `supervise`, which turns a failed serve future into a
//! failing exit code once the listener has stopped.

use std::fmt::Display;
use std::future::Future;
use std::process::ExitCode;

/// How the supervised service ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Graceful,
    Failed,
}

impl Termination {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Termination::Graceful => ExitCode::SUCCESS,
            Termination::Failed => ExitCode::FAILURE,
        }
    }
}

/// Exit the process on any panic that escapes request handling.
///
/// The previous hook still runs first so the panic message and backtrace
/// are printed as usual.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("Error {}", info);
        tracing::error!("Shutting down the server for handling uncaught exceptions");
        previous(info);
        std::process::exit(1);
    }));
}

/// Run the service future and report how it ended
pub async fn supervise<F, E>(service: F) -> Termination
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match service.await {
        Ok(()) => Termination::Graceful,
        Err(e) => {
            tracing::error!("Error {}", e);
            tracing::error!("Shutting down the server for handling uncaught promise rejection");
            Termination::Failed
        }
    }
}
