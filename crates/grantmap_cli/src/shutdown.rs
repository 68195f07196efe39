use std::future::Future;

use console::Term;

/// Exit status after Ctrl+C.
pub(crate) const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The run was cancelled with Ctrl+C before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted")]
pub(crate) struct Interrupted;

/// Run `operation` until it completes or Ctrl+C arrives, whichever is first.
///
/// On interruption the operation is dropped with whatever it had gathered.
pub(crate) async fn until_interrupted<F: Future>(
    what: &str,
    operation: F,
) -> Result<F::Output, Interrupted> {
    tokio::select! {
        output = operation => Ok(output),
        Ok(()) = tokio::signal::ctrl_c() => {
            if Term::stdout().is_term() {
                eprintln!("\n\nInterrupted, {what} cancelled. Nothing was saved.");
            } else {
                tracing::warn!("Interrupted, {} cancelled", what);
            }
            Err(Interrupted)
        }
    }
}
