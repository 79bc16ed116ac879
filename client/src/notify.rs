use log::error;

/// The two user/developer channels the failure path writes to.
pub trait Notifier: Send + Sync {
    /// Blocking, user-facing message.
    fn alert(&self, message: &str);

    /// Developer-facing diagnostic.
    fn console_error(&self, detail: &str) {
        error!(target: "health_form::console", "{}", detail);
    }
}

/// Alerts go to the log as well; nothing blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        error!(target: "health_form::alert", "{}", message);
    }
}
