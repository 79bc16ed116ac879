use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::notify::Notifier;
use crate::transport::PredictTransport;
use crate::view::{ElementId, ViewState};

pub const CONNECTION_ERROR: &str = "Error connecting to server. Check console for details.";

/// Events the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Submit on `healthForm`.
    Submit,
    /// Click on `resetBtn`.
    Reset,
}

impl UiEvent {
    pub fn target(&self) -> ElementId {
        match self {
            UiEvent::Submit => ElementId::HealthForm,
            UiEvent::Reset => ElementId::ResetBtn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rendered,
    Failed,
}

/// The form page with its submit and reset handlers bound.
///
/// The view lock is never held across the request, so a reset or another
/// submission may run while a request is in flight. Nothing orders
/// overlapping submissions: the last response to arrive renders last.
#[derive(Clone)]
pub struct FormPage {
    view: Arc<Mutex<ViewState>>,
    transport: Arc<dyn PredictTransport>,
    notifier: Arc<dyn Notifier>,
}

impl FormPage {
    pub fn bind(
        view: ViewState,
        transport: Arc<dyn PredictTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        debug!(
            "Handlers bound: submit on {}, click on {}",
            UiEvent::Submit.target(),
            UiEvent::Reset.target()
        );
        Self {
            view: Arc::new(Mutex::new(view)),
            transport,
            notifier,
        }
    }

    pub fn view(&self) -> Arc<Mutex<ViewState>> {
        self.view.clone()
    }

    pub async fn snapshot(&self) -> ViewState {
        self.view.lock().await.clone()
    }

    pub async fn dispatch(&self, event: UiEvent) -> Option<SubmitOutcome> {
        match event {
            UiEvent::Submit => Some(self.submit().await),
            UiEvent::Reset => {
                self.reset().await;
                None
            }
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let input = {
            let mut view = self.view.lock().await;
            let input = view.form.read();
            view.show_loading();
            input
        };

        match self.transport.predict(&input).await {
            Ok(prediction) => {
                self.view.lock().await.render_prediction(&prediction);
                info!("Prediction rendered");
                SubmitOutcome::Rendered
            }
            Err(e) => {
                self.notifier.alert(CONNECTION_ERROR);
                self.notifier.console_error(&e.to_string());
                self.view.lock().await.render_failure();
                SubmitOutcome::Failed
            }
        }
    }

    pub async fn reset(&self) {
        self.view.lock().await.reset();
    }
}
