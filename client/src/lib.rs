//! Health risk form: reads eight metrics from a form view, posts them to a
//! `/predict` endpoint and renders the four returned risk labels.

pub mod error;
pub mod handler;
pub mod notify;
pub mod payload;
pub mod terminal;
pub mod transport;
pub mod view;

pub use error::FormError;
pub use handler::{FormPage, SubmitOutcome, UiEvent, CONNECTION_ERROR};
pub use notify::{LogNotifier, Notifier};
pub use payload::{HealthInput, HealthPrediction};
pub use transport::{HttpTransport, PredictTransport};
pub use view::{ElementId, ViewState};
