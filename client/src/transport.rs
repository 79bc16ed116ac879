use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use crate::error::FormError;
use crate::payload::{HealthInput, HealthPrediction};

pub const PREDICT_PATH: &str = "/predict";

/// Sends one submission to the prediction endpoint.
#[async_trait]
pub trait PredictTransport: Send + Sync {
    async fn predict(&self, input: &HealthInput) -> Result<HealthPrediction, FormError>;
}

/// `POST <base>/predict` over HTTP. Status codes are not inspected: the body
/// is decoded as JSON whatever the status.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, FormError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, FormError> {
        let base = Url::parse(base_url).map_err(|e| FormError::Endpoint(format!("{}: {}", base_url, e)))?;
        let endpoint = base
            .join(PREDICT_PATH)
            .map_err(|e| FormError::Endpoint(format!("{}: {}", base_url, e)))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PredictTransport for HttpTransport {
    async fn predict(&self, input: &HealthInput) -> Result<HealthPrediction, FormError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(input)
            .send()
            .await?;

        debug!("{} answered {}", self.endpoint, response.status());
        let bytes = response.bytes().await?;
        HealthPrediction::from_body(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_rooted_at_predict() {
        let t = HttpTransport::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(t.endpoint().as_str(), "http://127.0.0.1:8080/predict");

        let t = HttpTransport::new("http://health.example/app/").unwrap();
        assert_eq!(t.endpoint().as_str(), "http://health.example/predict");
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(FormError::Endpoint(_))
        ));
    }
}
