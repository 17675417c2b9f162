//! Alert text composition.
//!
//! Message bodies may come from a remote text-generation service, but every
//! path degrades to a deterministic local template: generation failure can
//! never block or fail a dispatch.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::sensors::LocationSample;

/// Tip shown when generation is unavailable.
pub const FALLBACK_SAFETY_TIP: &str = "Stay aware of your surroundings.";

#[async_trait]
pub trait Composer: Send + Sync {
    /// Compose the emergency alert body. Must not fail; implementations
    /// fall back to [`fallback_alert`] on any error.
    async fn compose_alert(
        &self,
        custom_message: &str,
        location: Option<&LocationSample>,
        battery: f64,
    ) -> String;

    async fn compose_safety_tip(&self) -> String;
}

/// Deterministic template embedding the custom note, last location, and
/// battery level.
pub fn fallback_alert(
    custom_message: &str,
    location: Option<&LocationSample>,
    battery: f64,
) -> String {
    let coordinates = match location {
        Some(l) => format!("{:.5}, {:.5}", l.latitude, l.longitude),
        None => "Unknown".to_string(),
    };
    format!(
        "EMERGENCY: User check-in missed. {custom_message}. Location: {coordinates}. Battery: {}%.",
        (battery * 100.0).round() as u32
    )
}

/// Offline composer: always the deterministic templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackComposer;

#[async_trait]
impl Composer for FallbackComposer {
    async fn compose_alert(
        &self,
        custom_message: &str,
        location: Option<&LocationSample>,
        battery: f64,
    ) -> String {
        fallback_alert(custom_message, location, battery)
    }

    async fn compose_safety_tip(&self) -> String {
        FALLBACK_SAFETY_TIP.to_string()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

/// Remote generation client. Any transport, status, or decoding error falls
/// back to the local template.
pub struct HttpComposer {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpComposer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(8),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&GenerateRequest { prompt })
            .send()
            .await?
            .error_for_status()?;
        let body: GenerateResponse = response.json().await?;
        Ok(body.text)
    }
}

#[async_trait]
impl Composer for HttpComposer {
    async fn compose_alert(
        &self,
        custom_message: &str,
        location: Option<&LocationSample>,
        battery: f64,
    ) -> String {
        let coordinates = match location {
            Some(l) => format!(
                "Latitude: {}, Longitude: {} (Accuracy: {}m)",
                l.latitude, l.longitude, l.accuracy
            ),
            None => "Location unavailable".to_string(),
        };
        let prompt = format!(
            "Create a concise, urgent emergency SMS message (max 160 characters if \
             possible, but prioritize clarity).\n\
             Context:\n\
             - The user failed to check in to their safety app.\n\
             - User's custom note: \"{custom_message}\"\n\
             - Current coordinates: {coordinates}\n\
             - Battery level: {}%\n\
             The message should be written in first person (\"I am...\"). It is being \
             sent to police and emergency contacts.",
            (battery * 100.0).round() as u32
        );
        match self.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            _ => fallback_alert(custom_message, location, battery),
        }
    }

    async fn compose_safety_tip(&self) -> String {
        let prompt = "Give me 3 short, bulleted general personal safety tips for \
                      walking alone at night. Keep it under 50 words.";
        match self.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            _ => FALLBACK_SAFETY_TIP.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_location() -> LocationSample {
        LocationSample {
            latitude: 51.50123,
            longitude: -0.14189,
            accuracy: 12.0,
            sampled_at_ms: 0,
        }
    }

    #[test]
    fn fallback_embeds_message_location_battery() {
        let text = fallback_alert("Call my sister", Some(&sample_location()), 0.63);
        assert!(text.contains("Call my sister"));
        assert!(text.contains("51.50123, -0.14189"));
        assert!(text.contains("63%"));
    }

    #[test]
    fn fallback_without_location() {
        let text = fallback_alert("Note", None, 1.0);
        assert!(text.contains("Location: Unknown"));
        assert!(text.contains("100%"));
    }

    #[tokio::test]
    async fn remote_text_used_when_available() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/compose")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text":"I need help at the park."}"#)
            .create_async()
            .await;

        let composer = HttpComposer::new(format!("{}/compose", server.url()));
        let text = composer
            .compose_alert("Note", Some(&sample_location()), 0.5)
            .await;
        assert_eq!(text, "I need help at the park.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/compose")
            .with_status(500)
            .create_async()
            .await;

        let composer = HttpComposer::new(format!("{}/compose", server.url()));
        let text = composer.compose_alert("Note", None, 0.5).await;
        assert!(text.starts_with("EMERGENCY:"));
        assert!(text.contains("Note"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_for_tips() {
        let composer = HttpComposer::new("http://127.0.0.1:9/compose");
        let tip = composer.compose_safety_tip().await;
        assert_eq!(tip, FALLBACK_SAFETY_TIP);
    }
}
