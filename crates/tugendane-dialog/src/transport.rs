//! Outbound channel abstraction.
//!
//! The engine and scheduler hand finished messages to a [`Transport`]; the
//! concrete implementation talks to the SMS/voice gateway. [`MemoryTransport`]
//! records traffic for tests.

use std::sync::Mutex;

use async_trait::async_trait;

/// Errors from the outbound gateway.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send message: {0}")]
    Send(String),
    #[error("Failed to bridge call: {0}")]
    Dial(String),
}

/// Outbound side of a messaging channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a text message to an address.
    async fn send(&self, to: &str, text: &str) -> Result<(), TransportError>;

    /// Bridge the caller to a service phone number.
    async fn dial(&self, caller: &str, service_phone: &str) -> Result<(), TransportError>;
}

/// In-memory transport that records everything it is asked to deliver.
#[derive(Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<(String, String)>>,
    dials: Mutex<Vec<(String, String)>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(to, text)` pairs sent so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// All `(caller, service_phone)` bridges requested so far.
    pub fn dials(&self) -> Vec<(String, String)> {
        self.dials.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, to: &str, text: &str) -> Result<(), TransportError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| TransportError::Send(e.to_string()))?;
        sent.push((to.to_string(), text.to_string()));
        Ok(())
    }

    async fn dial(&self, caller: &str, service_phone: &str) -> Result<(), TransportError> {
        let mut dials = self
            .dials
            .lock()
            .map_err(|e| TransportError::Dial(e.to_string()))?;
        dials.push((caller.to_string(), service_phone.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_transport_records_traffic() {
        let transport = MemoryTransport::new();
        transport.send("+250788000001", "hello").await.unwrap();
        transport.dial("+250788000001", "+250788999999").await.unwrap();

        assert_eq!(
            transport.sent(),
            vec![("+250788000001".to_string(), "hello".to_string())]
        );
        assert_eq!(transport.dials().len(), 1);
    }
}
