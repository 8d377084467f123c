//! Client directory collaborator.
//!
//! The record-keeping service that owns clients lives outside this crate;
//! adapters only need to look a client up by id.

use async_trait::async_trait;
use msp_core::ClientRecord;
use std::collections::HashMap;

use crate::error::Result;

/// Lookup of client records by internal id.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Fetch a client. `Ok(None)` when the id is unknown.
    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>>;
}

/// Directory backed by a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientDirectory {
    clients: HashMap<String, ClientRecord>,
}

impl InMemoryClientDirectory {
    pub fn new(clients: impl IntoIterator<Item = ClientRecord>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|client| (client.id.clone(), client))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientDirectory for InMemoryClientDirectory {
    async fn get_client(&self, client_id: &str) -> Result<Option<ClientRecord>> {
        Ok(self.clients.get(client_id.trim()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn looks_up_by_id() {
        let directory = InMemoryClientDirectory::new([
            ClientRecord::new("1", "Acme"),
            ClientRecord::new("2", "Globex"),
        ]);
        assert_eq!(directory.len(), 2);
        let client = directory.get_client("2").await.unwrap().unwrap();
        assert_eq!(client.name, "Globex");
        assert!(directory.get_client("3").await.unwrap().is_none());
    }
}
