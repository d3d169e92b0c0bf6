//! Volatile ticket registry.
//!
//! Tickets live only in memory and start over on every restart. Attachments
//! and feedback are keyed by ticket id in durable storage and outlive them.

use docket_core::{Member, TicketId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Ticket lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// A tracked work item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id: u64,
    pub title: String,
    pub description: String,
    /// Free-form due date as entered by the client.
    pub deadline: Option<String>,
    pub assigned_to: Option<Member>,
    pub status: TicketStatus,
}

impl Ticket {
    /// Namespace key for this ticket's attachments and feedback.
    pub fn storage_id(&self) -> TicketId {
        TicketId::from(self.id)
    }
}

/// Fields of a ticket being created.
#[derive(Clone, Debug)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub deadline: Option<String>,
    pub assigned_to: Option<Member>,
}

struct Inner {
    tickets: Vec<Ticket>,
    next_id: u64,
}

/// In-memory ticket list with ids that are never reused within a process.
pub struct TicketRegistry {
    inner: RwLock<Inner>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tickets: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Add an open ticket and return it.
    pub async fn create(&self, new: NewTicket) -> Ticket {
        let mut inner = self.inner.write().await;
        let ticket = Ticket {
            id: inner.next_id,
            title: new.title,
            description: new.description,
            deadline: new.deadline,
            assigned_to: new.assigned_to,
            status: TicketStatus::Open,
        };
        inner.next_id += 1;
        inner.tickets.push(ticket.clone());
        ticket
    }

    /// All tickets in creation order.
    pub async fn list(&self) -> Vec<Ticket> {
        self.inner.read().await.tickets.clone()
    }

    pub async fn get(&self, id: u64) -> Option<Ticket> {
        self.inner
            .read()
            .await
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Mark a ticket closed. Closing twice is harmless.
    pub async fn close(&self, id: u64) -> Option<Ticket> {
        let mut inner = self.inner.write().await;
        let ticket = inner.tickets.iter_mut().find(|t| t.id == id)?;
        ticket.status = TicketStatus::Closed;
        Some(ticket.clone())
    }

    pub async fn remove(&self, id: u64) -> Option<Ticket> {
        let mut inner = self.inner.write().await;
        let index = inner.tickets.iter().position(|t| t.id == id)?;
        Some(inner.tickets.remove(index))
    }
}

impl Default for TicketRegistry {
    fn default() -> Self {
        Self::new()
    }
}
