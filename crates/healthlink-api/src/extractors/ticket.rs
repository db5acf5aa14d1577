//! Query carrying an access ticket.

use serde::Deserialize;

/// `?ticket=...` on ticketed file and endpoint locations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketQuery {
    /// Access ticket from the manifest location.
    pub ticket: Option<String>,
}

impl TicketQuery {
    /// The ticket, treating an empty value as absent.
    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref().filter(|t| !t.is_empty())
    }
}
