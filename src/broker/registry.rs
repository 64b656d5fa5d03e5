//! Connection registry
//!
//! Two tables, senders and receivers, each mapping a connection id to the
//! endpoint address it registered with. Ids come from a single counter shared
//! by both roles: the first registration gets 1 and an id is never handed out
//! twice, even after the connection is removed.
//!
//! All operations share one lock. The snapshot accessors build their copy
//! while the lock is held and return an owned map, so callers can iterate
//! freely while registrations continue concurrently.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;

use crate::utils::BrokerError;

pub type ConnectionId = u64;

/// Point-in-time copy of one role table, ordered by id.
pub type Endpoints = BTreeMap<ConnectionId, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// May enqueue messages. Advisory only; the broker does not check it.
    Sender,
    /// Gets every message dispatched while it is registered.
    Receiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sender => "send",
            Role::Receiver => "receive",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BrokerError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "send" => Ok(Role::Sender),
            "receive" => Ok(Role::Receiver),
            other => Err(BrokerError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub address: String,
    pub role: Role,
}

#[derive(Debug, Default)]
struct Tables {
    last: ConnectionId,
    senders: Endpoints,
    receivers: Endpoints,
}

impl Tables {
    fn table_mut(&mut self, role: Role) -> &mut Endpoints {
        match role {
            Role::Sender => &mut self.senders,
            Role::Receiver => &mut self.receivers,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    tables: Mutex<Tables>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `address` under `role` and return its freshly allocated id.
    pub fn add_connection(&self, address: impl Into<String>, role: Role) -> ConnectionId {
        let mut tables = self.tables.lock();
        let id = tables.last + 1;
        tables.table_mut(role).insert(id, address.into());
        tables.last = id;
        id
    }

    /// Remove `id` from whichever table holds it.
    pub fn disconnect(&self, id: ConnectionId) -> Result<Connection, BrokerError> {
        let mut tables = self.tables.lock();
        for role in [Role::Sender, Role::Receiver] {
            if let Some(address) = tables.table_mut(role).remove(&id) {
                return Ok(Connection { id, address, role });
            }
        }
        Err(BrokerError::NotFound(id))
    }

    pub fn senders(&self) -> Endpoints {
        self.tables.lock().senders.clone()
    }

    pub fn receivers(&self) -> Endpoints {
        self.tables.lock().receivers.clone()
    }

    pub fn sender_count(&self) -> usize {
        self.tables.lock().senders.len()
    }

    pub fn receiver_count(&self) -> usize {
        self.tables.lock().receivers.len()
    }

    /// Look up a single connection by id.
    pub fn get(&self, id: ConnectionId) -> Option<Connection> {
        let tables = self.tables.lock();
        if let Some(address) = tables.senders.get(&id) {
            return Some(Connection {
                id,
                address: address.clone(),
                role: Role::Sender,
            });
        }
        tables.receivers.get(&id).map(|address| Connection {
            id,
            address: address.clone(),
            role: Role::Receiver,
        })
    }

    /// The most recently allocated id, 0 before the first registration.
    pub fn last_assigned(&self) -> ConnectionId {
        self.tables.lock().last
    }
}
