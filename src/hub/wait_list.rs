use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::error::HubError;
use crate::hub::ClientId;

/// Configuration two players must share to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSetting {
    pub duration: Duration,
}

pub fn wait_list_key(setting: &GameSetting) -> String {
    format!("<{}>", setting.duration.as_secs())
}

/// FIFO queues of waiting clients, one per setting key.
#[derive(Debug, Default)]
pub struct WaitList {
    queues: HashMap<String, VecDeque<ClientId>>,
}

impl WaitList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: String, id: ClientId) -> Result<(), HubError> {
        if self.contains(id) {
            return Err(HubError::AlreadyWaiting);
        }
        self.queues.entry(key).or_default().push_back(id);
        Ok(())
    }

    /// Oldest client waiting under `key`.
    pub fn pop(&mut self, key: &str) -> Option<ClientId> {
        let queue = self.queues.get_mut(key)?;
        let id = queue.pop_front();
        if queue.is_empty() {
            self.queues.remove(key);
        }
        id
    }

    pub fn remove(&mut self, id: ClientId) -> Result<(), HubError> {
        let key = self
            .queues
            .iter()
            .find(|(_, queue)| queue.contains(&id))
            .map(|(key, _)| key.clone())
            .ok_or(HubError::PlayerNotFound)?;

        if let Some(queue) = self.queues.get_mut(&key) {
            queue.retain(|waiting| *waiting != id);
            if queue.is_empty() {
                self.queues.remove(&key);
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.queues.values().any(|queue| queue.contains(&id))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
