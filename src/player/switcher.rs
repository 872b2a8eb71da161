//! Video source switcher
//!
//! Tracks which of an episode's alternative servers feeds the player.

use thiserror::Error;

use crate::models::{EpisodeRef, Server};

/// Message shown when an episode has no playable source
pub const SOURCE_NOT_FOUND: &str = "Video source not found for this episode.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error("Server index {index} out of range ({len} available)")]
    OutOfRange { index: usize, len: usize },

    #[error("No server named {0:?}")]
    UnknownServer(String),
}

/// What the player area should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerView<'a> {
    Embed {
        active: &'a Server,
        active_index: usize,
        servers: &'a [Server],
        /// The selector only makes sense with more than one server
        show_selector: bool,
    },
    NotFound,
}

/// Active server selection for one episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSwitcher {
    servers: Vec<Server>,
    active: Option<usize>,
}

impl SourceSwitcher {
    /// Start on the server whose embed matches `initial`, else the first one
    pub fn new(episode: &EpisodeRef, initial: Option<&str>) -> Self {
        let servers = episode.servers.clone();
        let active = initial
            .and_then(|url| servers.iter().position(|s| s.url == url))
            .or(if servers.is_empty() { None } else { Some(0) });
        Self { servers, active }
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn active(&self) -> Option<&Server> {
        self.active.and_then(|i| self.servers.get(i))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Switch to the server at `index`; out of range leaves the selection unchanged
    pub fn select(&mut self, index: usize) -> Result<&Server, SwitchError> {
        if index >= self.servers.len() {
            return Err(SwitchError::OutOfRange {
                index,
                len: self.servers.len(),
            });
        }
        self.active = Some(index);
        Ok(&self.servers[index])
    }

    /// Switch by server label (case-insensitive)
    pub fn select_by_name(&mut self, name: &str) -> Result<&Server, SwitchError> {
        let index = self
            .servers
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| SwitchError::UnknownServer(name.to_string()))?;
        self.select(index)
    }

    pub fn view(&self) -> PlayerView<'_> {
        match self.active.and_then(|i| self.servers.get(i).map(|s| (i, s))) {
            Some((active_index, active)) => PlayerView::Embed {
                active,
                active_index,
                servers: &self.servers,
                show_selector: self.servers.len() > 1,
            },
            None => PlayerView::NotFound,
        }
    }
}
