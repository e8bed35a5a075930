//! The single call-to-action bar shared by all screens.
//!
//! Control states: hidden, visible-idle, visible-loading, disabled. Loading swaps the displayed
//! content for a spinner and label; the previous content is kept untouched underneath and comes
//! back as-is on [`BottomBar::hide_loading`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::view::Icon;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BarError {
    #[error("bottom bar content cannot be empty")]
    EmptyContent,
    #[error("bottom bar is already loading")]
    AlreadyLoading,
    #[error("bottom bar is not loading")]
    NotLoading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BarItem {
    Text(String),
    Icon(Icon),
}

impl BarItem {
    pub fn text(label: impl Into<String>) -> Self {
        Self::Text(label.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarState {
    Hidden,
    Idle,
    Loading,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomBarView {
    pub state: BarState,
    pub items: Vec<BarItem>,
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BottomBar<A> {
    visible: bool,
    disabled: bool,
    content: Vec<BarItem>,
    loading: Option<String>,
    handler: Option<A>,
}

impl<A> Default for BottomBar<A> {
    fn default() -> Self {
        Self {
            visible: false,
            disabled: false,
            content: Vec::new(),
            loading: None,
            handler: None,
        }
    }
}

impl<A> BottomBar<A> {
    /// Replaces the content and makes the bar visible. Cancels any loading state.
    pub fn show(&mut self, items: Vec<BarItem>) -> Result<(), BarError> {
        if items.is_empty() {
            return Err(BarError::EmptyContent);
        }
        self.content = items;
        self.loading = None;
        self.visible = true;
        Ok(())
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn close(&mut self, reset: bool) {
        self.visible = false;
        if reset {
            self.disabled = false;
            self.handler = None;
            self.loading = None;
        }
    }

    pub fn set_click_handler(&mut self, action: A) {
        self.handler = Some(action);
    }

    pub fn clear_click_handler(&mut self) {
        self.handler = None;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn show_loading(&mut self, label: impl Into<String>) -> Result<(), BarError> {
        if self.loading.is_some() {
            return Err(BarError::AlreadyLoading);
        }
        self.loading = Some(label.into());
        self.visible = true;
        Ok(())
    }

    pub fn hide_loading(&mut self) -> Result<(), BarError> {
        self.loading.take().map(|_| ()).ok_or(BarError::NotLoading)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    #[must_use]
    pub fn handler(&self) -> Option<&A> {
        self.handler.as_ref()
    }

    /// What the bar displays right now.
    #[must_use]
    pub fn items(&self) -> Vec<BarItem> {
        match &self.loading {
            Some(label) => vec![BarItem::Icon(Icon::LoadHeart), BarItem::Text(label.clone())],
            None => self.content.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> BarState {
        if !self.visible {
            BarState::Hidden
        } else if self.loading.is_some() {
            BarState::Loading
        } else if self.disabled {
            BarState::Disabled
        } else {
            BarState::Idle
        }
    }

    /// The installed action, if a tap would fire it.
    #[must_use]
    pub fn click(&self) -> Option<&A> {
        match self.state() {
            BarState::Idle => self.handler.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn view(&self) -> BottomBarView {
        let state = self.state();
        BottomBarView {
            state,
            items: if state == BarState::Hidden {
                Vec::new()
            } else {
                self.items()
            },
            clickable: self.click().is_some(),
        }
    }
}
