use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,
}

impl Event {
    /// Convert crossterm events; focus and paste events are not used
    pub fn from_crossterm(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key_event) => Some(Event::Key(key_event)),
            CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            CrosstermEvent::FocusGained | CrosstermEvent::FocusLost | CrosstermEvent::Paste(_) => None,
        }
    }
}

/// Event source polling the terminal
pub struct EventHandler {
    /// Tick interval for periodic events
    tick_interval: Duration,
}

impl EventHandler {
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }

    /// Wait for the next terminal event, or a tick when none arrives in time
    pub async fn next(&mut self) -> Result<Event> {
        let tick = self.tick_interval;
        let polled = tokio::task::spawn_blocking(move || -> std::io::Result<Option<CrosstermEvent>> {
            if crossterm::event::poll(tick)? {
                crossterm::event::read().map(Some)
            } else {
                Ok(None)
            }
        })
        .await??;

        Ok(polled.and_then(Event::from_crossterm).unwrap_or(Event::Tick))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
