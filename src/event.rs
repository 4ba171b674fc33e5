//! Terminal input and refresh ticks for the live view, merged into one stream.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::time::{Instant, Interval, MissedTickBehavior};

#[derive(Clone, Debug)]
pub enum Event {
    /// A key press. Releases and repeats are dropped.
    Key(KeyEvent),
    Tick,
    Resize,
}

pub struct EventHandler {
    reader: EventStream,
    ticks: Interval,
}

impl EventHandler {
    /// The first tick arrives one `tick_rate` from now; the view already
    /// holds fresh data when it is built.
    pub fn new(tick_rate: Duration) -> Self {
        let mut ticks = tokio::time::interval_at(Instant::now() + tick_rate, tick_rate);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            reader: EventStream::new(),
            ticks,
        }
    }

    /// Next event worth handling. `None` once the terminal stream ends or fails.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                maybe_event = self.reader.next() => match maybe_event? {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        return Some(Event::Key(key));
                    }
                    Ok(CrosstermEvent::Resize(_, _)) => return Some(Event::Resize),
                    Ok(_) => continue,
                    Err(_) => return None,
                },
                _ = self.ticks.tick() => return Some(Event::Tick),
            }
        }
    }
}
