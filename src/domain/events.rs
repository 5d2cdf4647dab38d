use crate::domain::chart::ScreenPoint;
use crate::domain::market_data::{Bar, BarSummary};
use std::collections::VecDeque;
use std::fmt::Debug;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> u64 {
        use crate::domain::logging::get_time_provider;
        get_time_provider().current_timestamp()
    }
}

/// Signals the chart sends to its host
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// Pointer entered a new bar. `screen_pos` is the global pointer position.
    BarHovered {
        index: usize,
        bar: Bar,
        summary: BarSummary,
        screen_pos: ScreenPoint,
    },
    /// Hide the tooltip
    HoverLeft,
    /// The window moved or resized. A scrollbar should adopt range
    /// `[0, max_start_bar]`, page step `visible_bars` and value `start_bar`.
    ViewChanged {
        start_bar: usize,
        visible_bars: usize,
        max_start_bar: usize,
    },
}

impl DomainEvent for ChartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChartEvent::BarHovered { .. } => "BarHovered",
            ChartEvent::HoverLeft => "HoverLeft",
            ChartEvent::ViewChanged { .. } => "ViewChanged",
        }
    }
}

/// Outbound events collected during input handling, drained by the host
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    pending: VecDeque<ChartEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ChartEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<ChartEvent> {
        self.pending.drain(..).collect()
    }
}

/// Event dispatcher for publishing events
pub trait EventDispatcher {
    fn publish_chart_event(&self, event: &ChartEvent);
}

/// Simple in-memory event dispatcher
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    chart_handlers: Vec<Box<dyn Fn(&ChartEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_to_chart_events<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.chart_handlers.push(Box::new(handler));
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_chart_event(&self, event: &ChartEvent) {
        for handler in &self.chart_handlers {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatcher_reaches_every_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = InMemoryEventDispatcher::new();
        for _ in 0..2 {
            let seen = Rc::clone(&seen);
            dispatcher.subscribe_to_chart_events(move |e| seen.borrow_mut().push(e.event_type()));
        }
        dispatcher.publish_chart_event(&ChartEvent::HoverLeft);
        assert_eq!(*seen.borrow(), vec!["HoverLeft", "HoverLeft"]);
    }

    #[test]
    fn queue_drains_in_order() {
        let mut queue = EventQueue::new();
        queue.push(ChartEvent::HoverLeft);
        queue.push(ChartEvent::ViewChanged { start_bar: 1, visible_bars: 10, max_start_bar: 5 });
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].event_type(), "ViewChanged");
        assert!(queue.is_empty());
    }
}
