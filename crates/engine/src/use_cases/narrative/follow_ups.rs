//! Delayed follow-up queue keyed by target day.

use std::collections::BTreeMap;

use lastlight_domain::{EventId, GameDay, ScheduledEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowUpQueue {
    by_day: BTreeMap<GameDay, Vec<EventId>>,
}

impl FollowUpQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, event_id: EventId, target_day: GameDay) {
        self.by_day.entry(target_day).or_default().push(event_id);
    }

    /// Remove every entry due on or before `day`, best `rank` first.
    pub fn take_due<K: Ord>(
        &mut self,
        day: GameDay,
        rank: impl Fn(&EventId) -> K,
    ) -> Vec<ScheduledEvent> {
        let later = self.by_day.split_off(&day.saturating_add(1));
        let due_map = std::mem::replace(&mut self.by_day, later);

        let mut due: Vec<ScheduledEvent> = due_map
            .into_iter()
            .flat_map(|(target_day, ids)| {
                ids.into_iter()
                    .map(move |event_id| ScheduledEvent { event_id, target_day })
            })
            .collect();
        // Stable: ties keep target-day then scheduling order.
        due.sort_by_key(|entry| rank(&entry.event_id));
        due
    }

    pub fn entries(&self) -> Vec<ScheduledEvent> {
        self.by_day
            .iter()
            .flat_map(|(day, ids)| {
                ids.iter().map(move |id| ScheduledEvent {
                    event_id: id.clone(),
                    target_day: *day,
                })
            })
            .collect()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ScheduledEvent>) -> Self {
        let mut queue = Self::new();
        for entry in entries {
            queue.schedule(entry.event_id, entry.target_day);
        }
        queue
    }

    pub fn len(&self) -> usize {
        self.by_day.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}
