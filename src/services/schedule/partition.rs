//! Bucketing a day's events into time slots.

use crate::models::event::Event;

/// One time label's events before they are split into group columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPartition {
    pub time: String,
    pub shared: Vec<Event>,
    pub grouped: Vec<Event>,
}

/// Bucket events by exact time label, in order of first occurrence.
///
/// Within a bucket, events keep their input order and are split on whether
/// they carry a group. Labels are compared as-is: `"9:00"` and `"09:00"` are
/// different slots.
pub fn partition_slots(events: &[Event]) -> Vec<SlotPartition> {
    let mut slots: Vec<SlotPartition> = Vec::new();

    for event in events {
        let index = match slots.iter().position(|slot| slot.time == event.time) {
            Some(index) => index,
            None => {
                slots.push(SlotPartition {
                    time: event.time.clone(),
                    shared: Vec::new(),
                    grouped: Vec::new(),
                });
                slots.len() - 1
            }
        };

        let slot = &mut slots[index];
        if event.is_shared() {
            slot.shared.push(event.clone());
        } else {
            slot.grouped.push(event.clone());
        }
    }

    slots
}
