//! Playback ordering over [`Schedule::playlist`](crate::model::Schedule::playlist).

use crate::model::{MediaItem, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOrder {
    Sequential,
    Shuffled,
}

/// The playable items of a schedule and how to step through them.
#[derive(Debug, Clone)]
pub struct Playlist<'a> {
    items: Vec<&'a MediaItem>,
    order: PlaybackOrder,
}

impl<'a> Playlist<'a> {
    pub fn from_schedule(schedule: &'a Schedule) -> Self {
        let order = if schedule.screen.sequential {
            PlaybackOrder::Sequential
        } else {
            PlaybackOrder::Shuffled
        };
        Self {
            items: schedule.playlist(),
            order,
        }
    }

    pub fn items(&self) -> &[&'a MediaItem] {
        &self.items
    }

    pub fn order(&self) -> PlaybackOrder {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index to play after `current`.
    ///
    /// `random` is any random number supplied by the caller; it is only used
    /// for shuffled playback, which never repeats the current item when more
    /// than one item exists.
    pub fn next_index(&self, current: usize, random: usize) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }

        let next = match self.order {
            PlaybackOrder::Sequential => (current + 1) % len,
            PlaybackOrder::Shuffled => {
                let pick = random % len;
                if len > 1 && pick == current {
                    (pick + 1) % len
                } else {
                    pick
                }
            }
        };
        Some(next)
    }
}
