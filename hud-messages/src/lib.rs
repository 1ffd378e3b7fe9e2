//! Short-lived on-screen notifications such as "Sound off" or "Size locked".
//!
//! The queue is tiny and fixed: at most `MAX_MESSAGES` lines are held, an
//! identical line is never queued twice, and the oldest line is shunted out
//! when a new one arrives on a full queue. The front of the queue is the
//! message currently on display; it retires after `MESSAGE_TIMELIMIT`
//! milliseconds.

use log::{debug, info};

pub const MAX_MESSAGES: usize = 5;
/// Maximum stored length of one message, in bytes
pub const MESSAGE_MAX: usize = 30;
/// How long the current message stays up, in milliseconds
pub const MESSAGE_TIMELIMIT: u32 = 1000;

#[derive(Debug, Default, Clone)]
pub struct MessageQueue {
    lines: [String; MAX_MESSAGES],
    /// Start of lines (`lines` is used circular)
    start: usize,
    count: usize,
    /// Timestamp at which the current front line was first seen
    shown_at: Option<u32>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `msg` unless an identical line is already waiting.
    pub fn add(&mut self, msg: impl Into<String>) {
        let mut msg = msg.into();
        truncate(&mut msg);
        if self.iter().any(|l| *l == msg) {
            return;
        }
        info!("{msg}");
        if self.count == MAX_MESSAGES {
            // Shunt start over to make room for the next line.
            self.lines[self.start].clear();
            self.start = (self.start + 1) % MAX_MESSAGES;
            self.count -= 1;
            self.shown_at = None;
        }
        let pos = (self.start + self.count) % MAX_MESSAGES;
        self.lines[pos] = msg;
        self.count += 1;
    }

    /// The message currently on display, if any
    pub fn get(&self) -> Option<&str> {
        if self.count == 0 {
            return None;
        }
        Some(&self.lines[self.start])
    }

    /// Remove the first line equal to `msg`. Used to drop a stale
    /// "Sound on" before queueing "Sound off".
    pub fn clear(&mut self, msg: &str) {
        let mut msg = msg.to_string();
        truncate(&mut msg);
        let Some(n) = (0..self.count).find(|n| self.lines[(self.start + n) % MAX_MESSAGES] == msg)
        else {
            return;
        };
        if n == 0 {
            self.shown_at = None;
        }
        // close the gap so the queue stays contiguous
        for i in n..self.count - 1 {
            let a = (self.start + i) % MAX_MESSAGES;
            let b = (self.start + i + 1) % MAX_MESSAGES;
            self.lines.swap(a, b);
        }
        let last = (self.start + self.count - 1) % MAX_MESSAGES;
        self.lines[last].clear();
        self.count -= 1;
    }

    pub fn clear_all(&mut self) {
        for l in self.lines.iter_mut() {
            l.clear();
        }
        self.start = 0;
        self.count = 0;
        self.shown_at = None;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Retire the current message once it has been up for
    /// `MESSAGE_TIMELIMIT` ms. `now` is the system timestamp in ms.
    pub fn ticker(&mut self, now: u32) {
        if self.count == 0 {
            return;
        }
        match self.shown_at {
            None => self.shown_at = Some(now),
            Some(t) if now.wrapping_sub(t) >= MESSAGE_TIMELIMIT => {
                debug!("Message expired: {}", self.lines[self.start]);
                self.lines[self.start].clear();
                self.start = (self.start + 1) % MAX_MESSAGES;
                self.count -= 1;
                self.shown_at = if self.count > 0 { Some(now) } else { None };
            }
            Some(_) => {}
        }
    }

    fn iter(&self) -> impl Iterator<Item = &String> {
        (0..self.count).map(move |n| &self.lines[(self.start + n) % MAX_MESSAGES])
    }
}

fn truncate(msg: &mut String) {
    if msg.len() >= MESSAGE_MAX {
        let mut end = MESSAGE_MAX - 1;
        while !msg.is_char_boundary(end) {
            end -= 1;
        }
        msg.truncate(end);
    }
}

#[cfg(test)]
mod tests {
    use crate::{MAX_MESSAGES, MESSAGE_TIMELIMIT, MessageQueue};

    #[test]
    fn duplicates_are_dropped() {
        let mut msgs = MessageQueue::new();
        msgs.add("Sound off");
        msgs.add("Sound off");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs.get(), Some("Sound off"));
    }

    #[test]
    fn check_cycle_through_max() {
        let mut msgs = MessageQueue::new();
        for n in 0..MAX_MESSAGES {
            msgs.add(format!("{n}"));
        }
        assert_eq!(msgs.get(), Some("0"));

        msgs.add("11");
        assert_eq!(msgs.len(), MAX_MESSAGES);
        assert_eq!(msgs.get(), Some("1"));

        msgs.clear("1");
        assert_eq!(msgs.get(), Some("2"));
        msgs.clear("3");
        assert_eq!(msgs.len(), MAX_MESSAGES - 2);

        msgs.clear_all();
        assert!(msgs.is_empty());
        assert_eq!(msgs.get(), None);
    }

    #[test]
    fn swap_on_off_message() {
        let mut msgs = MessageQueue::new();
        msgs.add("Sound on");
        msgs.clear("Sound on");
        msgs.add("Sound off");
        assert_eq!(msgs.get(), Some("Sound off"));
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn long_lines_are_truncated() {
        let mut msgs = MessageQueue::new();
        msgs.add("Unable to fit a scaled screen within the window");
        assert_eq!(msgs.get().map(str::len), Some(29));
    }

    #[test]
    fn current_message_expires() {
        let mut msgs = MessageQueue::new();
        msgs.add("a");
        msgs.add("b");
        msgs.ticker(100);
        msgs.ticker(100 + MESSAGE_TIMELIMIT - 1);
        assert_eq!(msgs.get(), Some("a"));
        msgs.ticker(100 + MESSAGE_TIMELIMIT);
        assert_eq!(msgs.get(), Some("b"));
        msgs.ticker(100 + 2 * MESSAGE_TIMELIMIT);
        assert!(msgs.is_empty());
    }
}
