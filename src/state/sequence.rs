//! Request sequencing
//!
//! Every fetch is stamped with a token when it starts. When the response
//! arrives it is applied only if its token is still the newest one for its
//! channel; anything older lost a race with a later selection and is dropped.

use std::collections::HashMap;

/// Independent fetch streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Routes,
    Stops,
    CurrentLoad,
    Forecast,
    AnalyticsRoutes,
    AnalyticsStops,
    Analytics,
}

/// Stamp carried by an in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    channel: Channel,
    seq: u64,
}

impl RequestToken {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Monotonic token source
#[derive(Debug, Default)]
pub struct RequestSequence {
    next: u64,
    current: HashMap<Channel, u64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request on `channel`, superseding any in flight
    pub fn issue(&mut self, channel: Channel) -> RequestToken {
        self.next += 1;
        self.current.insert(channel, self.next);
        RequestToken {
            channel,
            seq: self.next,
        }
    }

    /// Supersede whatever is in flight on `channel` without starting anything
    pub fn invalidate(&mut self, channel: Channel) {
        self.next += 1;
        self.current.insert(channel, self.next);
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.get(&token.channel) == Some(&token.seq)
    }
}
