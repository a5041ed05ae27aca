//! Scripted key timelines.
//!
//! A script is a list of segments, one per line: a tick count followed by
//! the keys held for those ticks. `#` starts a comment.
//!
//! ```text
//! # run right, then jump
//! 20 d
//! 8  d space
//! 30
//! ```

use std::str::FromStr;

use ledge_common::ScriptError;
use ledge_gameplay::KeyCode;

/// Keys held for a run of ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Ticks the keys stay held
    pub ticks: u32,
    /// Held keys
    pub keys: Vec<KeyCode>,
}

/// A parsed key timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputScript {
    segments: Vec<Segment>,
}

impl InputScript {
    /// Segments in playback order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total scripted ticks.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.ticks)).sum()
    }

    /// Keys held on `tick`. Nothing is held once the script has ended.
    #[must_use]
    pub fn held_at(&self, tick: u64) -> &[KeyCode] {
        let mut start = 0u64;
        for segment in &self.segments {
            let end = start + u64::from(segment.ticks);
            if tick < end {
                return &segment.keys;
            }
            start = end;
        }
        &[]
    }
}

impl FromStr for InputScript {
    type Err = ScriptError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut words = content.split_whitespace();
            let count = words.next().unwrap_or_default();
            let ticks: u32 = count.parse().map_err(|_| ScriptError::Malformed {
                line,
                reason: format!("expected a tick count, found {count:?}"),
            })?;

            let mut keys = Vec::new();
            for word in words {
                let key = word.parse::<KeyCode>().map_err(|err| ScriptError::UnknownKey {
                    line,
                    key: err.0,
                })?;
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }

            segments.push(Segment { ticks, keys });
        }

        Ok(Self { segments })
    }
}
