use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Anxious,
    Calm,
    Grateful,
}

impl Mood {
    /// Selector order.
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Anxious,
        Mood::Calm,
        Mood::Grateful,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Anxious => "anxious",
            Mood::Calm => "calm",
            Mood::Grateful => "grateful",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Anxious => "😰",
            Mood::Calm => "😌",
            Mood::Grateful => "🙏",
        }
    }

    fn position(self) -> usize {
        Mood::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    pub fn next(self) -> Mood {
        Mood::ALL[(self.position() + 1) % Mood::ALL.len()]
    }

    pub fn prev(self) -> Mood {
        let len = Mood::ALL.len();
        Mood::ALL[(self.position() + len - 1) % len]
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mood '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeelingEntry {
    pub id: String,
    pub text: String,
    pub mood: Mood,
    pub time: String,
    pub likes: u64,
}

impl FeelingEntry {
    /// `text` must already be trimmed and non-empty.
    pub fn new(id: String, text: String, mood: Mood, created: DateTime<Local>) -> Self {
        FeelingEntry {
            id,
            text,
            mood,
            time: created.format(TIME_FORMAT).to_string(),
            likes: 0,
        }
    }
}

/// Millisecond timestamp id, bumped past `newest` so ids keep increasing
/// even when two entries land in the same millisecond. A newest id that is
/// not a number, or is already `u128::MAX`, does not constrain the clock.
pub fn next_id(created: DateTime<Local>, newest: Option<&str>) -> String {
    let candidate = u128::try_from(created.timestamp_millis()).unwrap_or(0);
    let floor = newest
        .and_then(|id| id.parse::<u128>().ok())
        .and_then(|n| n.checked_add(1))
        .unwrap_or(0);
    candidate.max(floor).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mood_serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Mood::Grateful).unwrap();
        assert_eq!(json, "\"grateful\"");
        let back: Mood = serde_json::from_str("\"anxious\"").unwrap();
        assert_eq!(back, Mood::Anxious);
    }

    #[test]
    fn mood_cycles_in_both_directions() {
        assert_eq!(Mood::Happy.next(), Mood::Sad);
        assert_eq!(Mood::Grateful.next(), Mood::Happy);
        assert_eq!(Mood::Happy.prev(), Mood::Grateful);
        assert_eq!("Calm".parse::<Mood>().unwrap(), Mood::Calm);
        assert!("bored".parse::<Mood>().is_err());
    }

    #[test]
    fn new_entry_starts_without_likes() {
        let created = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let entry = FeelingEntry::new("1".into(), "ok".into(), Mood::Calm, created);
        assert_eq!(entry.likes, 0);
        assert_eq!(entry.time, "2024-03-09 14:05:07");
    }

    #[test]
    fn ids_stay_increasing_within_one_millisecond() {
        let created = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let first = next_id(created, None);
        let second = next_id(created, Some(&first));
        assert_eq!(first, created.timestamp_millis().to_string());
        assert_eq!(
            second.parse::<i64>().unwrap(),
            first.parse::<i64>().unwrap() + 1
        );
        // A non-numeric newest id does not constrain the clock.
        assert_eq!(next_id(created, Some("legacy")), first);
    }

    #[test]
    fn ids_past_i64_range_still_increase() {
        let created = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            next_id(created, Some("9223372036854775807")),
            "9223372036854775808"
        );
        let max = u128::MAX.to_string();
        assert_eq!(
            next_id(created, Some(&max)),
            created.timestamp_millis().to_string()
        );
    }
}
