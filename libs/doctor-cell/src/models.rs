use std::fmt;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub full_name: String,
    pub specialty: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub consultation_fee: Option<f64>,
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorSearchQuery {
    pub city: Option<String>,
    pub specialty: Option<String>,
    pub name: Option<String>,
}

impl DoctorSearchQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let fields = [
            ("city", &self.city),
            ("specialty", &self.specialty),
            ("name", &self.name),
        ];

        for (key, value) in fields {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.push((key, v.to_string()));
            }
        }

        query
    }
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// 0 = Sunday
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(index) = raw.parse::<u8>() {
            return Self::from_index(index);
        }
        Self::ALL.into_iter().find(|day| {
            day.name().eq_ignore_ascii_case(raw) || day.name()[..3].eq_ignore_ascii_case(raw)
        })
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Index(u8),
            Name(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Index(i) => DayOfWeek::from_index(i),
            Raw::Name(name) => DayOfWeek::parse(&name),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("expected a weekday name or 0-6"))
    }
}

/// Recurring weekly window during which a doctor takes bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    #[serde(alias = "dayOfWeek")]
    pub day_of_week: DayOfWeek,
    #[serde(alias = "startTime", with = "hms")]
    pub start_time: NaiveTime,
    #[serde(alias = "endTime", with = "hms")]
    pub end_time: NaiveTime,
}

/// A slot already reserved for one specific date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedSlot {
    pub time: String,
    #[serde(default)]
    pub status: String,
}

impl BookedSlot {
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        hms::parse(&self.time)
    }
}

/// Start of a bookable unit, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// The `HH:MM:SS` form used by the booked-slot endpoint.
    pub fn as_hms(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }

    pub fn parse(raw: &str) -> Option<Self> {
        hms::parse(raw).map(Self)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeSlot::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailability {
    Booked,
    Elapsed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub time: TimeSlot,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Unavailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub utc_offset: String,
    pub slots: Vec<SlotView>,
}

impl DaySchedule {
    pub fn available_slots(&self) -> impl Iterator<Item = &SlotView> {
        self.slots.iter().filter(|s| s.available)
    }

    pub fn find(&self, slot: TimeSlot) -> Option<&SlotView> {
        self.slots.iter().find(|s| s.time == slot)
    }

    pub fn is_available(&self, slot: TimeSlot) -> bool {
        self.find(slot).is_some_and(|s| s.available)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
}

/// `HH:MM:SS` wire format for window times; `HH:MM` is accepted on input.
pub mod hms {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M:%S"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}
