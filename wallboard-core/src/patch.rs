//! Diff & patch emitter.
//!
//! The renderer never sees the snapshot itself, only [`Patch`] values:
//! one per display group, carrying the changed leaf fields of that
//! group. [`DiffEngine`] owns the previously emitted values and emits a
//! group iff something in it changed, or the group carries an
//! always-resend field (the first hourly slot, which guarantees at least
//! one icon re-render per weather cycle).

use crate::model::{
    CurrentFields, DAILY_SLOTS, DailySlot, HOURLY_SLOTS, HeaderFields, HourlySlot, Snapshot,
};

/// Display groups in their fixed canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    Background,
    Header,
    Moon,
    SunSign,
    Separator,
    Time,
    CurrentConditions,
    Alert,
    DailyForecast,
    HourlyForecast,
    News,
    ClockOnlyToggle,
}

impl Group {
    pub const ALL: [Group; 12] = [
        Group::Background,
        Group::Header,
        Group::Moon,
        Group::SunSign,
        Group::Separator,
        Group::Time,
        Group::CurrentConditions,
        Group::Alert,
        Group::DailyForecast,
        Group::HourlyForecast,
        Group::News,
        Group::ClockOnlyToggle,
    ];

    /// Groups touched by applying a weather report (or re-deriving one).
    pub const WEATHER: [Group; 8] = [
        Group::Background,
        Group::Moon,
        Group::SunSign,
        Group::CurrentConditions,
        Group::Alert,
        Group::DailyForecast,
        Group::HourlyForecast,
        Group::ClockOnlyToggle,
    ];
}

/// One emitted patch group. Forecast groups carry `(index, slot)` pairs;
/// slots are addressed by stable index and never resized.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Background { bkg: String },
    Header(HeaderFields),
    Moon { phase: String },
    SunSign { sign: String },
    Separator { on: bool },
    Time { hour: String, minute: String },
    CurrentConditions(CurrentFields),
    Alert { text: Option<String> },
    DailyForecast { slots: Vec<(usize, DailySlot)> },
    HourlyForecast { slots: Vec<(usize, HourlySlot)> },
    News(NewsPatch),
    ClockOnlyToggle { enabled: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsPatch {
    Show { head: String, titles: String },
    Hide,
}

impl Patch {
    pub fn group(&self) -> Group {
        match self {
            Patch::Background { .. } => Group::Background,
            Patch::Header(_) => Group::Header,
            Patch::Moon { .. } => Group::Moon,
            Patch::SunSign { .. } => Group::SunSign,
            Patch::Separator { .. } => Group::Separator,
            Patch::Time { .. } => Group::Time,
            Patch::CurrentConditions(_) => Group::CurrentConditions,
            Patch::Alert { .. } => Group::Alert,
            Patch::DailyForecast { .. } => Group::DailyForecast,
            Patch::HourlyForecast { .. } => Group::HourlyForecast,
            Patch::News(_) => Group::News,
            Patch::ClockOnlyToggle { .. } => Group::ClockOnlyToggle,
        }
    }
}

/// Last successfully emitted values, per group. Everything starts as
/// None so the first diff of a group emits it whole.
#[derive(Debug, Default)]
struct Previous {
    bkg: Option<String>,
    header: Option<HeaderFields>,
    moon: Option<String>,
    sun_sign: Option<String>,
    sep_on: Option<bool>,
    time: Option<(String, String)>,
    current: Option<CurrentFields>,
    alert: Option<Option<String>>,
    daily: [Option<DailySlot>; DAILY_SLOTS],
    hourly: [Option<HourlySlot>; HOURLY_SLOTS],
    news: Option<(bool, String, String)>,
    clock_only: Option<bool>,
}

/// Computes minimal change-sets between the current snapshot and the
/// previously emitted one. Previous values are folded in only for
/// groups that were actually emitted.
#[derive(Debug, Default)]
pub struct DiffEngine {
    prev: Previous,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `snapshot` against the previously emitted values for every
    /// group in `scope`, in canonical order.
    pub fn diff(&mut self, snapshot: &Snapshot, scope: &[Group]) -> Vec<Patch> {
        let mut patches = Vec::new();

        for group in Group::ALL {
            if !scope.contains(&group) {
                continue;
            }
            if let Some(patch) = self.diff_group(snapshot, group) {
                patches.push(patch);
            }
        }

        patches
    }

    /// Diff every group.
    pub fn diff_all(&mut self, snapshot: &Snapshot) -> Vec<Patch> {
        self.diff(snapshot, &Group::ALL)
    }

    /// Forget previously emitted weather-derived values so the next diff
    /// re-emits them whole. Used when the location changes.
    pub fn reset_weather(&mut self) {
        self.prev.bkg = None;
        self.prev.moon = None;
        self.prev.current = None;
        self.prev.alert = None;
        self.prev.daily = Default::default();
        self.prev.hourly = Default::default();
    }

    fn diff_group(&mut self, snapshot: &Snapshot, group: Group) -> Option<Patch> {
        match group {
            Group::Background => {
                Self::leaf(&mut self.prev.bkg, &snapshot.bkg)
                    .map(|bkg| Patch::Background { bkg })
            }
            Group::Header => {
                Self::leaf(&mut self.prev.header, &snapshot.header).map(Patch::Header)
            }
            Group::Moon => {
                Self::leaf(&mut self.prev.moon, &snapshot.astro.moon)
                    .map(|phase| Patch::Moon { phase })
            }
            Group::SunSign => {
                Self::leaf(&mut self.prev.sun_sign, &snapshot.astro.sun_sign)
                    .map(|sign| Patch::SunSign { sign })
            }
            Group::Separator => {
                Self::leaf(&mut self.prev.sep_on, &snapshot.clock.sep_on)
                    .map(|on| Patch::Separator { on })
            }
            Group::Time => {
                let time = (snapshot.clock.hour.clone(), snapshot.clock.minute.clone());
                Self::leaf(&mut self.prev.time, &time)
                    .map(|(hour, minute)| Patch::Time { hour, minute })
            }
            Group::CurrentConditions => {
                Self::leaf(&mut self.prev.current, &snapshot.current)
                    .map(Patch::CurrentConditions)
            }
            Group::Alert => {
                Self::leaf(&mut self.prev.alert, &snapshot.alert)
                    .map(|text| Patch::Alert { text })
            }
            Group::DailyForecast => {
                let mut slots = Vec::new();
                for (i, slot) in snapshot.daily.iter().enumerate() {
                    if self.prev.daily[i].as_ref() != Some(slot) {
                        self.prev.daily[i] = Some(slot.clone());
                        slots.push((i, slot.clone()));
                    }
                }
                (!slots.is_empty()).then_some(Patch::DailyForecast { slots })
            }
            Group::HourlyForecast => {
                let mut slots = Vec::new();
                for (i, slot) in snapshot.hourly.iter().enumerate() {
                    // Slot 0 is always resent to force one icon repaint.
                    if i == 0 || self.prev.hourly[i].as_ref() != Some(slot) {
                        self.prev.hourly[i] = Some(slot.clone());
                        slots.push((i, slot.clone()));
                    }
                }
                (!slots.is_empty()).then_some(Patch::HourlyForecast { slots })
            }
            Group::News => {
                let news = (
                    snapshot.news.showing,
                    snapshot.news.head.clone(),
                    snapshot.news.titles.clone(),
                );
                Self::leaf(&mut self.prev.news, &news).map(|(showing, head, titles)| {
                    if showing {
                        Patch::News(NewsPatch::Show { head, titles })
                    } else {
                        Patch::News(NewsPatch::Hide)
                    }
                })
            }
            Group::ClockOnlyToggle => {
                Self::leaf(&mut self.prev.clock_only, &snapshot.clock_only)
                    .map(|enabled| Patch::ClockOnlyToggle { enabled })
            }
        }
    }

    /// Record and return `value` if it differs from the emitted one.
    fn leaf<T: Clone + PartialEq>(prev: &mut Option<T>, value: &T) -> Option<T> {
        if prev.as_ref() == Some(value) {
            None
        } else {
            *prev = Some(value.clone());
            Some(value.clone())
        }
    }
}
