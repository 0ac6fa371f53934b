use std::sync::Arc;

// years and their mementos are kept in calendar order
use std::collections::{BTreeMap, BTreeSet};

// month counts keep the order of the months
use indexmap::IndexMap;

use tracing::debug;

use crate::datetime::{month_name, DisplayFormat, TemporalValue};
use crate::relation::Memento;

/// How [`MementoTimeline::index_of`] matches a datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMatch {
    Exact,
    DateOnly,
}

// one slot per month, an empty slot means no mementos that month
type MonthSlots = [Vec<Arc<Memento>>; 12];

// ------------- MementoTimeline -------------
/// All Mementos known for a URL, in insertion order, with a year index kept
/// up to date on insert and a month index built lazily per year.
///
/// The year index is a sorted set using the day-granular Memento ordering,
/// so several Mementos captured on the same day count once there.
#[derive(Debug, Default, Clone)]
pub struct MementoTimeline {
    mementos: Vec<Arc<Memento>>,
    years: BTreeMap<i32, BTreeSet<Arc<Memento>>>,
    // should be used very infrequently, some sites have thousands of mementos per year
    months: BTreeMap<i32, MonthSlots>,
    current: Option<usize>,
}

impl MementoTimeline {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, memento: Memento) {
        let memento = Arc::new(memento);
        let year = memento.datetime().year();
        self.years
            .entry(year)
            .or_default()
            .insert(Arc::clone(&memento));
        // rebuilt on next access if it was ever built
        self.months.remove(&year);
        self.mementos.push(memento);
    }
    pub fn clear(&mut self) {
        self.mementos.clear();
        self.years.clear();
        self.months.clear();
        self.current = None;
    }
    pub fn len(&self) -> usize {
        self.mementos.len()
    }
    pub fn is_empty(&self) -> bool {
        self.mementos.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Memento> {
        self.mementos.iter().map(|m| m.as_ref())
    }
    pub fn get(&self, index: usize) -> Option<&Memento> {
        self.mementos.get(index).map(|m| m.as_ref())
    }
    pub fn first(&self) -> Option<&Memento> {
        self.mementos.first().map(|m| m.as_ref())
    }
    pub fn last(&self) -> Option<&Memento> {
        self.mementos.last().map(|m| m.as_ref())
    }
    /// Stable sort by datetime. Same-day Mementos keep their relative order.
    pub fn sort(&mut self) {
        self.mementos.sort();
    }

    // ------------- cursor -------------
    pub fn current(&self) -> Option<&Memento> {
        self.current.and_then(|i| self.get(i))
    }
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }
    /// Unsets the cursor with `None`, moves it with an index below `len()`.
    /// Anything else is ignored and `false` returned.
    pub fn set_current_index(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.len() => false,
            _ => {
                self.current = index;
                true
            }
        }
    }
    pub fn next(&mut self) -> Option<&Memento> {
        match self.current {
            Some(i) if i + 1 < self.len() => {
                self.current = Some(i + 1);
                self.get(i + 1)
            }
            _ => None,
        }
    }
    pub fn previous(&mut self) -> Option<&Memento> {
        match self.current {
            Some(i) if i > 0 && i < self.len() => {
                self.current = Some(i - 1);
                self.get(i - 1)
            }
            _ => {
                debug!(current = ?self.current, "no previous memento");
                None
            }
        }
    }

    // ------------- date lookups -------------
    // index of the first memento that is not earlier than the date
    fn position_not_before(&self, date: &TemporalValue) -> usize {
        self.mementos
            .iter()
            .position(|m| m.datetime() >= date)
            .unwrap_or(self.len())
    }
    /// The Memento closest to the date. The neighbour on the newer side has to
    /// be strictly closer (in whole days) to win, otherwise the older one does.
    pub fn closest(&self, date: &TemporalValue) -> Option<&Memento> {
        if self.is_empty() {
            return None;
        }
        let i = self.position_not_before(date);
        if i == self.len() {
            return self.last();
        }
        let newer: &Memento = &self.mementos[i];
        if i == 0 || newer.datetime() == date {
            return Some(newer);
        }
        let older: &Memento = &self.mementos[i - 1];
        let to_newer = date.days_until(newer.datetime());
        let from_older = older.datetime().days_until(date);
        if to_newer < from_older {
            Some(newer)
        } else {
            Some(older)
        }
    }
    pub fn index_of(&self, datetime: &TemporalValue, matching: IndexMatch) -> Option<usize> {
        self.mementos.iter().position(|m| match matching {
            IndexMatch::Exact => m.datetime().same_instant(datetime),
            IndexMatch::DateOnly => m.datetime().same_calendar_day(datetime),
        })
    }
    /// The Memento after the one on the given date, or the first newer one
    /// when there is none on that date.
    pub fn next_after(&self, date: &TemporalValue) -> Option<&Memento> {
        let i = self.position_not_before(date);
        if i == self.len() {
            None
        } else if self.mementos[i].datetime() == date {
            self.get(i + 1)
        } else {
            self.get(i)
        }
    }
    /// The Memento before the given date.
    pub fn previous_before(&self, date: &TemporalValue) -> Option<&Memento> {
        let i = self.position_not_before(date);
        if i == 0 { None } else { self.get(i - 1) }
    }
    pub fn is_first(&self, date: &TemporalValue) -> bool {
        self.first().is_some_and(|m| m.datetime().same_instant(date))
    }
    pub fn is_last(&self, date: &TemporalValue) -> bool {
        self.last().is_some_and(|m| m.datetime().same_instant(date))
    }

    // ------------- year and month browsing -------------
    pub fn year_counts(&self) -> BTreeMap<i32, usize> {
        let counts: BTreeMap<i32, usize> = self
            .years
            .iter()
            .map(|(year, mementos)| (*year, mementos.len()))
            .collect();
        debug!(
            indexed = counts.values().sum::<usize>(),
            size = self.len(),
            "year counts"
        );
        counts
    }
    fn month_index(&mut self, year: i32) -> Option<&MonthSlots> {
        if !self.months.contains_key(&year) {
            let mementos = self.years.get(&year)?;
            let mut slots: MonthSlots = Default::default();
            for memento in mementos {
                let month = memento.datetime().month() as usize;
                slots[month - 1].push(Arc::clone(memento));
            }
            self.months.insert(year, slots);
        }
        self.months.get(&year)
    }
    /// Month names and their number of Mementos, months without any skipped.
    pub fn month_counts(&mut self, year: i32) -> IndexMap<&'static str, usize> {
        let mut counts = IndexMap::new();
        if let Some(slots) = self.month_index(year) {
            for (i, slot) in slots.iter().enumerate() {
                if slot.is_empty() {
                    continue;
                }
                if let Some(name) = month_name(i as u32 + 1) {
                    counts.insert(name, slot.len());
                }
            }
        }
        counts
    }
    pub fn by_year(&self, year: i32) -> Vec<Arc<Memento>> {
        self.years
            .get(&year)
            .map(|mementos| mementos.iter().cloned().collect())
            .unwrap_or_default()
    }
    /// `None` for a month outside 1 to 12.
    pub fn by_month(&mut self, month: u32, year: i32) -> Option<Vec<Arc<Memento>>> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(
            self.month_index(year)
                .map(|slots| slots[month as usize - 1].clone())
                .unwrap_or_default(),
        )
    }
    pub fn all_dates(&self, format: &DisplayFormat) -> Vec<String> {
        self.iter()
            .map(|m| m.datetime().format_date_time(format))
            .collect()
    }
    pub fn dates_for_year(&self, year: i32, format: &DisplayFormat) -> Vec<String> {
        self.by_year(year)
            .iter()
            .map(|m| m.datetime().format_date_time(format))
            .collect()
    }
    pub fn dates_for_month(
        &mut self,
        month: u32,
        year: i32,
        format: &DisplayFormat,
    ) -> Option<Vec<String>> {
        let mementos = self.by_month(month, year)?;
        Some(
            mementos
                .iter()
                .map(|m| m.datetime().format_date_time(format))
                .collect(),
        )
    }
}

impl Extend<Memento> for MementoTimeline {
    fn extend<I: IntoIterator<Item = Memento>>(&mut self, iter: I) {
        for memento in iter {
            self.insert(memento);
        }
    }
}
impl FromIterator<Memento> for MementoTimeline {
    fn from_iter<I: IntoIterator<Item = Memento>>(iter: I) -> Self {
        let mut timeline = Self::new();
        timeline.extend(iter);
        timeline
    }
}
