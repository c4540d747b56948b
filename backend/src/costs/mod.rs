//! Cost and environment accounting
//!
//! Converts the realized sea time of every dispatched action into labour
//! cost, using the farm's working pattern:
//!
//! - **Season**: March to August use the summer working-days setting,
//!   the rest of the year the winter one
//! - **Weekday vs weekend**: a day is a working day when its index in the
//!   week (Monday = 0) is below the working days of its season
//! - **Day vs night**: the day shift starts at a fixed hour and lasts a
//!   fixed number of hours; everything else is night
//!
//! Each of the four resulting buckets has its own technician and specialist
//! wage. Spare cost is added on top; logistics cost comes from the solver
//! and is booked separately. Vessel usage is recorded per action for the
//! environmental export.

use crate::config::{SimulationConfig, WageRates, WorkingWeek};
use crate::core::time::{add_hours, is_summer};
use crate::logistics::VesselUsage;
use crate::models::component::SpareSpec;
use crate::models::strategy::{PerStrategy, Strategy};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Repairs consume a spare; inspections do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Repair,
    Inspection,
}

/// Crew size of one action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub technicians: u32,
    pub specialists: u32,
}

/// Hours of an interval in each wage bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftSplit {
    pub weekday_day: f64,
    pub weekday_night: f64,
    pub weekend_day: f64,
    pub weekend_night: f64,
}

impl ShiftSplit {
    pub fn total(&self) -> f64 {
        self.weekday_day + self.weekday_night + self.weekend_day + self.weekend_night
    }

    /// Wage bill of one worker paid `rates` over this split
    pub fn wage(&self, rates: &WageRates) -> f64 {
        self.weekday_day * rates.day
            + self.weekday_night * rates.night
            + self.weekend_day * rates.weekend_day()
            + self.weekend_night * rates.weekend_night()
    }
}

/// Cost of one action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionCost {
    pub spare: f64,
    pub labour: f64,
    /// `spare + labour`
    pub total: f64,
}

/// Vessel usage of one dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalRecord {
    pub action_id: Uuid,
    pub strategy: Strategy,
    pub date: NaiveDateTime,
    pub vessels: Vec<VesselUsage>,
    pub duration_hours: f64,
}

/// Labour and spare pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    week: WorkingWeek,
    technician: WageRates,
    specialist: WageRates,
}

impl CostModel {
    pub fn new(week: WorkingWeek, technician: WageRates, specialist: WageRates) -> Self {
        Self {
            week,
            technician,
            specialist,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.working_week.clone(),
            config.technician_wages.clone(),
            config.specialist_wages.clone(),
        )
    }

    fn is_working_day(&self, instant: NaiveDateTime) -> bool {
        let days = if is_summer(instant) {
            self.week.summer_days
        } else {
            self.week.winter_days
        };
        instant.weekday().num_days_from_monday() < days
    }

    fn is_day_shift(&self, instant: NaiveDateTime) -> bool {
        let offset = (instant.hour() + 24 - self.week.shift_start_hour) % 24;
        offset < self.week.shift_hours
    }

    /// Split `hours` starting at `start` into the four wage buckets.
    ///
    /// Walks the interval in one-hour steps and classifies each step by
    /// the instant it starts at.
    pub fn shift_split(&self, start: NaiveDateTime, hours: f64) -> ShiftSplit {
        let mut split = ShiftSplit::default();
        if !(hours > 0.0) || !hours.is_finite() {
            return split;
        }

        let mut remaining = hours;
        let mut cursor = start;
        while remaining > 0.0 {
            let step = remaining.min(1.0);
            match (self.is_working_day(cursor), self.is_day_shift(cursor)) {
                (true, true) => split.weekday_day += step,
                (true, false) => split.weekday_night += step,
                (false, true) => split.weekend_day += step,
                (false, false) => split.weekend_night += step,
            }
            cursor = add_hours(cursor, step);
            remaining -= step;
        }
        split
    }

    pub fn labour_cost(&self, start: NaiveDateTime, hours: f64, crew: Crew) -> f64 {
        let split = self.shift_split(start, hours);
        f64::from(crew.technicians) * split.wage(&self.technician)
            + f64::from(crew.specialists) * split.wage(&self.specialist)
    }

    /// Spare and labour cost of an action starting at `repair_date` that
    /// kept the crew at sea for `sea_time_hours`.
    pub fn cost(
        &self,
        kind: ActionKind,
        spare: &SpareSpec,
        crew: Crew,
        repair_date: NaiveDateTime,
        sea_time_hours: f64,
    ) -> ActionCost {
        let spare = match kind {
            ActionKind::Repair => spare.total_cost().max(0.0),
            ActionKind::Inspection => 0.0,
        };
        let labour = self.labour_cost(repair_date, sea_time_hours, crew).max(0.0);
        ActionCost {
            spare,
            labour,
            total: spare + labour,
        }
    }
}

/// Running cost totals and environmental records of one replicate.
#[derive(Debug, Clone)]
pub struct CostAccumulator {
    model: CostModel,
    totals: PerStrategy<f64>,
    environmental: Vec<EnvironmentalRecord>,
}

impl CostAccumulator {
    pub fn new(model: CostModel) -> Self {
        Self {
            model,
            totals: PerStrategy::default(),
            environmental: Vec::new(),
        }
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Price an action and add `logistic + total` to the strategy total.
    #[allow(clippy::too_many_arguments)]
    pub fn charge(
        &mut self,
        strategy: Strategy,
        kind: ActionKind,
        spare: &SpareSpec,
        crew: Crew,
        repair_date: NaiveDateTime,
        sea_time_hours: f64,
        logistic_cost: f64,
    ) -> ActionCost {
        let cost = self.model.cost(kind, spare, crew, repair_date, sea_time_hours);
        self.totals[strategy] += cost.total + logistic_cost.max(0.0);
        cost
    }

    pub fn record_vessels(&mut self, record: EnvironmentalRecord) {
        self.environmental.push(record);
    }

    pub fn total(&self, strategy: Strategy) -> f64 {
        self.totals[strategy]
    }

    pub fn environmental(&self) -> &[EnvironmentalRecord] {
        &self.environmental
    }

    pub fn into_environmental(self) -> Vec<EnvironmentalRecord> {
        self.environmental
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn model() -> CostModel {
        CostModel::from_config(&SimulationConfig::default())
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_weekday_day_shift() {
        // Wednesday 2016-06-01, 08:00, four hours inside the 07:00-19:00 shift
        let split = model().shift_split(at(2016, 6, 1, 8), 4.0);
        assert_eq!(split.weekday_day, 4.0);
        assert_eq!(split.total(), 4.0);
    }

    #[test]
    fn test_night_and_weekend_buckets() {
        // Friday 2016-06-03 17:00 for 10 hours: 2h day, 5h Friday night,
        // then Saturday from midnight
        let split = model().shift_split(at(2016, 6, 3, 17), 10.0);
        assert_eq!(split.weekday_day, 2.0);
        assert_eq!(split.weekday_night, 5.0);
        assert_eq!(split.weekend_night, 3.0);
        assert_eq!(split.weekend_day, 0.0);
    }

    #[test]
    fn test_fractional_hours() {
        let split = model().shift_split(at(2016, 6, 1, 8), 2.5);
        assert!((split.total() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_inspection_has_no_spare_cost() {
        let spare = SpareSpec {
            cost: 1000.0,
            cost_transit: Some(50.0),
            ..SpareSpec::default()
        };
        let crew = Crew {
            technicians: 2,
            specialists: 1,
        };
        let m = model();
        let repair = m.cost(ActionKind::Repair, &spare, crew, at(2016, 6, 1, 8), 4.0);
        assert_eq!(repair.spare, 1050.0);
        // 4h weekday day: 2 × 45 + 1 × 80 per hour
        assert!((repair.labour - 4.0 * 170.0).abs() < 1e-9);
        assert_eq!(repair.total, repair.spare + repair.labour);

        let inspection = m.cost(ActionKind::Inspection, &spare, crew, at(2016, 6, 1, 8), 4.0);
        assert_eq!(inspection.spare, 0.0);
    }

    #[test]
    fn test_accumulator_totals() {
        let mut acc = CostAccumulator::new(model());
        let crew = Crew {
            technicians: 1,
            specialists: 0,
        };
        let cost = acc.charge(
            Strategy::Calendar,
            ActionKind::Inspection,
            &SpareSpec::default(),
            crew,
            at(2016, 6, 1, 8),
            1.0,
            100.0,
        );
        assert_eq!(cost.labour, 45.0);
        assert_eq!(acc.total(Strategy::Calendar), 145.0);
        assert_eq!(acc.total(Strategy::Corrective), 0.0);
    }
}
