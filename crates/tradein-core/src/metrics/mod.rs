//! Figures computed from a pair of filtered record sets.
//!
//! Every function here is total: zero denominators yield 0, missing keys
//! yield defaults.

pub mod activity;
pub mod contribution;
pub mod share;
pub mod weekoff;

pub use activity::{
    acquisition_averages, store_device_counts, stores_per_state, AcquisitionAverages,
    StateStoreCount, StoreDeviceCount,
};
pub use contribution::{
    category_contribution, group_counts, CategoryContribution, CategoryShare, GroupKey,
};
pub use share::{
    average_price_differential, market_share, mean_device_value, shortfall, target_attainment,
};
pub use weekoff::{
    weekoff_dates, weekoff_loss, weekoff_records, working_day_loss, working_day_records,
    WeekoffCalendar, WorkingDayLoss,
};
