pub mod entries;
pub mod export;
pub mod options;
pub mod regions;
pub mod scorecard;
pub mod summary;
pub mod trend;

use clap::Args;
use tracing::info;

use tradein_core::dashboard::{LoadedData, ViewQuery};
use tradein_core::filter::{LocationSelection, PeriodFilter};
use tradein_core::reference::ReferenceData;

use crate::input;

/// Where the two channel exports and the reference data live.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Maple export (.csv, .xlsx, .xls or .ods)
    #[arg(long)]
    pub maple: String,

    /// Cashify export (.csv, .xlsx, .xls or .ods)
    #[arg(long)]
    pub cashify: String,

    /// Reference data with targets and weekoffs (.yaml or .json)
    #[arg(long)]
    pub reference: Option<String>,

    /// Worksheet to read from spreadsheet exports (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
}

impl DataArgs {
    pub fn load(&self) -> Result<LoadedData, Box<dyn std::error::Error>> {
        let maple = input::table::read_table(&self.maple, self.sheet.as_deref())?;
        let cashify = input::table::read_table(&self.cashify, self.sheet.as_deref())?;
        let data = LoadedData::from_tables(&maple, &cashify)?;
        info!(
            maple = data.maple.len(),
            cashify = data.cashify.len(),
            "channel records loaded"
        );
        Ok(data)
    }

    pub fn reference(&self) -> Result<ReferenceData, Box<dyn std::error::Error>> {
        load_reference(self.reference.as_deref())
    }
}

/// Reference data from a file, or empty defaults when no file is given.
pub fn load_reference(path: Option<&str>) -> Result<ReferenceData, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let reference: ReferenceData = input::file::read_structured(p)?;
            info!(
                file = p,
                representatives = reference.profiles().len(),
                "reference data loaded"
            );
            Ok(reference)
        }
        None => Ok(ReferenceData::default()),
    }
}

#[derive(Args, Debug)]
pub struct PeriodArgs {
    /// Reporting year
    #[arg(long)]
    pub year: i32,

    /// Month name or number, or "All"
    #[arg(long, default_value = "All")]
    pub month: String,

    /// Day of month, or "All"
    #[arg(long, default_value = "All")]
    pub day: String,
}

impl PeriodArgs {
    pub fn filter(&self) -> Result<PeriodFilter, Box<dyn std::error::Error>> {
        let mut period = PeriodFilter::year(self.year);
        if let Some(m) = choice(&self.month) {
            period = period.with_month(m);
        }
        if let Some(d) = choice(&self.day) {
            let day: u32 = d
                .parse()
                .map_err(|_| format!("--day must be a day of month or All, got '{}'", d))?;
            period = period.with_day(day);
        }
        period.validate()?;
        Ok(period)
    }
}

#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// State region (zone), e.g. South
    #[arg(long)]
    pub region: Option<String>,

    /// Store state
    #[arg(long)]
    pub state: Option<String>,

    /// Store name
    #[arg(long)]
    pub store: Option<String>,

    /// Representative (SPOC) name
    #[arg(long)]
    pub spoc: Option<String>,
}

impl SelectionArgs {
    pub fn selection(&self) -> LocationSelection {
        LocationSelection {
            region: self.region.as_deref().and_then(choice).map(String::from),
            store_state: self.state.as_deref().and_then(choice).map(String::from),
            store_name: self.store.as_deref().and_then(choice).map(String::from),
            representative: self.spoc.as_deref().and_then(choice).map(String::from),
        }
    }
}

/// Arguments shared by every dashboard view.
#[derive(Args, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub period: PeriodArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

impl ViewArgs {
    pub fn query(&self) -> Result<ViewQuery, Box<dyn std::error::Error>> {
        Ok(ViewQuery::new(self.period.filter()?).with_selection(self.selection.selection()))
    }
}

/// `None` for the selector sentinel "All" or a blank value.
pub fn choice(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed)
    }
}
