//! The fixed catalogue of supported metrics.

use crate::error::MetricsError;
use crate::table::TIME_COLUMN;
use std::fmt;
use std::str::FromStr;

/// How a metric's raw response is turned into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// One number per day; weekly keeps the Sunday value.
    Plain,
    /// A per-day count; weekly sums the seven days ending on Sunday.
    Accumulating,
    /// A fixed-arity tuple per day, split into the named columns.
    Paired,
}

/// A single metric served by one API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ClosingPrice,
    MarketCap,
    RealizedPrice,
    RealizedCap,
    NewAddresses,
    NumberOfTransactions,
    AccumulationTrendScore,
    PiCycleTop,
    SupplyActiveOverOneYear,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::ClosingPrice,
        Metric::MarketCap,
        Metric::RealizedPrice,
        Metric::RealizedCap,
        Metric::NewAddresses,
        Metric::NumberOfTransactions,
        Metric::AccumulationTrendScore,
        Metric::PiCycleTop,
        Metric::SupplyActiveOverOneYear,
    ];

    /// Endpoint path relative to the API base.
    pub fn path(self) -> &'static str {
        match self {
            Metric::ClosingPrice => "v1/metrics/market/price_usd_close",
            Metric::MarketCap => "v1/metrics/market/marketcap_usd",
            Metric::RealizedPrice => "v1/metrics/market/price_realized_usd",
            Metric::RealizedCap => "v1/metrics/market/marketcap_realized_usd",
            Metric::NewAddresses => "v1/metrics/addresses/new_non_zero_count",
            Metric::NumberOfTransactions => "v1/metrics/transactions/count",
            Metric::AccumulationTrendScore => "v1/metrics/indicators/accumulation_trend_score",
            Metric::PiCycleTop => "v1/metrics/indicators/pi_cycle_top",
            Metric::SupplyActiveOverOneYear => "v1/metrics/supply/active_more_1y_percent",
        }
    }

    /// Output column names, time column first.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Metric::ClosingPrice => &[TIME_COLUMN, "price"],
            Metric::MarketCap => &[TIME_COLUMN, "market cap"],
            Metric::RealizedPrice => &[TIME_COLUMN, "realized price"],
            Metric::RealizedCap => &[TIME_COLUMN, "realized cap"],
            Metric::NewAddresses => &[TIME_COLUMN, "number of new addresses"],
            Metric::NumberOfTransactions => &[TIME_COLUMN, "number of transactions"],
            Metric::AccumulationTrendScore => &[TIME_COLUMN, "price", "score"],
            Metric::PiCycleTop => &[TIME_COLUMN, "pi 1", "pi 2"],
            Metric::SupplyActiveOverOneYear => &[TIME_COLUMN, "active over 1 year ago %"],
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Metric::NewAddresses | Metric::NumberOfTransactions => Shape::Accumulating,
            Metric::AccumulationTrendScore | Metric::PiCycleTop => Shape::Paired,
            _ => Shape::Plain,
        }
    }

    /// Kebab-case identifier used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Metric::ClosingPrice => "closing-price",
            Metric::MarketCap => "market-cap",
            Metric::RealizedPrice => "realized-price",
            Metric::RealizedCap => "realized-cap",
            Metric::NewAddresses => "new-addresses",
            Metric::NumberOfTransactions => "number-of-transactions",
            Metric::AccumulationTrendScore => "accumulation-trend-score",
            Metric::PiCycleTop => "pi-cycle-top",
            Metric::SupplyActiveOverOneYear => "supply-active-over-one-year",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown metric '{s}'")))
    }
}

/// Two metrics fetched separately and joined on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composite {
    PriceRealizedPrice,
    NewAddressesAndPrice,
    SupplyActiveOverOneYearAndPrice,
    PiCycleTopAndPrice,
}

impl Composite {
    pub const ALL: [Composite; 4] = [
        Composite::PriceRealizedPrice,
        Composite::NewAddressesAndPrice,
        Composite::SupplyActiveOverOneYearAndPrice,
        Composite::PiCycleTopAndPrice,
    ];

    /// Left and right operands of the join, fetched in that order.
    pub fn parts(self) -> (Metric, Metric) {
        match self {
            Composite::PriceRealizedPrice => (Metric::ClosingPrice, Metric::RealizedPrice),
            Composite::NewAddressesAndPrice => (Metric::ClosingPrice, Metric::NewAddresses),
            Composite::SupplyActiveOverOneYearAndPrice => {
                (Metric::ClosingPrice, Metric::SupplyActiveOverOneYear)
            }
            Composite::PiCycleTopAndPrice => (Metric::ClosingPrice, Metric::PiCycleTop),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Composite::PriceRealizedPrice => "price-realized-price",
            Composite::NewAddressesAndPrice => "new-addresses-and-price",
            Composite::SupplyActiveOverOneYearAndPrice => "supply-active-over-one-year-and-price",
            Composite::PiCycleTopAndPrice => "pi-cycle-top-and-price",
        }
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Composite {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Composite::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown composite '{s}'")))
    }
}
