//! Historical rate tables and the RMD divisor table
//!
//! Monte Carlo trials draw bill-increase and interest rates uniformly from
//! these observed historical series instead of the configured literals. The
//! tables are loaded once and injected via [`RateContext`]; the core treats
//! them as read-only.

use std::borrow::Cow;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A named series of historical annual rate samples (fractional, 0.03 = 3%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalRates {
    pub name: Cow<'static, str>,
    pub samples: Cow<'static, [f64]>,
}

impl HistoricalRates {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        samples: impl Into<Cow<'static, [f64]>>,
    ) -> Self {
        Self {
            name: name.into(),
            samples: samples.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Draw one sample uniformly at random. `None` when the series is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.samples.len());
        Some(self.samples[idx])
    }
}

/// US CPI-U annual inflation, 1990-2023.
const INFLATION: [f64; 34] = [
    0.0540, 0.0425, 0.0303, 0.0295, 0.0261, 0.0281, 0.0293, 0.0234, 0.0155, 0.0219, 0.0338,
    0.0283, 0.0159, 0.0227, 0.0268, 0.0339, 0.0324, 0.0285, 0.0384, -0.0036, 0.0164, 0.0316,
    0.0207, 0.0146, 0.0162, 0.0012, 0.0126, 0.0213, 0.0244, 0.0181, 0.0123, 0.0470, 0.0800,
    0.0412,
];

/// Average annual wage growth, 1990-2023.
const RAISE_RATE: [f64; 34] = [
    0.0460, 0.0370, 0.0520, 0.0090, 0.0270, 0.0400, 0.0490, 0.0590, 0.0520, 0.0560, 0.0550,
    0.0240, 0.0100, 0.0245, 0.0465, 0.0366, 0.0460, 0.0450, 0.0230, -0.0151, 0.0236, 0.0311,
    0.0312, 0.0128, 0.0355, 0.0348, 0.0113, 0.0345, 0.0362, 0.0375, 0.0283, 0.0860, 0.0538,
    0.0444,
];

/// Year-over-year growth in the 401(k) elective deferral limit, 1990-2023.
const LIMIT_401K_INCREASE: [f64; 34] = [
    0.0270, 0.0640, 0.0230, 0.0130, 0.0270, 0.0000, 0.0211, 0.0103, 0.0408, 0.0000, 0.0490,
    0.0000, 0.0455, 0.0870, 0.0800, 0.0741, 0.0690, 0.0323, 0.0000, 0.0650, 0.0000, 0.0000,
    0.0294, 0.0286, 0.0000, 0.0278, 0.0000, 0.0000, 0.0270, 0.0263, 0.0256, 0.0000, 0.0500,
    0.0976,
];

/// Annual change in average 30-year fixed mortgage payment levels, 1990-2023.
const MORTGAGE_INCREASE: [f64; 34] = [
    0.0090, -0.0710, -0.0880, -0.0850, 0.0190, -0.0640, -0.0210, -0.0130, -0.0390, 0.0250,
    0.0390, -0.0740, -0.0340, -0.0880, 0.0020, 0.0130, 0.0830, -0.0050, -0.0370, -0.1670,
    -0.0700, -0.0290, -0.2080, 0.0880, 0.0440, -0.0630, -0.0360, 0.0990, 0.1460, -0.0870,
    -0.2240, -0.0370, 0.8180, 0.2180,
];

/// High-yield savings APY history, 1990-2023.
const SAVINGS_YIELD: [f64; 34] = [
    0.0784, 0.0569, 0.0343, 0.0302, 0.0421, 0.0583, 0.0530, 0.0546, 0.0535, 0.0497, 0.0624,
    0.0388, 0.0167, 0.0113, 0.0135, 0.0322, 0.0497, 0.0502, 0.0192, 0.0016, 0.0018, 0.0010,
    0.0014, 0.0011, 0.0009, 0.0013, 0.0039, 0.0100, 0.0183, 0.0214, 0.0036, 0.0008, 0.0165,
    0.0460,
];

/// S&P 500 total annual return, 1990-2023.
const MARKET_RETURN: [f64; 34] = [
    -0.0310, 0.3047, 0.0762, 0.1008, 0.0132, 0.3758, 0.2296, 0.3336, 0.2858, 0.2104, -0.0910,
    -0.1189, -0.2210, 0.2868, 0.1088, 0.0491, 0.1579, 0.0549, -0.3700, 0.2646, 0.1506, 0.0211,
    0.1600, 0.3239, 0.1369, 0.0138, 0.1196, 0.2183, -0.0438, 0.3149, 0.1840, 0.2871, -0.1811,
    0.2629,
];

/// Named historical-rate series, keyed by the rate-source names bills and
/// interest records reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    series: FxHashMap<String, HistoricalRates>,
}

impl RateTable {
    /// The built-in series the original data files reference.
    #[must_use]
    pub fn builtin() -> Self {
        let mut series = FxHashMap::default();
        let mut insert = |name: &'static str, samples: &'static [f64]| {
            series.insert(name.to_string(), HistoricalRates::new(name, samples));
        };
        insert("INFLATION", &INFLATION);
        insert("RAISE_RATE", &RAISE_RATE);
        insert("401K_LIMIT_INCREASE_RATE", &LIMIT_401K_INCREASE);
        insert("MORTGAGE_INCREASE_RATE", &MORTGAGE_INCREASE);
        insert("SAVINGS_YIELD", &SAVINGS_YIELD);
        insert("MARKET_RETURN", &MARKET_RETURN);
        Self { series }
    }

    pub fn insert(&mut self, rates: HistoricalRates) {
        self.series.insert(rates.name.to_string(), rates);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HistoricalRates> {
        self.series.get(name)
    }
}

/// IRS Uniform Lifetime Table mapping age to RMD divisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmdTable {
    pub entries: Vec<RmdTableEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RmdTableEntry {
    pub age: u8,
    pub divisor: f64,
}

impl RmdTable {
    /// IRS Uniform Lifetime Table (2024), ages 73-120.
    #[must_use]
    pub fn irs_uniform_lifetime() -> Self {
        const TABLE: [(u8, f64); 48] = [
            (73, 26.5),
            (74, 25.5),
            (75, 24.6),
            (76, 23.7),
            (77, 22.9),
            (78, 22.0),
            (79, 21.1),
            (80, 20.2),
            (81, 19.4),
            (82, 18.5),
            (83, 17.7),
            (84, 16.8),
            (85, 16.0),
            (86, 15.2),
            (87, 14.4),
            (88, 13.7),
            (89, 12.9),
            (90, 12.2),
            (91, 11.5),
            (92, 10.8),
            (93, 10.1),
            (94, 9.5),
            (95, 8.9),
            (96, 8.4),
            (97, 7.8),
            (98, 7.3),
            (99, 6.8),
            (100, 6.4),
            (101, 6.0),
            (102, 5.6),
            (103, 5.2),
            (104, 4.9),
            (105, 4.6),
            (106, 4.3),
            (107, 4.1),
            (108, 3.9),
            (109, 3.7),
            (110, 3.5),
            (111, 3.4),
            (112, 3.3),
            (113, 3.1),
            (114, 3.0),
            (115, 2.9),
            (116, 2.8),
            (117, 2.7),
            (118, 2.5),
            (119, 2.3),
            (120, 2.0),
        ];
        RmdTable {
            entries: TABLE
                .iter()
                .map(|&(age, divisor)| RmdTableEntry { age, divisor })
                .collect(),
        }
    }

    /// First age at which distributions are required.
    #[must_use]
    pub fn first_age(&self) -> Option<u8> {
        self.entries.iter().map(|e| e.age).min()
    }

    #[must_use]
    pub fn divisor_for_age(&self, age: u8) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.age == age)
            .map(|e| e.divisor)
    }
}

/// Whether a run uses configured literal rates or draws each rate fresh
/// from the historical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateMode {
    Fixed,
    MonteCarlo,
}

/// The read-only rate context injected into a run: historical series for
/// Monte Carlo sampling and the RMD divisor table. Constructed once and
/// passed explicitly; there is no hidden global table state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateContext {
    pub rates: RateTable,
    pub rmd: RmdTable,
}

impl Default for RateContext {
    fn default() -> Self {
        Self {
            rates: RateTable::builtin(),
            rmd: RmdTable::irs_uniform_lifetime(),
        }
    }
}
