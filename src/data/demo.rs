//! Built-in sample datasets with preset schemas.
//!
//! Rows are generated from a fixed seed so a template always loads the same
//! data.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use super::schema::{ColumnType, Schema};
use super::value::{Dataset, Row, Value};

#[derive(Debug, Clone, Copy)]
pub struct DemoTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    build: fn(&mut SimpleRng) -> Vec<Row>,
    columns: &'static [(&'static str, ColumnType)],
}

impl DemoTemplate {
    /// Generate the rows and attach the preset schema.
    pub fn dataset(&self) -> Dataset {
        let mut rng = SimpleRng::new(seed_for(self.id));
        let rows = (self.build)(&mut rng);
        let columns: Vec<String> = self.columns.iter().map(|(c, _)| c.to_string()).collect();
        let schema: Schema = self.columns.iter().copied().collect();
        Dataset::new(rows, columns, schema)
    }
}

pub const TEMPLATES: &[DemoTemplate] = &[
    DemoTemplate {
        id: "sales",
        name: "Sales Dashboard",
        description: "Orders by region and product with revenue",
        build: sales_rows,
        columns: &[
            ("date", ColumnType::Date),
            ("region", ColumnType::Category),
            ("product", ColumnType::Category),
            ("units", ColumnType::Number),
            ("revenue", ColumnType::Number),
        ],
    },
    DemoTemplate {
        id: "web-traffic",
        name: "Website Analytics",
        description: "Daily sessions by channel and device",
        build: traffic_rows,
        columns: &[
            ("date", ColumnType::Date),
            ("channel", ColumnType::Category),
            ("device", ColumnType::Category),
            ("sessions", ColumnType::Number),
            ("bounce_rate", ColumnType::Number),
        ],
    },
    DemoTemplate {
        id: "employees",
        name: "HR Overview",
        description: "Headcount by department, level and salary",
        build: employee_rows,
        columns: &[
            ("department", ColumnType::Category),
            ("level", ColumnType::Category),
            ("salary", ColumnType::Number),
            ("hired", ColumnType::Date),
        ],
    },
    DemoTemplate {
        id: "inventory",
        name: "Inventory Tracker",
        description: "Stock levels per warehouse and category",
        build: inventory_rows,
        columns: &[
            ("warehouse", ColumnType::Category),
            ("category", ColumnType::Category),
            ("stock", ColumnType::Number),
            ("unit_cost", ColumnType::Number),
            ("restocked", ColumnType::Date),
        ],
    },
];

/// Look a template up by id.
pub fn find(id: &str) -> Option<&'static DemoTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

fn seed_for(id: &str) -> u64 {
    id.bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x100_0000_01b3))
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn day(offset: u64) -> NaiveDateTime {
    start_date()
        .checked_add_days(Days::new(offset))
        .unwrap_or_else(start_date)
        .and_time(NaiveTime::MIN)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn record(cells: impl IntoIterator<Item = (&'static str, Value)>) -> Row {
    cells
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn sales_rows(rng: &mut SimpleRng) -> Vec<Row> {
    const REGIONS: &[&str] = &["North", "South", "East", "West"];
    const PRODUCTS: &[(&str, f64)] = &[
        ("Laptop", 1200.0),
        ("Monitor", 300.0),
        ("Keyboard", 80.0),
        ("Headset", 150.0),
        ("Dock", 220.0),
    ];
    (0..120)
        .map(|i| {
            let (product, price) = *rng.pick(PRODUCTS);
            let units = 1 + rng.below(20);
            record([
                ("date", Value::DateTime(day(i / 2))),
                ("region", Value::from(*rng.pick(REGIONS))),
                ("product", Value::from(product)),
                ("units", Value::Number(units as f64)),
                (
                    "revenue",
                    Value::Number(round2(units as f64 * price * rng.range(0.85, 1.05))),
                ),
            ])
        })
        .collect()
}

fn traffic_rows(rng: &mut SimpleRng) -> Vec<Row> {
    const CHANNELS: &[&str] = &["Organic", "Paid", "Social", "Email", "Referral"];
    const DEVICES: &[&str] = &["Desktop", "Mobile", "Tablet"];
    (0..90)
        .map(|i| {
            let weekday_boost = if i % 7 < 5 { 1.0 } else { 0.6 };
            record([
                ("date", Value::DateTime(day(i))),
                ("channel", Value::from(*rng.pick(CHANNELS))),
                ("device", Value::from(*rng.pick(DEVICES))),
                (
                    "sessions",
                    Value::Number((rng.gauss(1500.0, 300.0) * weekday_boost).round().max(0.0)),
                ),
                (
                    "bounce_rate",
                    Value::Number(round2(rng.range(0.25, 0.7))),
                ),
            ])
        })
        .collect()
}

fn employee_rows(rng: &mut SimpleRng) -> Vec<Row> {
    const DEPARTMENTS: &[&str] = &["Engineering", "Sales", "Marketing", "Support", "Finance"];
    const LEVELS: &[(&str, f64)] = &[
        ("Junior", 55_000.0),
        ("Mid", 80_000.0),
        ("Senior", 110_000.0),
        ("Lead", 140_000.0),
    ];
    (0..80)
        .map(|_| {
            let (level, base) = *rng.pick(LEVELS);
            record([
                ("department", Value::from(*rng.pick(DEPARTMENTS))),
                ("level", Value::from(level)),
                ("salary", Value::Number(rng.gauss(base, base * 0.08).round())),
                ("hired", Value::DateTime(day(rng.below(365)))),
            ])
        })
        .collect()
}

fn inventory_rows(rng: &mut SimpleRng) -> Vec<Row> {
    const WAREHOUSES: &[&str] = &["Berlin", "Chicago", "Osaka"];
    const CATEGORIES: &[&str] = &["Electronics", "Furniture", "Apparel", "Grocery"];
    (0..60)
        .map(|_| {
            record([
                ("warehouse", Value::from(*rng.pick(WAREHOUSES))),
                ("category", Value::from(*rng.pick(CATEGORIES))),
                ("stock", Value::Number(rng.below(500) as f64)),
                ("unit_cost", Value::Number(round2(rng.range(2.0, 250.0)))),
                ("restocked", Value::DateTime(day(rng.below(180)))),
            ])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Deterministic RNG
// ---------------------------------------------------------------------------

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}
