// Synthetic sales data for exercising the pipeline.  One parquet file per
// run, schema matching what scripts/01_ingestion.sql expects.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use duckdb::Connection;
use itertools::Itertools;
use jiff::civil::{date, Date};
use jiff::{ToSpan, Zoned};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    Credit,
    Debit,
    Pix,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PaymentMethod::Credit => write!(f, "credit"),
            PaymentMethod::Debit => write!(f, "debit"),
            PaymentMethod::Pix => write!(f, "pix"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(PaymentMethod::Credit),
            "debit" => Ok(PaymentMethod::Debit),
            "pix" => Ok(PaymentMethod::Pix),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    pub sale_id: u32,
    pub customer_id: u32,
    pub product_id: u32,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
    pub sale_date: Date,
    pub payment_method: PaymentMethod,
}

pub struct SalesGenerator {
    pub seed: u64,
    pub count: u32,
    /// Sale dates fall in `[start, end)`.
    pub start: Date,
    pub end: Date,
}

impl Default for SalesGenerator {
    fn default() -> Self {
        SalesGenerator {
            seed: 42,
            count: 99,
            start: date(2024, 1, 1),
            end: Zoned::now().date(),
        }
    }
}

impl SalesGenerator {
    /// Draw `count` sales.  Same seed, same records.
    pub fn generate(&self) -> Vec<Sale> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let days = self.start.until(self.end).unwrap().get_days().max(1);

        let mut sales = Vec::with_capacity(self.count as usize);
        for sale_id in 1..=self.count {
            let sale_date = self
                .start
                .checked_add(rng.gen_range(0..days).days())
                .unwrap();
            let customer_id = rng.gen_range(1..=10);
            let product_id = rng.gen_range(1..=10);
            let quantity: u32 = rng.gen_range(1..=3);
            // unit price in [100.00, 5000.00], drawn in cents so the
            // two-decimal rounding is exact
            let unit_price = Decimal::new(rng.gen_range(10_000i64..=500_000), 2);
            let total_value = unit_price * Decimal::from(quantity);
            let payment_method = match rng.gen_range(0..3) {
                0 => PaymentMethod::Credit,
                1 => PaymentMethod::Debit,
                _ => PaymentMethod::Pix,
            };
            sales.push(Sale {
                sale_id,
                customer_id,
                product_id,
                quantity,
                total_value,
                sale_date,
                payment_method,
            });
        }
        sales
    }

    /// Write the records as one parquet file, replacing any existing file
    /// at `path`.  The rows are staged into an in-memory DuckDB table and
    /// copied out, so the parquet encoding itself is DuckDB's.
    pub fn write_parquet(&self, sales: &[Sale], path: &Path) -> Result<(), PipelineError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            r#"
CREATE TABLE sales (
    sale_id INTEGER NOT NULL,
    customer_id INTEGER NOT NULL,
    product_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    total_value DECIMAL(10,2) NOT NULL,
    sale_date DATE NOT NULL,
    payment_method VARCHAR NOT NULL
);
            "#,
        )?;

        let values = sales
            .iter()
            .map(|s| {
                format!(
                    "({}, {}, {}, {}, {}, '{}', '{}')",
                    s.sale_id,
                    s.customer_id,
                    s.product_id,
                    s.quantity,
                    s.total_value,
                    s.sale_date,
                    s.payment_method
                )
            })
            .join(",\n");
        conn.execute_batch(&format!("INSERT INTO sales VALUES\n{};", values))?;

        conn.execute_batch(&format!(
            "COPY sales TO '{}' (FORMAT PARQUET);",
            path.display()
        ))?;
        info!("wrote {} sales records to {}", sales.len(), path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    fn generator() -> SalesGenerator {
        SalesGenerator {
            seed: 42,
            count: 99,
            start: date(2024, 1, 1),
            end: date(2024, 12, 31),
        }
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let gen = generator();
        assert_eq!(gen.generate(), gen.generate());
    }

    #[test]
    fn different_seed_different_records() {
        let a = generator().generate();
        let b = SalesGenerator {
            seed: 43,
            ..generator()
        }
        .generate();
        assert_ne!(a, b);
    }

    #[test]
    fn record_bounds() {
        let gen = generator();
        let sales = gen.generate();
        assert_eq!(sales.len(), 99);
        for (i, s) in sales.iter().enumerate() {
            assert_eq!(s.sale_id, i as u32 + 1);
            assert!((1..=10).contains(&s.customer_id));
            assert!((1..=10).contains(&s.product_id));
            assert!((1..=3).contains(&s.quantity));
            assert!(s.sale_date >= gen.start && s.sale_date < gen.end);

            let unit_price = s.total_value / Decimal::from(s.quantity);
            assert!(unit_price >= dec!(100.00) && unit_price <= dec!(5000.00));
            assert_eq!(s.total_value, unit_price * Decimal::from(s.quantity));
            assert!(s.total_value.scale() <= 2);
        }
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let gen = generator();
        let sales = gen.generate();
        gen.write_parquet(&sales, &path).unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let n: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM read_parquet('{}')", path.display()),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(n, 99);

        let total: f64 = conn
            .query_row(
                &format!(
                    "SELECT SUM(total_value)::DOUBLE FROM read_parquet('{}')",
                    path.display()
                ),
                [],
                |row| row.get(0),
            )
            .unwrap();
        let expected: Decimal = sales.iter().map(|s| s.total_value).sum();
        assert!((total - expected.to_f64().unwrap()).abs() < 1e-6);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let gen = generator();
        gen.write_parquet(&gen.generate(), &path).unwrap();
        let small = SalesGenerator {
            count: 5,
            ..generator()
        };
        small.write_parquet(&small.generate(), &path).unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let n: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM read_parquet('{}')", path.display()),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(n, 5);
    }
}
