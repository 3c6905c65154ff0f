// Reporting sink: renders already-computed database results to chart and
// spreadsheet files.  Queries here are read-only and fail loudly when a
// table or view the scripts were supposed to create is missing.

use std::path::Path;

use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection;
use jiff::civil::Date;
use jiff::{Timestamp, ToSpan};
use log::info;
use plotly::common::{Mode, Orientation, Title};
use plotly::{Bar, Layout, Plot, Scatter};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::PipelineError;

pub const REVENUE_BY_CATEGORY_FILE: &str = "revenue_by_category.html";
pub const MONTHLY_REVENUE_FILE: &str = "monthly_revenue_comparison.html";
pub const TOP_CUSTOMERS_FILE: &str = "top_customers.html";
pub const SPREADSHEET_FILE: &str = "sales_report.xlsx";

/// The four `SELECT * FROM <table>` exports and the sheet each one lands on.
const SHEETS: [(&str, &str); 4] = [
    ("detailed_sales", "Detailed Sales"),
    ("monthly_sales_metrics", "Monthly Metrics"),
    ("product_ranking", "Product Ranking"),
    ("customer_analysis", "Customer Analysis"),
];

/// Render the three fixed charts into `output_dir`.
pub fn render_charts(conn: &Connection, output_dir: &Path) -> Result<(), PipelineError> {
    revenue_by_category(conn, output_dir)?;
    monthly_revenue_comparison(conn, output_dir)?;
    top_customers(conn, output_dir)?;
    Ok(())
}

fn revenue_by_category(conn: &Connection, output_dir: &Path) -> Result<(), PipelineError> {
    let mut stmt = conn.prepare(
        r#"
SELECT category, SUM(total_value)::DOUBLE AS revenue
FROM detailed_sales
GROUP BY category
ORDER BY revenue DESC;
    "#,
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<usize, String>(0)?, row.get::<usize, f64>(1)?))
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    let (categories, revenues): (Vec<String>, Vec<f64>) = rows.into_iter().unzip();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(categories, revenues));
    plot.set_layout(Layout::new().title(Title::with_text("Revenue by Product Category")));
    let path = output_dir.join(REVENUE_BY_CATEGORY_FILE);
    plot.write_html(&path);
    info!("wrote {}", path.display());
    Ok(())
}

fn monthly_revenue_comparison(conn: &Connection, output_dir: &Path) -> Result<(), PipelineError> {
    let mut stmt = conn.prepare(
        r#"
SELECT
    month,
    SUM(CASE WHEN year = 2023 THEN total_value ELSE 0 END)::DOUBLE AS revenue_2023,
    SUM(CASE WHEN year = 2024 THEN total_value ELSE 0 END)::DOUBLE AS revenue_2024
FROM detailed_sales
GROUP BY month
ORDER BY month;
    "#,
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<usize, i64>(0)?,
                row.get::<usize, f64>(1)?,
                row.get::<usize, f64>(2)?,
            ))
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;

    let months: Vec<i64> = rows.iter().map(|r| r.0).collect();
    let revenue_2023: Vec<f64> = rows.iter().map(|r| r.1).collect();
    let revenue_2024: Vec<f64> = rows.iter().map(|r| r.2).collect();

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(months.clone(), revenue_2023)
            .mode(Mode::LinesMarkers)
            .name("2023"),
    );
    plot.add_trace(
        Scatter::new(months, revenue_2024)
            .mode(Mode::LinesMarkers)
            .name("2024"),
    );
    plot.set_layout(Layout::new().title(Title::with_text("Monthly Revenue: 2023 vs 2024")));
    let path = output_dir.join(MONTHLY_REVENUE_FILE);
    plot.write_html(&path);
    info!("wrote {}", path.display());
    Ok(())
}

fn top_customers(conn: &Connection, output_dir: &Path) -> Result<(), PipelineError> {
    let mut stmt = conn.prepare(
        r#"
SELECT customer_name, SUM(total_value)::DOUBLE AS total_spent
FROM detailed_sales
GROUP BY customer_name
ORDER BY total_spent DESC
LIMIT 5;
    "#,
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<usize, String>(0)?, row.get::<usize, f64>(1)?))
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    let (names, spent): (Vec<String>, Vec<f64>) = rows.into_iter().unzip();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(spent, names).orientation(Orientation::Horizontal));
    plot.set_layout(Layout::new().title(Title::with_text("Top 5 Customers by Spend")));
    let path = output_dir.join(TOP_CUSTOMERS_FILE);
    plot.write_html(&path);
    info!("wrote {}", path.display());
    Ok(())
}

/// Export the four result tables to the four named sheets of one workbook.
pub fn export_spreadsheet(conn: &Connection, output_dir: &Path) -> Result<(), PipelineError> {
    let mut workbook = Workbook::new();
    for (table, sheet_name) in SHEETS {
        let ws = workbook.add_worksheet();
        ws.set_name(sheet_name)?;
        write_table(conn, ws, table)?;
    }
    let path = output_dir.join(SPREADSHEET_FILE);
    workbook.save(&path)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Dump `SELECT * FROM table` onto a sheet: header row from the table's
/// column names, then one row per record.
fn write_table(conn: &Connection, ws: &mut Worksheet, table: &str) -> Result<(), PipelineError> {
    let mut stmt = conn.prepare(&format!("DESCRIBE {};", table))?;
    let names = stmt
        .query_map([], |row| row.get::<usize, String>(0))?
        .collect::<duckdb::Result<Vec<_>>>()?;
    for (c, name) in names.iter().enumerate() {
        ws.write_string(0, c as u16, name)?;
    }

    let mut stmt = conn.prepare(&format!("SELECT * FROM {};", table))?;
    let mut rows = stmt.query([])?;
    let mut r: u32 = 1;
    while let Some(row) = rows.next()? {
        for c in 0..names.len() {
            write_cell(ws, r, c as u16, row.get_ref(c)?)?;
        }
        r += 1;
    }
    Ok(())
}

fn write_cell(
    ws: &mut Worksheet,
    r: u32,
    c: u16,
    value: ValueRef,
) -> Result<(), PipelineError> {
    match value {
        ValueRef::Null => {}
        ValueRef::Boolean(v) => {
            ws.write_string(r, c, if v { "true" } else { "false" })?;
        }
        ValueRef::TinyInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::SmallInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::Int(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::BigInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::HugeInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::UTinyInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::USmallInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::UInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::UBigInt(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::Float(v) => {
            ws.write_number(r, c, v as f64)?;
        }
        ValueRef::Double(v) => {
            ws.write_number(r, c, v)?;
        }
        ValueRef::Decimal(v) => {
            ws.write_number(r, c, v.to_f64().unwrap_or(f64::NAN))?;
        }
        ValueRef::Text(v) => {
            ws.write_string(r, c, String::from_utf8_lossy(v).as_ref())?;
        }
        ValueRef::Date32(v) => {
            // days since 1970-01-01; 719528 is that epoch in days from year 0
            let day = Date::ZERO.checked_add((719_528 + v).days()).unwrap();
            ws.write_string(r, c, &day.to_string())?;
        }
        ValueRef::Timestamp(unit, v) => {
            let micros = match unit {
                TimeUnit::Second => v * 1_000_000,
                TimeUnit::Millisecond => v * 1_000,
                TimeUnit::Microsecond => v,
                TimeUnit::Nanosecond => v / 1_000,
            };
            let ts = Timestamp::from_microsecond(micros).unwrap();
            ws.write_string(r, c, &ts.to_string())?;
        }
        other => {
            ws.write_string(r, c, &format!("{:?}", other))?;
        }
    }
    Ok(())
}
