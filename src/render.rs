//! Rendering-surface contract and the two built-in surfaces.
//!
//! The dashboard core only *consumes* a rendering surface: it hands each
//! aggregate over as an opaque tabular result plus chart metadata and takes
//! no part in visual encoding. `ConsoleSurface` prints human output with
//! light color; `JsonSurface` accumulates everything into a single robot
//! payload, mirroring the human/robot output split used elsewhere in the
//! tooling.

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use crate::aggregate::Kpis;
use crate::pipeline::types::EnrichedSale;

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// How a view wants to be drawn. Metadata only; surfaces may ignore any of
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    HorizontalBar,
    Treemap,
}

/// Chart metadata: type, axis bindings, color encoding, title.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub x: &'static str,
    pub y: &'static str,
    pub color: Option<&'static str>,
}

/// A rendering surface. Rows arrive as a JSON array of flat objects, the
/// opaque tabular contract.
pub trait Surface {
    fn kpis(&mut self, kpis: &Kpis) -> Result<()>;
    fn chart(&mut self, spec: &ChartSpec, rows: Value) -> Result<()>;
    /// Raw filtered rows preview (already truncated by the caller).
    fn preview(&mut self, rows: &[&EnrichedSale]) -> Result<()>;
    /// Called once after all views; surfaces that buffer flush here.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Console surface
// ---------------------------------------------------------------------------

/// Plain terminal output: a title per view, one line per row.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    fn print_row(value: &Value) {
        if let Value::Object(map) = value {
            let line = map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{k}={s}"),
                    other => format!("{k}={other}"),
                })
                .collect::<Vec<_>>()
                .join("  ");
            println!("  {line}");
        } else {
            println!("  {value}");
        }
    }
}

impl Surface for ConsoleSurface {
    fn kpis(&mut self, kpis: &Kpis) -> Result<()> {
        println!("{}", "Key performance indicators".bold());
        println!("  total sales:      {:.2}", kpis.total_sales);
        println!("  total profit:     {:.2}", kpis.total_profit);
        println!("  unique customers: {}", kpis.unique_customers);
        println!("  unique orders:    {}", kpis.unique_orders);
        Ok(())
    }

    fn chart(&mut self, spec: &ChartSpec, rows: Value) -> Result<()> {
        println!();
        println!("{}", spec.title.bold());
        if let Value::Array(items) = &rows {
            for item in items {
                Self::print_row(item);
            }
        }
        Ok(())
    }

    fn preview(&mut self, rows: &[&EnrichedSale]) -> Result<()> {
        println!();
        println!("{}", "Filtered rows (preview)".bold());
        for row in rows {
            println!(
                "  {}  {}  {}  qty={}  amount={:.2}  profit={:.2}",
                row.order_number.as_deref().unwrap_or("-"),
                row.order_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
                row.product_name.as_deref().unwrap_or("-"),
                row.quantity,
                row.sales_amount,
                row.total_profit,
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON surface
// ---------------------------------------------------------------------------

/// Buffers every view and emits one JSON document on `finish`.
#[derive(Debug, Default)]
pub struct JsonSurface {
    views: serde_json::Map<String, Value>,
}

impl Surface for JsonSurface {
    fn kpis(&mut self, kpis: &Kpis) -> Result<()> {
        self.views
            .insert("kpis".into(), serde_json::to_value(kpis)?);
        Ok(())
    }

    fn chart(&mut self, spec: &ChartSpec, rows: Value) -> Result<()> {
        self.views.insert(spec.id.to_string(), rows);
        Ok(())
    }

    fn preview(&mut self, rows: &[&EnrichedSale]) -> Result<()> {
        self.views
            .insert("preview".into(), serde_json::to_value(rows)?);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let doc = Value::Object(std::mem::take(&mut self.views));
        println!("{}", serde_json::to_string_pretty(&doc)?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_surface_collects_views_by_chart_id() {
        let mut surface = JsonSurface::default();
        let spec = ChartSpec {
            id: "profit_by_country",
            title: "Total Profit by Country",
            kind: ChartKind::Bar,
            x: "country",
            y: "total_profit",
            color: None,
        };
        surface
            .chart(&spec, serde_json::json!([{"country": "BR"}]))
            .unwrap();
        surface.kpis(&Kpis::default()).unwrap();
        assert!(surface.views.contains_key("profit_by_country"));
        assert!(surface.views.contains_key("kpis"));
    }
}
