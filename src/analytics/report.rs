use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::analytics::{DashboardAnalytics, MonthlyRevenue, ProductSales, RecentOrder};
use crate::orders::{Order, OrderStatus};

const RECENT_ORDER_LIMIT: usize = 5;
const TOP_PRODUCT_LIMIT: usize = 5;
const MONTH_WINDOW: i32 = 6;

/// Aggregate dashboard figures from every stored order
pub fn compute_analytics(orders: &[Order], total_products: usize, now: DateTime<Utc>) -> DashboardAnalytics {
    let billable: Vec<&Order> = orders
        .iter()
        .filter(|order| order.status != OrderStatus::Cancelled)
        .collect();

    let total_revenue: Decimal = billable.iter().map(|order| order.total).sum();

    let total_customers = orders
        .iter()
        .map(|order| order.customer.email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect::<HashSet<_>>()
        .len();

    let mut newest: Vec<&Order> = orders.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    let recent_orders = newest
        .into_iter()
        .take(RECENT_ORDER_LIMIT)
        .map(RecentOrder::from)
        .collect();

    DashboardAnalytics {
        total_orders: orders.len(),
        total_revenue,
        total_customers,
        total_products,
        recent_orders,
        top_products: top_products(&billable),
        monthly_revenue: monthly_revenue(&billable, now),
    }
}

fn top_products(orders: &[&Order]) -> Vec<ProductSales> {
    let mut sales: HashMap<&str, ProductSales> = HashMap::new();

    for order in orders {
        let mut counted: HashSet<&str> = HashSet::new();
        for line in &order.items {
            let entry = sales.entry(line.product_id.as_str()).or_insert_with(|| ProductSales {
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                units_sold: 0,
                order_count: 0,
                revenue: Decimal::ZERO,
            });
            entry.units_sold += i64::from(line.quantity);
            entry.revenue += line.line_total;
            // retail and wholesale lines of one product count as one order
            if counted.insert(line.product_id.as_str()) {
                entry.order_count += 1;
            }
        }
    }

    let mut ranked: Vec<ProductSales> = sales.into_values().collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| b.units_sold.cmp(&a.units_sold))
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(TOP_PRODUCT_LIMIT);
    ranked
}

fn monthly_revenue(orders: &[&Order], now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
    let current = month_index(now.year(), now.month());

    (0..MONTH_WINDOW)
        .rev()
        .map(|offset| {
            let index = current - offset;
            let (year, month) = (index.div_euclid(12), index.rem_euclid(12) as u32 + 1);

            let in_month: Vec<&&Order> = orders
                .iter()
                .filter(|order| month_index(order.created_at.year(), order.created_at.month()) == index)
                .collect();

            MonthlyRevenue {
                month: format!("{:04}-{:02}", year, month),
                label: NaiveDate::from_ymd_opt(year, month, 1)
                    .map(|date| date.format("%b %Y").to_string())
                    .unwrap_or_else(|| format!("{:04}-{:02}", year, month)),
                order_count: in_month.len(),
                revenue: in_month.iter().map(|order| order.total).sum(),
            }
        })
        .collect()
}

fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}
