//! Text and JSON rendering of one `(bucket, month)` view of a session.

use anyhow::Result;
use ledger_core::classifier::classify;
use ledger_core::formatting::{format_currency, format_expense, percentage};
use ledger_core::models::{Bucket, MonthCode, Transaction};
use ledger_data::query::MonthSummary;
use ledger_runtime::session::{EmptyReason, SessionData, SessionState};
use serde_json::{json, Value};
use unicode_width::UnicodeWidthChar;

const TITLE: &str = "2026 호두네 가계부";
const LOADING_MESSAGE: &str = "데이터 불러오는 중... (잠시만 기다려주세요)";
const NO_DATA_MESSAGE: &str = "데이터가 없습니다.";
const NOT_CONFIGURED_HINT: &str = "Apps Script URL을 설정했는지 확인해주세요! (--source-url)";
const NOTHING_THIS_MONTH: &str = "내역이 없어요 🍃";

/// Display width of the description column.
const DESCRIPTION_WIDTH: usize = 24;
const DETAIL_WIDTH: usize = 18;
const RULE_WIDTH: usize = 60;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Json,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Self {
        match value {
            "json" => ReportFormat::Json,
            _ => ReportFormat::Table,
        }
    }
}

/// Render `state` narrowed to `bucket` and `month`.
pub fn render(
    state: &SessionState,
    bucket: Bucket,
    month: MonthCode,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Table => Ok(render_table(state, bucket, month)),
        ReportFormat::Json => render_json(state, bucket, month),
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

fn render_table(state: &SessionState, bucket: Bucket, month: MonthCode) -> String {
    let data = match state {
        SessionState::Loading => return format!("{LOADING_MESSAGE}\n"),
        SessionState::Ready(data) => data,
    };

    if let SessionData::Empty(reason) = data {
        let mut out = format!("{NO_DATA_MESSAGE}\n");
        match reason {
            EmptyReason::NotConfigured => out.push_str(&format!("{NOT_CONFIGURED_HINT}\n")),
            other => out.push_str(&format!("({other})\n")),
        }
        return out;
    }

    let result = state.query(bucket, month);
    let mut out = String::new();

    out.push_str(&format!("{TITLE}\n"));
    out.push_str(&format!(
        "{} · {}   {} 지출\n",
        month.label(),
        bucket.title(),
        format_currency(result.total)
    ));
    out.push_str(&format!("{}\n", "─".repeat(RULE_WIDTH)));

    if result.is_empty() {
        out.push_str(&format!("{NOTHING_THIS_MONTH}\n"));
    } else {
        for tx in &result.transactions {
            out.push_str(&format_row(tx));
            out.push('\n');
        }
    }

    out.push_str(&format!("{}\n", "─".repeat(RULE_WIDTH)));
    out.push_str(&format_summary(&state.summarize(month)));
    out.push('\n');
    out
}

/// `icon  description  date • payment  -$amount`
fn format_row(tx: &Transaction) -> String {
    let icon = classify(&tx.category).icon.glyph();
    let detail = format!("{} • {}", tx.date, tx.payment_method);
    format!(
        "{}  {}  {}  {:>10}",
        icon,
        pad_to_width(&tx.description, DESCRIPTION_WIDTH),
        pad_to_width(&detail, DETAIL_WIDTH),
        format_expense(tx.amount)
    )
}

/// Per-bucket totals with their share of the month.
fn format_summary(summary: &MonthSummary) -> String {
    summary
        .buckets
        .iter()
        .map(|b| {
            format!(
                "{} {} ({}%)",
                b.bucket.title(),
                format_currency(b.total),
                percentage(b.total, summary.total, 0)
            )
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Pad or cut `text` to exactly `width` terminal columns.
fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }

    out.push_str(&" ".repeat(width - used));
    out
}

// ── JSON ──────────────────────────────────────────────────────────────────────

fn render_json(state: &SessionState, bucket: Bucket, month: MonthCode) -> Result<String> {
    let status = match state {
        SessionState::Loading => json!({ "state": "loading" }),
        SessionState::Ready(SessionData::Loaded(_)) => json!({ "state": "ready" }),
        SessionState::Ready(SessionData::Empty(reason)) => {
            json!({ "state": "empty", "reason": reason.to_string() })
        }
    };

    let result = state.query(bucket, month);
    let transactions = result
        .transactions
        .iter()
        .map(|tx| transaction_json(tx))
        .collect::<Result<Vec<_>>>()?;

    let mut report = json!({
        "month": month,
        "monthLabel": month.label(),
        "bucket": bucket,
        "total": result.total,
        "transactions": transactions,
        "summary": state.summarize(month),
    });

    if let (Value::Object(report), Value::Object(status)) = (&mut report, status) {
        report.extend(status);
    }

    Ok(serde_json::to_string_pretty(&report)?)
}

/// A transaction plus its display tokens.
fn transaction_json(tx: &Transaction) -> Result<Value> {
    let mut value = serde_json::to_value(tx)?;
    if let Value::Object(map) = &mut value {
        let classification = classify(&tx.category);
        map.insert("icon".to_string(), json!(classification.icon.glyph()));
        map.insert(
            "color".to_string(),
            json!(classification.color_token.hex()),
        );
    }
    Ok(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_data::store::LedgerSnapshot;
    use std::sync::Arc;

    fn march() -> MonthCode {
        MonthCode::new(3).unwrap()
    }

    fn ready_state() -> SessionState {
        let snapshot = LedgerSnapshot::load(&[
            json!({
                "month": "03월", "일자": "2026-03-15", "내용": "Coffee",
                "분류": "Dining", "금액": "4.5", "지출방식": "Card",
            }),
            json!({
                "month": "03월", "일자": "2026-03-20", "내용": "Kibble",
                "분류": "Pet", "금액": 1200, "지출방식": "Cash",
            }),
        ]);
        SessionState::Ready(SessionData::Loaded(Arc::new(snapshot)))
    }

    #[test]
    fn test_loading_message() {
        let out = render(&SessionState::Loading, Bucket::All, march(), ReportFormat::Table).unwrap();
        assert!(out.contains("불러오는 중"));
    }

    #[test]
    fn test_not_configured_message() {
        let state = SessionState::Ready(SessionData::Empty(EmptyReason::NotConfigured));
        let out = render(&state, Bucket::All, march(), ReportFormat::Table).unwrap();
        assert!(out.contains(NO_DATA_MESSAGE));
        assert!(out.contains("--source-url"));
    }

    #[test]
    fn test_source_failure_message_includes_reason() {
        let state = SessionState::Ready(SessionData::Empty(EmptyReason::SourceFailed(
            "timed out".to_string(),
        )));
        let out = render(&state, Bucket::All, march(), ReportFormat::Table).unwrap();
        assert!(out.contains(NO_DATA_MESSAGE));
        assert!(out.contains("timed out"));
    }

    #[test]
    fn test_table_lists_rows_and_total() {
        let out = render(&ready_state(), Bucket::All, march(), ReportFormat::Table).unwrap();

        assert!(out.contains("03월 · 전체"));
        assert!(out.contains("$1,204.50 지출"));
        assert!(out.contains("🥗"));
        assert!(out.contains("Coffee"));
        assert!(out.contains("03-15 • Card"));
        assert!(out.contains("-$4.50"));
        assert!(out.contains("-$1,200.00"));
    }

    #[test]
    fn test_table_narrowed_to_bucket() {
        let out = render(&ready_state(), Bucket::Pet, march(), ReportFormat::Table).unwrap();
        assert!(out.contains("Kibble"));
        assert!(!out.contains("Coffee"));
        assert!(out.contains("$1,200.00 지출"));
    }

    #[test]
    fn test_table_nothing_this_month() {
        let out = render(
            &ready_state(),
            Bucket::All,
            MonthCode::new(7).unwrap(),
            ReportFormat::Table,
        )
        .unwrap();
        assert!(out.contains(NOTHING_THIS_MONTH));
        assert!(out.contains("$0.00 지출"));
    }

    #[test]
    fn test_summary_footer() {
        let out = render(&ready_state(), Bucket::All, march(), ReportFormat::Table).unwrap();
        assert!(out.contains("식비 $4.50 (0%)"));
        assert!(out.contains("호두 $1,200.00 (100%)"));
        assert!(out.contains("기타 $0.00 (0%)"));
    }

    #[test]
    fn test_json_report() {
        let out = render(&ready_state(), Bucket::Food, march(), ReportFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["state"], "ready");
        assert_eq!(value["month"], "03");
        assert_eq!(value["monthLabel"], "03월");
        assert_eq!(value["bucket"], "food");
        assert_eq!(value["total"], 4.5);
        assert_eq!(value["transactions"][0]["description"], "Coffee");
        assert_eq!(value["transactions"][0]["paymentMethod"], "Card");
        assert_eq!(value["transactions"][0]["icon"], "🥗");
        assert_eq!(value["transactions"][0]["color"], "#FFEDB2");
        assert_eq!(value["summary"]["buckets"][1]["total"], 1200.0);
    }

    #[test]
    fn test_json_report_when_empty() {
        let state = SessionState::Ready(SessionData::Empty(EmptyReason::NoRecords));
        let out = render(&state, Bucket::All, march(), ReportFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["state"], "empty");
        assert_eq!(value["reason"], "the source returned no records");
        assert_eq!(value["total"], 0.0);
        assert!(value["transactions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_pad_to_width_handles_wide_chars() {
        assert_eq!(pad_to_width("abc", 5), "abc  ");
        assert_eq!(pad_to_width("가나다", 5), "가나 ");
        assert_eq!(pad_to_width("abcdef", 3), "abc");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ReportFormat::parse("json"), ReportFormat::Json);
        assert_eq!(ReportFormat::parse("table"), ReportFormat::Table);
    }
}
