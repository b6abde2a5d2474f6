//! Common regex patterns and keyword sets for receipt extraction.
//!
//! Digits are matched as ASCII `0-9` so that every captured run parses as a number.

use lazy_static::lazy_static;
use regex::Regex;

/// Words marking a line that carries the store name.
pub const STORE_INDICATORS: &[&str] = &["店名", "店舗", "ストア", "マート", "ショップ", "STORE", "SHOP"];

/// Native label for the date line; the English `date` is matched case-insensitively.
pub const DATE_LABEL: &str = "日付";
pub const DATE_LABEL_EN: &str = "date";

/// Native label for the totals line; the English `total` is matched case-insensitively.
pub const TOTAL_LABEL: &str = "合計";
pub const TOTAL_LABEL_EN: &str = "total";

lazy_static! {
    // Dates, in cascade order
    pub static ref FULL_DATE: Regex = Regex::new(
        r"[0-9]{4}[年/\-.]\s*[0-9]{1,2}[月/\-.]\s*[0-9]{1,2}日?"
    ).unwrap();

    pub static ref MONTH_DAY: Regex = Regex::new(
        r"[0-9]{1,2}[月/\-.]\s*[0-9]{1,2}日?"
    ).unwrap();

    pub static ref SHORT_YEAR_DATE: Regex = Regex::new(
        r"[0-9]{2}/[0-9]{1,2}/[0-9]{1,2}"
    ).unwrap();

    pub static ref ISO_DATE: Regex = Regex::new(
        r"[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}"
    ).unwrap();

    // A digit run followed by a date separator
    pub static ref DATE_LIKE: Regex = Regex::new(
        r"[0-9]+[/\-年月日.]"
    ).unwrap();

    // Store name separators: colon (ASCII or full-width) or a run of spaces
    pub static ref STORE_NAME_SEPARATOR: Regex = Regex::new(
        r"[:：]|\s{2,}"
    ).unwrap();

    // Lines that cannot be a store heading
    pub static ref NOT_STORE_NAME: Regex = Regex::new(
        r"(?i)合計|小計|税|円|日付|時間|レシート|領収書|¥|￥|[0-9]{1,2}/[0-9]{1,2}|^\s*[0-9]+\s*$"
    ).unwrap();

    // Total amounts
    pub static ref TOTAL_WITH_AMOUNT: Regex = Regex::new(
        r"(?i)(?:合計|小計|総額|お買上げ|計).*?([0-9][0-9,]*)"
    ).unwrap();

    pub static ref AMOUNT_WITH_CURRENCY: Regex = Regex::new(
        r"([0-9][0-9,]*)\s*(?:円|¥|￥)"
    ).unwrap();

    // Digit run with optional grouping commas
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"[0-9][0-9,]*"
    ).unwrap();
}
