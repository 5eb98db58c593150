//! Roster synthesis — turns a company's employee list into the fixed-column
//! regulatory report table.
//!
//! The table is 17 base columns followed by a 7-column block for each of the
//! 12 months of the reference year. All values are strings; the workbook
//! writer forces text cells so leading zeros and formatted numbers survive.

use chrono::NaiveDate;

use crate::models::{Company, Employee, Severity};

// ────────────────────────────────────────────────────────────────────────────
// Column layout
// ────────────────────────────────────────────────────────────────────────────

pub const BASE_COLUMNS: usize = 17;
pub const MONTH_COLUMNS: usize = 7;
pub const TOTAL_COLUMNS: usize = BASE_COLUMNS + MONTH_COLUMNS * 12;

const BASE_HEADERS: [&str; BASE_COLUMNS] = [
    "연번",
    "성명",
    "생년월일",
    "휴대전화",
    "사업장명",
    "사업자등록번호",
    "대표자",
    "소재지",
    "장애유형",
    "중증여부",
    "입사일",
    "퇴사일",
    "월평균임금",
    "소정근로시간",
    "고용보험",
    "최저임금적용",
    "비고",
];

const MONTH_FIELDS: [&str; MONTH_COLUMNS] = [
    "재직여부",
    "임금",
    "소정근로시간",
    "최저임금이상",
    "고용보험",
    "이중산입",
    "비고",
];

// Sentinel values written into a month block when the contract covers it.
const HOURS_SENTINEL: &str = "209";
const FLAG_YES: &str = "Y";
const DOUBLE_COUNT_DEFAULT: &str = "N";

/// Everything row synthesis needs besides the employees themselves.
#[derive(Debug, Clone)]
pub struct RosterContext {
    pub company: Company,
    /// Year whose 12 months the month blocks are tested against.
    pub reference_year: i32,
    /// Export date; future contract end dates are blanked relative to this.
    pub today: NaiveDate,
}

/// Builds the single header row: base headers, then "1월 재직여부" .. "12월 비고".
pub fn header_row() -> Vec<String> {
    let mut header: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
    for month in 1..=12u32 {
        for field in MONTH_FIELDS {
            header.push(format!("{month}월 {field}"));
        }
    }
    header
}

/// Synthesizes one row per employee. The output is guaranteed to be
/// `employees.len()` rows of exactly [`TOTAL_COLUMNS`] cells each.
pub fn synthesize_rows(ctx: &RosterContext, employees: &[Employee]) -> Vec<Vec<String>> {
    employees
        .iter()
        .enumerate()
        .map(|(i, e)| synthesize_row(ctx, i + 1, e))
        .collect()
}

fn synthesize_row(ctx: &RosterContext, index: usize, employee: &Employee) -> Vec<String> {
    let window = parse_contract_period(&employee.contract_period);
    let salary = extract_digits(&employee.monthly_salary);

    let mut row = Vec::with_capacity(TOTAL_COLUMNS);
    row.push(index.to_string());
    row.push(employee.name.clone());
    row.push(employee.birth_date.clone());
    row.push(employee.phone.clone());
    row.push(ctx.company.name.clone());
    row.push(ctx.company.registration_number.clone());
    row.push(ctx.company.ceo_name.clone());
    row.push(ctx.company.address.clone());
    row.push(disability_type_code(&employee.disability_type).to_string());
    row.push(severity_flag(employee.severity).to_string());
    row.push(window.start_text.clone());
    row.push(window.display_end(ctx.today));
    row.push(salary.clone());
    row.push(HOURS_SENTINEL.to_string());
    row.push(FLAG_YES.to_string());
    row.push(FLAG_YES.to_string());
    row.push(String::new());

    for month in 1..=12u32 {
        if covers_month(&window, ctx.reference_year, month) {
            row.push("1".to_string());
            row.push(salary.clone());
            row.push(HOURS_SENTINEL.to_string());
            row.push(FLAG_YES.to_string());
            row.push(FLAG_YES.to_string());
            row.push(DOUBLE_COUNT_DEFAULT.to_string());
            row.push(String::new());
        } else {
            row.push(String::new());
            row.push("0".to_string());
            for _ in 0..MONTH_COLUMNS - 2 {
                row.push(String::new());
            }
        }
    }

    debug_assert_eq!(row.len(), TOTAL_COLUMNS);
    row
}

// ────────────────────────────────────────────────────────────────────────────
// Per-field derivations
// ────────────────────────────────────────────────────────────────────────────

/// Statutory disability type codes. An unmapped type name passes through
/// unchanged so manually entered values are never silently dropped.
pub fn disability_type_code(type_name: &str) -> &str {
    match type_name.trim() {
        "지체장애" => "01",
        "뇌병변장애" => "02",
        "시각장애" => "03",
        "청각장애" => "04",
        "언어장애" => "05",
        "지적장애" => "06",
        "자폐성장애" => "07",
        "정신장애" => "08",
        "신장장애" => "09",
        "심장장애" => "10",
        "호흡기장애" => "11",
        "간장애" => "12",
        "안면장애" => "13",
        "장루·요루장애" => "14",
        "뇌전증장애" => "15",
        other => other,
    }
}

fn severity_flag(severity: Severity) -> &'static str {
    match severity {
        Severity::Severe => "1",
        Severity::Mild => "0",
    }
}

/// Reduces a formatted currency string to its digits: "월 2,500,000원" → "2500000".
pub fn extract_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// A parsed contract window. `start_text`/`end_text` keep the compacted
/// (punctuation-stripped) substrings even when they fail to parse as dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractWindow {
    pub start_text: String,
    pub end_text: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ContractWindow {
    /// End date for display: blanked when it lies strictly after `today`
    /// (an ongoing contract has no 퇴사일 yet).
    pub fn display_end(&self, today: NaiveDate) -> String {
        match self.end {
            Some(end) if end > today => String::new(),
            _ => self.end_text.clone(),
        }
    }
}

/// Parses "2025.01.01 ~ 2026.12.31" by splitting on `~` and stripping
/// punctuation from each side. A missing or malformed side leaves the
/// corresponding date as `None` while keeping whatever text was there.
pub fn parse_contract_period(raw: &str) -> ContractWindow {
    let mut parts = raw.splitn(2, '~');
    let start_text = compact_date(parts.next().unwrap_or_default());
    let end_text = compact_date(parts.next().unwrap_or_default());

    ContractWindow {
        start: NaiveDate::parse_from_str(&start_text, "%Y%m%d").ok(),
        end: NaiveDate::parse_from_str(&end_text, "%Y%m%d").ok(),
        start_text,
        end_text,
    }
}

fn compact_date(part: &str) -> String {
    part.chars().filter(char::is_ascii_digit).collect()
}

/// Tests whether the contract window overlaps month `month` of `year`:
/// the contract starts no later than the month's last day and, when it has an
/// end date, ends no earlier than the month's first day. A window without a
/// parsed start never covers anything.
pub fn covers_month(window: &ContractWindow, year: i32, month: u32) -> bool {
    let Some(start) = window.start else {
        return false;
    };
    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return false;
    };
    let last_day = last_day_of_month(year, month);

    if start > last_day {
        return false;
    }
    match window.end {
        Some(end) => end >= first_day,
        None => true,
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // Month 1..=12 always has a first-of-next-month.
    first_of_next
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_company() -> Company {
        Company {
            id: Uuid::new_v4(),
            name: "한빛산업".to_string(),
            registration_number: "123-45-67890".to_string(),
            ceo_name: "이정수".to_string(),
            address: "서울특별시 마포구".to_string(),
        }
    }

    fn make_employee(contract_period: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "김영희".to_string(),
            phone: "010-1234-5678".to_string(),
            birth_date: "1990.05.21".to_string(),
            contract_period: contract_period.to_string(),
            disability_type: "지체장애".to_string(),
            severity: Severity::Severe,
            monthly_salary: "월 2,500,000원".to_string(),
            document_url: None,
            certificate_url: None,
        }
    }

    fn make_context() -> RosterContext {
        RosterContext {
            company: make_company(),
            reference_year: 2025,
            today: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        }
    }

    // ── table shape ─────────────────────────────────────────────────────────

    #[test]
    fn test_header_has_total_columns() {
        assert_eq!(header_row().len(), TOTAL_COLUMNS);
        assert_eq!(TOTAL_COLUMNS, 17 + 7 * 12);
    }

    #[test]
    fn test_one_row_per_employee_with_full_width() {
        let employees = vec![
            make_employee("2025.01.01 ~ 2025.12.31"),
            make_employee("2025.03.01 ~ 2025.06.30"),
            make_employee("garbage"),
        ];
        let rows = synthesize_rows(&make_context(), &employees);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.len(), TOTAL_COLUMNS);
        }
        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[2][0], "3");
    }

    // ── per-field derivations ───────────────────────────────────────────────

    #[test]
    fn test_known_type_maps_to_code() {
        assert_eq!(disability_type_code("지체장애"), "01");
        assert_eq!(disability_type_code("뇌전증장애"), "15");
    }

    #[test]
    fn test_unknown_type_passes_through() {
        assert_eq!(disability_type_code("기타희귀장애"), "기타희귀장애");
    }

    #[test]
    fn test_contract_period_parses_compact_start() {
        let window = parse_contract_period("2026.01.01 ~ 2026.12.31");
        assert_eq!(window.start_text, "20260101");
        assert_eq!(window.end_text, "20261231");
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn test_future_end_date_is_blanked() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let ongoing = parse_contract_period("2025.01.01 ~ 2027.12.31");
        assert_eq!(ongoing.display_end(today), "");

        let ended = parse_contract_period("2025.01.01 ~ 2025.12.31");
        assert_eq!(ended.display_end(today), "20251231");
    }

    #[test]
    fn test_end_date_today_is_not_blanked() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let window = parse_contract_period("2025.01.01 ~ 2026.06.01");
        assert_eq!(window.display_end(today), "20260601");
    }

    #[test]
    fn test_malformed_period_keeps_text_without_dates() {
        let window = parse_contract_period("입사예정");
        assert_eq!(window.start, None);
        assert_eq!(window.end, None);
        assert_eq!(window.end_text, "");
    }

    #[test]
    fn test_salary_reduces_to_digits() {
        assert_eq!(extract_digits("월 2,500,000원"), "2500000");
        assert_eq!(extract_digits("협의"), "");
    }

    // ── month inclusion ─────────────────────────────────────────────────────

    #[test]
    fn test_covers_month_inside_window() {
        let window = parse_contract_period("2025.01.01 ~ 2025.12.31");
        assert!(covers_month(&window, 2025, 1));
        assert!(covers_month(&window, 2025, 12));
    }

    #[test]
    fn test_covers_month_partial_overlap() {
        // Starts mid-March: March overlaps, February does not.
        let window = parse_contract_period("2025.03.15 ~ 2025.12.31");
        assert!(!covers_month(&window, 2025, 2));
        assert!(covers_month(&window, 2025, 3));
    }

    #[test]
    fn test_covers_month_outside_window() {
        let window = parse_contract_period("2024.01.01 ~ 2024.12.31");
        assert!(!covers_month(&window, 2025, 1));
    }

    #[test]
    fn test_open_ended_window_covers_all_later_months() {
        let window = parse_contract_period("2025.06.01 ~ ");
        assert!(covers_month(&window, 2025, 6));
        assert!(covers_month(&window, 2025, 12));
        assert!(!covers_month(&window, 2025, 5));
    }

    #[test]
    fn test_unparsed_start_covers_nothing() {
        let window = parse_contract_period("미정 ~ 2025.12.31");
        assert!(!covers_month(&window, 2025, 6));
    }

    // ── month block values ──────────────────────────────────────────────────

    /// Column index of the wage cell inside month `m`'s block.
    fn wage_column(month: usize) -> usize {
        BASE_COLUMNS + (month - 1) * MONTH_COLUMNS + 1
    }

    #[test]
    fn test_covered_month_wage_equals_salary() {
        let employees = vec![make_employee("2025.01.01 ~ 2025.12.31")];
        let rows = synthesize_rows(&make_context(), &employees);
        for month in 1..=12 {
            assert_eq!(rows[0][wage_column(month)], "2500000", "month {month}");
        }
    }

    #[test]
    fn test_uncovered_month_wage_is_zero() {
        // Contract sits entirely in 2024; reference year is 2025.
        let employees = vec![make_employee("2024.01.01 ~ 2024.12.31")];
        let rows = synthesize_rows(&make_context(), &employees);
        for month in 1..=12 {
            assert_eq!(rows[0][wage_column(month)], "0", "month {month}");
            // Employed flag stays empty too.
            assert_eq!(rows[0][wage_column(month) - 1], "", "month {month}");
        }
    }

    #[test]
    fn test_severity_flag_column() {
        let mut severe = make_employee("2025.01.01 ~ 2025.12.31");
        severe.severity = Severity::Severe;
        let mut mild = make_employee("2025.01.01 ~ 2025.12.31");
        mild.severity = Severity::Mild;

        let rows = synthesize_rows(&make_context(), &[severe, mild]);
        assert_eq!(rows[0][9], "1");
        assert_eq!(rows[1][9], "0");
    }
}
