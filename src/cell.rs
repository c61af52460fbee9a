use calamine::{Data, Range};
use chrono::{Duration, NaiveDate};

/// Cell lookup by absolute (0-based) sheet position.
///
/// calamine ranges start at the first used cell, not at A1, so every
/// template offset is resolved through this helper instead of indexing the
/// range relative to its own origin.
pub fn cell_at(range: &Range<Data>, row: u32, col: u32) -> Option<&Data> {
    range.get_value((row, col))
}

/// Last used row of the sheet (absolute, 0-based), if it has any cells.
pub fn last_row(range: &Range<Data>) -> Option<u32> {
    range.end().map(|(row, _)| row)
}

pub fn is_blank(cell: Option<&Data>) -> bool {
    match cell {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Cell contents as the user sees them, trimmed. Blank and error cells give
/// an empty string.
pub fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) | Some(Data::Error(_)) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Numeric coercion. Text is accepted when it parses as a finite number;
/// anything else is `None`.
pub fn cell_number(cell: Option<&Data>) -> Option<f64> {
    match cell? {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Convert an Excel serial date (1900 date system) to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Serial 60 is the phantom 1900-02-29; counting from 1899-12-30 is exact after it
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

/// Parse an ISO date prefix such as `2024-03-31T00:00:00`.
pub fn iso_date_prefix(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn number_coercion() {
        assert_eq!(cell_number(Some(&Data::Int(12))), Some(12.0));
        assert_eq!(cell_number(Some(&Data::Float(1.5))), Some(1.5));
        assert_eq!(cell_number(Some(&Data::String(" 42.5 ".into()))), Some(42.5));
        assert_eq!(cell_number(Some(&Data::String("n/a".into()))), None);
        assert_eq!(cell_number(Some(&Data::String("inf".into()))), None);
        assert_eq!(cell_number(Some(&Data::Empty)), None);
        assert_eq!(cell_number(None), None);
    }

    #[test]
    fn text_and_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&Data::String("   ".into()))));
        assert!(!is_blank(Some(&Data::Float(0.0))));
        assert_eq!(cell_text(Some(&Data::String(" Alcance 1 ".into()))), "Alcance 1");
        assert_eq!(cell_text(Some(&Data::Float(2024.0))), "2024");
    }

    #[test]
    fn serial_dates() {
        let date = excel_serial_to_date(45292.0).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 1));
        assert!(excel_serial_to_date(-3.0).is_none());
        assert!(excel_serial_to_date(1.0e15).is_none());
        assert!(excel_serial_to_date(f64::MAX).is_none());
        assert_eq!(iso_date_prefix("2023-06-30T00:00:00").unwrap().year(), 2023);
        assert!(iso_date_prefix("2023").is_none());
    }

    #[test]
    fn absolute_lookup_ignores_range_origin() {
        let mut range = Range::new((2, 1), (4, 2));
        range.set_value((3, 1), Data::String("x".into()));
        assert_eq!(cell_text(cell_at(&range, 3, 1)), "x");
        assert!(cell_at(&range, 0, 0).is_none());
        assert_eq!(last_row(&range), Some(4));
    }
}
