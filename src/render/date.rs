use chrono::{Locale, NaiveDate};

/// "19 de outubro de 2026"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format_localized("%d de %B de %Y", Locale::pt_BR)
        .to_string()
}
