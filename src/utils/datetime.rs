use chrono::{DateTime, FixedOffset, Utc};

/// `HH:MM` in the display offset.
pub fn format_time(dt: &DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%H:%M").to_string()
}

/// `dd.mm.YYYY HH:MM` in the display offset.
pub fn format_datetime(dt: &DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%d.%m.%Y %H:%M").to_string()
}

/// Renders a speech slot. When both ends fall on the same local day the date
/// is shown once: `01.06.2024 10:00-11:30`.
pub fn format_time_range(start: &DateTime<Utc>, end: &DateTime<Utc>, offset: FixedOffset) -> String {
    let start_local = start.with_timezone(&offset);
    let end_local = end.with_timezone(&offset);

    if start_local.date_naive() == end_local.date_naive() {
        format!("{}-{}", format_datetime(start, offset), format_time(end, offset))
    } else {
        format!("{}-{}", format_datetime(start, offset), format_datetime(end, offset))
    }
}
