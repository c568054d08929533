/// CSV export of a result set.
///
/// The interactive host renders results as a table; headless callers get
/// the same tabular view as `identifier,username,phone` rows.
use crate::model::Record;
use std::io::Write;

/// Write `records` as CSV (with a header row) to `out`.
///
/// Rows are written in the given order, which for scan results is
/// first-acceptance (file) order.
pub fn write_csv<W: Write>(records: &[Record], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
