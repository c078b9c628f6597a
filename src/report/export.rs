// CSV export of the clean table, matching its column set.
use crate::model::{CleanRecord, ReportError};
use csv::Writer;
use std::io::{self, Write};
use std::path::Path;

const HEADER: [&str; 5] = ["Source", "Title", "Price", "Rating", "Link"];

pub fn write_csv(records: &[CleanRecord], path: &Path) -> Result<(), ReportError> {
    let mut wtr = Writer::from_path(path)?;
    write_rows(&mut wtr, records)?;
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[CleanRecord]) -> Result<String, ReportError> {
    let mut wtr = Writer::from_writer(Vec::new());
    write_rows(&mut wtr, records)?;
    let bytes = wtr.into_inner().map_err(|e| ReportError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ReportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn write_rows<W: Write>(wtr: &mut Writer<W>, records: &[CleanRecord]) -> Result<(), csv::Error> {
    wtr.write_record(HEADER)?;
    for record in records {
        // Absent rating exports as an empty cell.
        let rating = record.rating.map(|r| r.to_string()).unwrap_or_default();
        wtr.write_record(&[
            record.source.as_str().to_string(),
            record.title.clone(),
            record.price.to_string(),
            rating,
            record.link.clone(),
        ])?;
    }
    Ok(())
}
