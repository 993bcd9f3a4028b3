//! CSV export of normalized leads

use std::io::Write;

use anyhow::{Context, Result};

use crate::types::Lead;

const HEADER: [&str; 11] = [
    "id", "name", "phone", "email", "service", "budget", "source", "status", "date", "time", "notes",
];

/// Write `leads` as comma-separated rows with a header. Returns the row count.
pub fn write_leads_csv<W: Write>(leads: &[Lead], out: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .from_writer(out);

    writer.write_record(HEADER).context("Failed to write CSV header")?;
    for lead in leads {
        let id = lead.id.to_string();
        writer
            .write_record([
                id.as_str(),
                lead.name.as_str(),
                lead.phone.as_str(),
                lead.email.as_str(),
                lead.service.as_str(),
                lead.budget.as_str(),
                lead.source.as_str(),
                lead.status.as_str(),
                lead.date.as_str(),
                lead.time.as_str(),
                lead.notes.as_str(),
            ])
            .with_context(|| format!("Failed to write lead {}", lead.id))?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(leads.len())
}
