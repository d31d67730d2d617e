//! Ledger classification command

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use coa_core::{
    export::{export_classifications, export_match_log},
    import::{parse_corrections, parse_ledger},
    ClassificationSummary, ExportFormat, Matcher,
};
use tracing::warn;

/// Apply corrections, classify every ledger row, and export the results.
///
/// Progress goes to stderr when the results go to stdout, so the export
/// can be piped.
pub fn cmd_classify(
    matcher: &mut Matcher,
    ledger: &Path,
    corrections: Option<&Path>,
    output: Option<&Path>,
    format: ExportFormat,
    log: Option<&Path>,
) -> Result<ClassificationSummary> {
    let mut status: Box<dyn Write> = if output.is_some() {
        Box::new(io::stdout())
    } else {
        Box::new(io::stderr())
    };

    if let Some(path) = corrections {
        let file = File::open(path)
            .with_context(|| format!("Failed to open corrections: {}", path.display()))?;
        let parsed = parse_corrections(file)
            .with_context(|| format!("Failed to parse corrections: {}", path.display()))?;

        let mut applied = 0;
        for correction in &parsed {
            let check = matcher.validate(&correction.path);
            if !check.is_valid {
                warn!(
                    "Skipping correction for '{}': {}",
                    correction.entry_name,
                    check
                        .errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                );
                continue;
            }
            if matcher.add_historical_match(&correction.entry_name, &correction.path) {
                applied += 1;
            }
        }
        writeln!(
            status,
            "📝 Applied {} of {} corrections",
            applied,
            parsed.len()
        )?;
    }

    writeln!(status, "📥 Classifying {}...", ledger.display())?;

    let file =
        File::open(ledger).with_context(|| format!("Failed to open ledger: {}", ledger.display()))?;
    let rows =
        parse_ledger(file).with_context(|| format!("Failed to parse ledger: {}", ledger.display()))?;
    writeln!(status, "   Found {} entries", rows.len())?;

    let classified = matcher.classify_rows(&rows);
    let summary = ClassificationSummary::from_rows(&classified);

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export_classifications(&mut writer, &classified, format)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export_classifications(&mut handle, &classified, format)?;
            writeln!(handle)?;
        }
    }

    writeln!(status, "✅ Classification complete!")?;
    writeln!(status, "   Matched: {}/{}", summary.matched(), summary.total)?;
    if summary.by_predefined > 0 {
        writeln!(status, "   - Predefined: {}", summary.by_predefined)?;
    }
    if summary.by_historical > 0 {
        writeln!(status, "   - Historical: {}", summary.by_historical)?;
    }
    if summary.by_exact > 0 {
        writeln!(status, "   - Exact: {}", summary.by_exact)?;
    }
    if summary.by_word > 0 {
        writeln!(status, "   - Word: {}", summary.by_word)?;
    }
    if summary.by_fuzzy > 0 {
        writeln!(status, "   - Fuzzy: {}", summary.by_fuzzy)?;
    }
    if summary.unmatched > 0 {
        writeln!(status, "   ⚠️  Unmatched: {}", summary.unmatched)?;
    }
    if let Some(path) = output {
        writeln!(status, "   Exported {} to {}", format, path.display())?;
    }

    if let Some(path) = log {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        export_match_log(&mut writer, matcher.match_log())?;
        writer.flush()?;
        writeln!(
            status,
            "   Match log ({} entries) written to {}",
            matcher.match_log().len(),
            path.display()
        )?;
    }

    Ok(summary)
}
