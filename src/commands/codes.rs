use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::CodesArgs;
use crate::commands::selection::{PreparedSelection, prepare, resolve_source};
use crate::model::CodesListing;

pub fn run(args: CodesArgs) -> Result<()> {
    let seed_path = resolve_source(&args.selection.source)?;
    let prepared = prepare(&args.selection, &seed_path)?;

    if args.json {
        write_json_listing(&args, prepared)
    } else {
        write_text_listing(&prepared)
    }
}

fn write_json_listing(args: &CodesArgs, prepared: PreparedSelection) -> Result<()> {
    let listing = CodesListing {
        seed_path: prepared.seed_path.display().to_string(),
        layout: args.selection.layout,
        options: prepared.options,
        candidate_count: prepared.selection.candidate_count,
        filtered_count: prepared.selection.filtered_count,
        representatives: prepared.selection.representatives,
        unresolved: prepared.selection.unresolved,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &listing)
        .context("failed to serialize codes json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_listing(prepared: &PreparedSelection) -> Result<()> {
    let selection = &prepared.selection;
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Seed: {}", prepared.seed_path.display())?;
    writeln!(
        output,
        "Candidates: {} filtered={} representatives={} unresolved={}",
        selection.candidate_count,
        selection.filtered_count,
        selection.representatives.len(),
        selection.unresolved.len(),
    )?;

    for (rank, representative) in selection.representatives.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\t{}",
            rank + 1,
            representative.code,
            representative.path.display()
        )?;
    }
    for code in &selection.unresolved {
        writeln!(output, "-\t{code}\t(unresolved)")?;
    }

    output.flush()?;
    Ok(())
}
