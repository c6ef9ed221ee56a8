use crate::archive::decoder::Decoder;
use crate::archive::dest::DestinationResolver;
use crate::error::{Result, TempArchiveError};
use std::io::Read;

/// Per-entry outcome of a policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision {
    Extract,
    Skip,
}

/// Synchronous confirmation callback used by the interactive policy.
///
/// The engine never touches a terminal itself; whoever drives it supplies
/// the prompt, which keeps the entry loop identical under both policies and
/// testable without one.
pub trait DecisionPrompt {
    /// Decide whether to extract one entry. `already_exists` distinguishes
    /// the overwrite case for display purposes.
    fn confirm(&mut self, name: &str, already_exists: bool, size: u64) -> EntryDecision;
}

impl<F> DecisionPrompt for F
where
    F: FnMut(&str, bool, u64) -> EntryDecision,
{
    fn confirm(&mut self, name: &str, already_exists: bool, size: u64) -> EntryDecision {
        self(name, already_exists, size)
    }
}

/// Extraction decision rule applied to every entry
pub enum ExtractPolicy<'a> {
    /// Extract everything without asking
    Unconditional,
    /// Confirm each entry through the supplied prompt
    Interactive(&'a mut dyn DecisionPrompt),
}

/// Summary of one extraction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntriesProcessed {
    pub total: u32,
    pub extracted: u32,
    pub skipped: u32,
}

/// Interpret an interactive response, fail-closed.
///
/// Only a bare `Y` or `y` (with the line terminator already gone or still
/// attached) counts as an affirmative; everything else, including `yes` and
/// padded variants, means [`EntryDecision::Skip`].
pub fn is_affirmative(input: &str) -> bool {
    matches!(input.trim_end_matches(['\r', '\n']), "Y" | "y")
}

/// Drive one archive end-to-end.
///
/// Reads the entry count, then for each entry decodes the name and payload
/// length, resolves a destination, applies the policy, and either streams the
/// payload to the opened sink or skips past it. The first decoder or sink
/// failure aborts the remaining entries; files already written stay on disk.
pub fn extract<R: Read>(
    decoder: &mut Decoder<R>,
    mut policy: ExtractPolicy<'_>,
    resolver: &mut dyn DestinationResolver,
) -> Result<EntriesProcessed> {
    let entry_count = decoder.read_fixed_count()?;
    tracing::info!(entry_count, "archive header read");

    let mut report = EntriesProcessed {
        total: entry_count,
        ..Default::default()
    };

    for index in 0..entry_count {
        let name = decoder.read_string()?;
        let length_offset = decoder.offset();
        let payload_length = decoder.read_compact_index()?;
        if payload_length < 0 {
            return Err(TempArchiveError::MalformedEntry {
                offset: length_offset,
                reason: format!("negative payload length {payload_length}"),
            });
        }
        let payload_length = payload_length as u64;

        let resolved = resolver.resolve(&name)?;
        let decision = match &mut policy {
            ExtractPolicy::Unconditional => EntryDecision::Extract,
            ExtractPolicy::Interactive(prompt) => {
                prompt.confirm(&name, resolved.exists, payload_length)
            }
        };

        match decision {
            EntryDecision::Extract => {
                tracing::debug!(index, name = %name, payload_length, "extracting entry");
                let mut sink = resolver.open_sink(&resolved)?;
                decoder.copy_to(payload_length, &mut sink)?;
                report.extracted += 1;
            }
            EntryDecision::Skip => {
                tracing::debug!(index, name = %name, payload_length, "skipping entry");
                decoder.skip(payload_length)?;
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        extracted = report.extracted,
        skipped = report.skipped,
        "archive processed"
    );
    Ok(report)
}
