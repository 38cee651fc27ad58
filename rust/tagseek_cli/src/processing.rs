use indicatif::{
    ProgressIterator,
    ProgressStyle,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tagseek::scoring::TagSearchTimings;
use tagseek::{
    PeakList,
    TagFinder,
    TagSearchResult,
};
use tracing::{
    debug,
    info,
};

use crate::errors::CliError;

/// One spectrum as read from the input file.
#[derive(Debug, Clone, Deserialize)]
pub struct SpectrumInput {
    pub id: String,
    /// `[mass, intensity]` pairs, in any order.
    pub peaks: Vec<(f64, f64)>,
}

#[derive(Debug, Serialize)]
pub struct SpectrumOutput {
    pub id: String,
    #[serde(flatten)]
    pub result: TagSearchResult,
}

pub fn read_spectra(path: &Path) -> Result<Vec<SpectrumInput>, CliError> {
    let st = Instant::now();
    let file = std::fs::File::open(path).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    })?;
    let spectra: Vec<SpectrumInput> = serde_json::from_reader(std::io::BufReader::new(file))?;
    info!(
        "Loading {} spectra took: {:?} for {}",
        spectra.len(),
        st.elapsed(),
        path.display()
    );
    Ok(spectra)
}

/// Searches the spectra in chunks of `chunk_size`. Parallelism happens
/// within each chunk, in [`TagFinder::find_tags_batch`].
pub fn process_spectra(
    finder: &TagFinder,
    spectra: Vec<SpectrumInput>,
    chunk_size: usize,
) -> Vec<SpectrumOutput> {
    let start = Instant::now();
    let num_spectra = spectra.len();
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let mut out: Vec<SpectrumOutput> = Vec::with_capacity(num_spectra);
    for chunk in spectra
        .chunks(chunk_size.max(1))
        .progress_with_style(style)
    {
        let peak_lists: Vec<PeakList> = chunk
            .iter()
            .map(|spectrum| PeakList::from_unsorted(spectrum.peaks.clone()))
            .collect();
        let results = finder.find_tags_batch(&peak_lists);
        for ((spectrum, peaks), result) in chunk.iter().zip(peak_lists.iter()).zip(results) {
            debug!(
                "Spectrum {}: {} peaks, {} tags",
                spectrum.id,
                peaks.len(),
                result.tags.len()
            );
            out.push(SpectrumOutput {
                id: spectrum.id.clone(),
                result,
            });
        }
    }

    let mut timings = TagSearchTimings::default();
    let mut num_aborted = 0;
    for x in out.iter() {
        timings += x.result.timings;
        num_aborted += x.result.stats.aborted as usize;
    }
    let num_tags: usize = out.iter().map(|x| x.result.tags.len()).sum();
    info!(
        "Processed {} spectra in {:?}, reporting {} tags ({} searches stopped early)",
        num_spectra,
        start.elapsed(),
        num_tags,
        num_aborted
    );
    info!("{:?}", timings);

    out
}

pub fn write_output(
    out: &[SpectrumOutput],
    writer: impl Write,
    pretty: bool,
) -> Result<(), CliError> {
    let mut writer = std::io::BufWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, out)?;
    } else {
        serde_json::to_writer(&mut writer, out)?;
    }
    writeln!(writer).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: None,
    })?;
    writer.flush().map_err(|e| CliError::Io {
        source: e.to_string(),
        path: None,
    })?;
    Ok(())
}
