use outbreak_core::world::{MeanStepCounts, StepCounts};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only CSV writer with an explicit lifecycle: `create` opens the
/// file and writes the header, `append` adds one row per step, and the
/// caller ends the file with either `finish` or `discard`. Nothing is
/// flushed or deleted implicitly on drop.
pub struct CsvSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvSink {
    pub const HEADER: &'static str = "step,susceptible,infected,recovered,dead";

    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", Self::HEADER)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn append(&mut self, counts: &StepCounts) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            counts.step, counts.susceptible, counts.infected, counts.recovered, counts.dead
        )
    }

    pub fn append_mean(&mut self, counts: &MeanStepCounts) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            counts.step, counts.susceptible, counts.infected, counts.recovered, counts.dead
        )
    }

    /// Flush and close the file, returning its path.
    pub fn finish(mut self) -> io::Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }

    /// Close and remove the (partial) file.
    pub fn discard(self) -> io::Result<()> {
        drop(self.writer);
        fs::remove_file(&self.path)
    }
}
