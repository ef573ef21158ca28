use super::records::StructureRecord;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines the interface for writing flattened structures to a file format.
///
/// Implementors handle format-specific serialization; the record they receive
/// already guarantees unique labels, valid element tags and occupancies in
/// [0, 1].
pub trait StructureWriter {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes a structure record to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(record: &StructureRecord, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes a structure record to a file path, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(record: &StructureRecord, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(record, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
