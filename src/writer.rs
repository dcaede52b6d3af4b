/*!
 * Writing the final document to disk
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::{ResultExt, Result};
use crate::types::FinalDocument;
use crate::utils::format_file_size;

/// Writes documents as UTF-8 text files
pub struct DocumentWriter;

impl DocumentWriter {
    /// Write the document to `path`, creating missing parent directories
    pub fn write(document: &FinalDocument, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(document.text.as_bytes())?;
        writer.flush()?;

        info!(
            "Wrote {} to {}",
            format_file_size(document.text.len() as u64),
            path.display()
        );
        Ok(())
    }
}
