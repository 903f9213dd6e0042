use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{CohortError, Result};

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>> {
    if !path.exists() {
        return Err(CohortError::MissingInput(format!(
            "{} not found",
            path.display()
        )));
    }
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
