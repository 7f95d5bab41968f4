use std::io::Write;

use crate::dataset::Dataset;
use crate::engine::{Engine, Interpreter};
use crate::error::{EvalError, Result};
use crate::output::format_record;
use crate::types::EvalRecord;

/// Runs every sample through the interpreter in generation order and writes
/// one result line per sample to `out`.
pub fn evaluate<E: Engine, W: Write>(
    interpreter: &mut Interpreter<E>,
    dataset: &Dataset,
    out: &mut W,
) -> Result<Vec<EvalRecord>> {
    let mut records = Vec::with_capacity(dataset.len());

    for (image, label) in dataset.iter() {
        let prediction = interpreter.predict(image.as_raw())?;
        let record = EvalRecord::new(prediction, label);
        writeln!(out, "{}", format_record(&record))
            .map_err(|e| EvalError::io("writing result line", e))?;
        records.push(record);
    }

    Ok(records)
}
