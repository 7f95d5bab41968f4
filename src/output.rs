use crate::types::EvalRecord;

/// Significant digits of the default `%g` style.
const PRECISION: usize = 6;

/// Formats a float like `%g`: six significant digits, trailing zeros
/// removed, scientific notation for exponents below -4 or above 5.
pub fn format_general(value: f32) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        return text.to_string();
    }
    if value == 0.0 {
        let text = if value.is_sign_negative() { "-0" } else { "0" };
        return text.to_string();
    }

    let v = value as f64;
    let sci = format!("{:.*e}", PRECISION - 1, v);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `pred_x pred_y | label_x label_y | distance`
pub fn format_record(record: &EvalRecord) -> String {
    format!(
        "{} {} | {} {} | {}",
        format_general(record.prediction.x),
        format_general(record.prediction.y),
        record.label.x,
        record.label.y,
        format_general(record.distance)
    )
}

/// Aggregate distance statistics over a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f32,
    pub max: f32,
}

impl Summary {
    pub fn from_records(records: &[EvalRecord]) -> Self {
        let count = records.len();
        let total: f64 = records.iter().map(|r| r.distance as f64).sum();
        let max = records
            .iter()
            .map(|r| r.distance)
            .fold(0.0_f32, f32::max);
        let mean = if count == 0 { 0.0 } else { (total / count as f64) as f32 };
        Self { count, mean, max }
    }

    pub fn format(&self) -> String {
        format!(
            "mean {} | max {} | n {}",
            format_general(self.mean),
            format_general(self.max),
            self.count
        )
    }
}
