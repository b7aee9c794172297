use crate::error::ReportError;

/// Convert a StorCLI capacity string ("278.875 GB") into an exact byte
/// count.
///
/// StorCLI always prints a fractional decimal followed by a single-letter
/// binary unit, scaled by 1024 per unit step (K=1024^1 .. E=1024^6). The
/// conversion runs in u128 integer arithmetic: at multi-terabyte sizes an
/// f64 mantissa already drops bits, and these values end up as exact
/// gauges.
pub fn parse_size(size: &str) -> Result<u64, ReportError> {
    let malformed = || ReportError::MalformedSize(size.to_string());

    let (number, unit) = size.split_once(' ').ok_or_else(malformed)?;
    let unit = unit.strip_suffix('B').ok_or_else(malformed)?;
    let mut letters = unit.chars();
    let letter = letters.next().ok_or_else(malformed)?;
    if !letters.as_str().is_empty() || !letter.is_ascii_uppercase() {
        return Err(malformed());
    }

    let (int_part, frac_part) = number.split_once('.').ok_or_else(malformed)?;
    if int_part.is_empty()
        || frac_part.is_empty()
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }

    let exp = match letter {
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        'E' => 6,
        _ => return Err(ReportError::UnsupportedSizeUnit(letter)),
    };

    // mantissa / 10^f * 1024^exp, truncated toward zero.
    let mantissa: u128 = format!("{int_part}{frac_part}")
        .parse()
        .map_err(|_| malformed())?;
    let denom = 10u128
        .checked_pow(frac_part.len() as u32)
        .ok_or_else(malformed)?;
    let scaled = mantissa.checked_mul(1024u128.pow(exp)).ok_or_else(malformed)?;

    u64::try_from(scaled / denom).map_err(|_| malformed())
}
