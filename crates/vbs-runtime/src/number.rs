//! Numeric text: parsing of numeric strings and float formatting

/// A string that parsed as a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericText {
    /// Nearest double; infinite when the literal exceeds the Double range
    pub value: f64,
    /// Exact `mantissa * 10^-scale` for plain decimal literals without an
    /// exponent, used where rounding through a double would lose digits
    pub decimal: Option<(i128, u32)>,
}

/// Parse VBScript numeric text.
///
/// Accepts surrounding whitespace, a sign, `,` thousands separators in the
/// integer part, a fraction, an `E`/`D` exponent and `&H`/`&O` literals.
pub fn parse_numeric(text: &str) -> Option<NumericText> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(rest) = strip_prefix_ignore_case(text, "&h") {
        return parse_radix(rest, 16);
    }
    if let Some(rest) = strip_prefix_ignore_case(text, "&o") {
        return parse_radix(rest, 8);
    }
    parse_decimal(text)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// `&H`/`&O` literals are two's complement: 16-bit when they fit in 16 bits,
/// otherwise 32-bit
fn parse_radix(digits: &str, radix: u32) -> Option<NumericText> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let raw = u64::from_str_radix(digits, radix).ok()?;
    let value = if raw <= u16::MAX as u64 {
        raw as u16 as i16 as f64
    } else if raw <= u32::MAX as u64 {
        raw as u32 as i32 as f64
    } else {
        return None;
    };
    Some(NumericText {
        value,
        decimal: None,
    })
}

fn parse_decimal(text: &str) -> Option<NumericText> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let mut integer = String::new();
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'0'..=b'9' => integer.push(b as char),
            b',' if !integer.is_empty() => {}
            _ => break,
        }
        pos += 1;
    }

    let mut fraction = String::new();
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        while let Some(&b) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
            fraction.push(b as char);
            pos += 1;
        }
    }
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut exponent: Option<i32> = None;
    if matches!(bytes.get(pos), Some(b'e' | b'E' | b'd' | b'D')) {
        pos += 1;
        let exp_negative = match bytes.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        let start = pos;
        while bytes.get(pos).is_some_and(|b| b.is_ascii_digit()) {
            pos += 1;
        }
        if start == pos {
            return None;
        }
        // Anything this long is out of range either way
        let magnitude: i32 = text[start..pos].parse().unwrap_or(i32::MAX / 2);
        exponent = Some(if exp_negative { -magnitude } else { magnitude });
    }

    if pos != bytes.len() {
        return None;
    }

    let sign = if negative { "-" } else { "" };
    let literal = format!(
        "{}{}.{}e{}",
        sign,
        if integer.is_empty() { "0" } else { &integer },
        if fraction.is_empty() { "0" } else { &fraction },
        exponent.unwrap_or(0)
    );
    let value: f64 = literal.parse().ok()?;

    let decimal = if exponent.is_none() {
        let digits = format!("{}{}", integer, fraction);
        digits.parse::<i128>().ok().map(|mantissa| {
            let mantissa = if negative { -mantissa } else { mantissa };
            (mantissa, fraction.len() as u32)
        })
    } else {
        None
    };

    Some(NumericText { value, decimal })
}

/// Format a float the way `CStr` does, with `significant` digits of precision.
///
/// Plain notation is used for decimal exponents in `-5 < e < significant`,
/// scientific (`1.5E+15`, `1E-05`) otherwise.
pub fn format_float(value: f64, significant: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", significant.saturating_sub(1), value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    let sign = if negative { "-" } else { "" };

    if exponent > -5 && exponent < significant as i32 {
        let body = if exponent >= 0 {
            let split = exponent as usize + 1;
            if digits.len() <= split {
                format!("{}{}", digits, "0".repeat(split - digits.len()))
            } else {
                format!("{}.{}", &digits[..split], &digits[split..])
            }
        } else {
            format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
        };
        format!("{}{}", sign, body)
    } else {
        let (head, tail) = digits.split_at(1);
        let fraction = if tail.is_empty() {
            String::new()
        } else {
            format!(".{}", tail)
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}{}{}E{}{:02}",
            sign,
            head,
            fraction,
            exp_sign,
            exponent.abs()
        )
    }
}
