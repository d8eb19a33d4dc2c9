use std::time::Duration;

/// Parses a positive period made of `<number><unit>` parts, e.g. "24h",
/// "1d12h" or "1h 30m". Units run from seconds to weeks; a number without a
/// unit is seconds.
pub fn parse_period(s: &str) -> Result<Duration, String> {
  let s = s.trim();
  if s.is_empty() {
    return Err("empty period".to_string());
  }

  let mut total: u64 = 0;
  let mut rest = s;
  while !rest.is_empty() {
    let digits = rest
      .find(|c: char| !c.is_ascii_digit())
      .unwrap_or(rest.len());
    if digits == 0 {
      return Err(format!("expected a number in period: {}", s));
    }
    let value: u64 = rest[..digits]
      .parse()
      .map_err(|_| format!("invalid number in period: {}", s))?;
    rest = &rest[digits..];

    let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
    let unit = unit_seconds(rest[..unit_len].trim())
      .ok_or_else(|| format!("unknown unit in period: {}", s))?;
    rest = &rest[unit_len..];

    total = value
      .checked_mul(unit)
      .and_then(|seconds| total.checked_add(seconds))
      .ok_or_else(|| format!("period out of range: {}", s))?;
  }

  if total == 0 {
    return Err(format!("period must be positive: {}", s));
  }
  Ok(Duration::from_secs(total))
}

fn unit_seconds(unit: &str) -> Option<u64> {
  match unit {
    "" | "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
    "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
    "h" | "hr" | "hrs" | "hour" | "hours" => Some(3600),
    "d" | "day" | "days" => Some(86400),
    "w" | "week" | "weeks" => Some(604800),
    _ => None,
  }
}

#[test]
fn test_parse_period() {
  let cases = [
    ("30", 30),
    (" 30s ", 30),
    ("30 s", 30),
    ("15m", 900),
    ("25 minutes", 1500),
    ("24h", 86400),
    ("1d", 86400),
    ("2days", 172800),
    ("1w", 604800),
    ("1d12h", 129600),
    ("1h 30m", 5400),
  ];
  for (input, seconds) in cases {
    assert_eq!(parse_period(input).unwrap(), Duration::from_secs(seconds), "{}", input);
  }
}

#[test]
fn test_parse_period_invalid() {
  for input in ["", "0s", "0h0m", "30x", "abcs", "h", "200ms", "99999999999999999999d"] {
    assert!(parse_period(input).is_err(), "{}", input);
  }
}
