//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads. Cuts on a char boundary.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_short_strings_untouched() {
    assert_eq!(trunc_for_log("bellows", 80), "bellows");
  }

  #[test]
  fn test_truncates_on_char_boundary() {
    let s = "ééééé"; // 10 bytes
    assert_eq!(trunc_for_log(s, 3), "é… (10 bytes total)");
  }
}
