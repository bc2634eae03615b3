//! Formatting helpers shared by the parrotweb crates

/// Group the digits of an integer, keeping the sign in front.
///
/// An empty separator returns the plain number.
pub fn format_number(n: i64, separator: &str) -> String {
    let digits = n.unsigned_abs().to_string();
    if separator.is_empty() {
        return if n < 0 { format!("-{}", digits) } else { digits };
    }

    let mut grouped = String::new();
    for (count, c) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push_str(&separator.chars().rev().collect::<String>());
        }
        grouped.push(c);
    }
    if n < 0 {
        grouped.push('-');
    }
    grouped.chars().rev().collect()
}

/// Format an amount with its currency suffix, e.g. `-50 PW`
pub fn format_amount(n: i64, suffix: &str, separator: &str) -> String {
    let number = format_number(n, separator);
    if suffix.is_empty() {
        number
    } else {
        format!("{} {}", number, suffix)
    }
}

/// Escape text for inclusion in HTML bodies and quoted attributes
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_digits() {
        assert_eq!(format_number(1234567, ","), "1,234,567");
        assert_eq!(format_number(-1234, ","), "-1,234");
        assert_eq!(format_number(999, ","), "999");
        assert_eq!(format_number(-50, ""), "-50");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(-50, "PW", ""), "-50 PW");
        assert_eq!(format_amount(500, "", ""), "500");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"bob\" & 'carol'</b>"),
            "&lt;b&gt;&quot;bob&quot; &amp; &#39;carol&#39;&lt;/b&gt;"
        );
    }
}
