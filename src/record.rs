//! Single-record CSV codec for scalar sequences.
//!
//! A list of scalars is stored as one comma-separated record. Quoting follows
//! RFC 4180: a field is wrapped in double quotes when it contains the
//! delimiter, a quote, CR or LF, or starts with whitespace; inner quotes are
//! doubled. The empty string is the empty record, so a record holding a
//! single empty field is written as `""`.

const DELIMITER: char = ',';
const QUOTE: char = '"';

#[inline]
fn needs_quotes(field: &str) -> bool {
    field.contains(DELIMITER)
        || field.contains(QUOTE)
        || field.contains('\r')
        || field.contains('\n')
        || field.starts_with(char::is_whitespace)
}

fn write_field(out: &mut String, field: &str) {
    if needs_quotes(field) {
        out.push(QUOTE);
        for ch in field.chars() {
            if ch == QUOTE {
                out.push(QUOTE);
            }
            out.push(ch);
        }
        out.push(QUOTE);
    } else {
        out.push_str(field);
    }
}

/// Joins `fields` into one record, without a trailing terminator.
pub(crate) fn encode<S: AsRef<str>>(fields: &[S]) -> String {
    if let [only] = fields {
        if only.as_ref().is_empty() {
            return "\"\"".to_string();
        }
    }

    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        write_field(&mut out, field.as_ref());
    }
    out
}

/// Splits one record into its fields.
///
/// Parsing stops at the first unquoted line break; anything after it belongs
/// to a following record and is ignored. The error is a short reason.
pub(crate) fn decode(record: &str) -> Result<Vec<String>, &'static str> {
    let mut fields = Vec::new();
    if record.is_empty() {
        return Ok(fields);
    }

    let mut chars = record.chars().peekable();
    loop {
        let mut field = String::new();

        if chars.peek() == Some(&QUOTE) {
            chars.next();
            loop {
                match chars.next() {
                    Some(QUOTE) if chars.peek() == Some(&QUOTE) => {
                        chars.next();
                        field.push(QUOTE);
                    }
                    Some(QUOTE) => break,
                    Some(ch) => field.push(ch),
                    None => return Err("unterminated quoted field"),
                }
            }
            match chars.peek() {
                None | Some(&DELIMITER) | Some(&'\n') | Some(&'\r') => {}
                Some(_) => return Err("extraneous or missing \" in quoted field"),
            }
        } else {
            while let Some(&ch) = chars.peek() {
                match ch {
                    DELIMITER | '\n' | '\r' => break,
                    QUOTE => return Err("bare \" in non-quoted field"),
                    _ => {
                        field.push(ch);
                        chars.next();
                    }
                }
            }
        }

        fields.push(field);

        match chars.next() {
            Some(DELIMITER) => continue,
            _ => break,
        }
    }

    Ok(fields)
}
