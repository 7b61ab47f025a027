/// Name for a downloaded export: the server's `Content-Disposition` filename
/// when present, else `processed_data_{collection}_{tag}.xlsx`. Always safe
/// to create on Windows and Unix.
pub fn download_filename(content_disposition: Option<&str>, collection: &str, tag: &str) -> String {
    let suggested = content_disposition
        .and_then(disposition_filename)
        .map(|name| sanitize(&name))
        .filter(|name| !name.is_empty());
    suggested.unwrap_or_else(|| {
        let tag = if tag.is_empty() { "all" } else { tag };
        let collection = collection.replace(['/', '\\'], "_");
        let tag = tag.replace(['/', '\\'], "_");
        sanitize(&format!("processed_data_{collection}_{tag}.xlsx"))
    })
}

fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename" => plain = Some(value.trim_matches('"').to_string()),
            // RFC 5987 form: charset'lang'value
            "filename*" => {
                extended = value
                    .splitn(3, '\'')
                    .nth(2)
                    .map(|encoded| percent_decode(encoded.trim_matches('"')));
            }
            _ => {}
        }
    }
    extended.or(plain)
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn sanitize(input: &str) -> String {
    // Drop any directory part the server may have sent.
    let base = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let mut final_name = compacted;
    if final_name.chars().count() > 120 {
        final_name = final_name.chars().take(120).collect();
    }
    let stem = final_name.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        final_name.insert(stem.len(), '_');
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
