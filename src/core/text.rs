/// Replace non-breaking spaces, collapse whitespace runs and trim.
pub(crate) fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{a0}' {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// ASCII-fold the accented Latin letters used in French labels and month names.
pub(crate) fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|ch| match ch {
            'à' | 'â' | 'ä' => 'a',
            'À' | 'Â' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'î' | 'ï' => 'i',
            'Î' | 'Ï' => 'I',
            'ô' | 'ö' => 'o',
            'Ô' | 'Ö' => 'O',
            'ù' | 'û' | 'ü' => 'u',
            'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Decode the HTML entities the site emits inside scripts, AJAX payloads and
/// attribute values: the five XML entities, `&nbsp;` and numeric references.
pub(crate) fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Join the contents of every `<![CDATA[...]]>` section with newlines.
///
/// Wicket AJAX responses wrap the re-rendered markup and scripts this way.
pub(crate) fn extract_cdata_blocks(xml: &str) -> String {
    const OPEN: &str = "<![CDATA[";
    const CLOSE: &str = "]]>";

    let mut blocks = Vec::new();
    let mut pos = 0usize;
    while let Some(si) = xml[pos..].find(OPEN) {
        let start = pos + si + OPEN.len();
        let Some(len) = xml[start..].find(CLOSE) else {
            break;
        };
        blocks.push(&xml[start..start + len]);
        pos = start + len + CLOSE.len();
    }
    blocks.join("\n")
}

/// Turn a URL captured from inline JavaScript into a plain one
/// (`\/` escapes, then HTML entities).
pub(crate) fn unescape_script_url(raw: &str) -> String {
    unescape_html(&raw.replace("\\/", "/"))
}

pub(crate) fn truncate(s: &str, n: usize) -> String {
    if s.len() <= n {
        return s.to_string();
    }
    let mut end = n;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{} …[trunc]", &s[..end])
}
