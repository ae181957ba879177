// `data-vhd-*` attribute extraction from the `/vhd` page.
//
// The VHD page renders one element per image carrying its full record as
// `data-vhd-*` attributes (several buttons per row repeat them). We only
// need those attributes, so this is a small tag scanner rather than an
// HTML parser: it walks start tags, reads their attributes, and merges
// every tag that names the same `data-vhd-id`.

use crate::models::VhdAttributes;

const PREFIX: &str = "data-vhd-";

/// Collect one [`VhdAttributes`] per distinct `data-vhd-id`, in page order.
pub fn extract_vhd_attributes(html: &str) -> Vec<VhdAttributes> {
    let mut out: Vec<VhdAttributes> = Vec::new();

    for attrs in start_tags(html) {
        let Some(id) = lookup(&attrs, "id") else {
            continue;
        };
        let id = id.trim().to_owned();
        if id.is_empty() {
            continue;
        }

        let idx = match out.iter().position(|v| v.id == id) {
            Some(i) => i,
            None => {
                out.push(VhdAttributes {
                    id,
                    ..VhdAttributes::default()
                });
                out.len() - 1
            }
        };
        if let Some(entry) = out.get_mut(idx) {
            merge(entry, &attrs);
        }
    }

    out
}

fn merge(entry: &mut VhdAttributes, attrs: &[(String, String)]) {
    if entry.name.is_empty() {
        if let Some(name) = lookup(attrs, "name") {
            entry.name = name.to_owned();
        }
    }
    fill(&mut entry.description, attrs, "desc");
    fill(&mut entry.size, attrs, "size");
    fill(&mut entry.path, attrs, "path");
    fill(&mut entry.windows, attrs, "windows");
    fill(&mut entry.template, attrs, "template");
    fill(&mut entry.locked, attrs, "locked");
    fill(&mut entry.created, attrs, "created");
    fill(&mut entry.modified, attrs, "modified");
}

fn fill(slot: &mut Option<String>, attrs: &[(String, String)], key: &str) {
    if slot.is_none() {
        *slot = lookup(attrs, key).map(str::to_owned);
    }
}

/// Value of `data-vhd-{key}` among a tag's `data-vhd-*` attributes.
fn lookup<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Iterate start tags, yielding their `data-vhd-*` attributes with the
/// prefix stripped. Tags without any are skipped.
fn start_tags(html: &str) -> impl Iterator<Item = Vec<(String, String)>> + '_ {
    let mut rest = html;
    std::iter::from_fn(move || {
        loop {
            let open = rest.find('<')?;
            let after = &rest[open + 1..];
            let end = tag_end(after)?;
            let body = &after[..end];
            rest = &after[end + 1..];

            if body.starts_with('/') || body.starts_with('!') || body.starts_with('?') {
                continue;
            }
            let attrs = parse_attributes(body);
            if !attrs.is_empty() {
                return Some(attrs);
            }
        }
    })
}

/// Index of the `>` closing a tag, skipping quoted attribute values.
fn tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    // Skip the element name.
    let mut rest = tag
        .trim_start()
        .trim_start_matches(|c: char| !c.is_whitespace() && c != '/');

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = read_value(after_eq);
            rest = remaining;
            value
        } else {
            String::new()
        };

        if let Some(key) = name.strip_prefix(PREFIX) {
            attrs.push((key.to_owned(), decode_entities(&value)));
        }
    }

    attrs
}

fn read_value(s: &str) -> (String, &str) {
    let mut chars = s.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let inner = &s[1..];
            match inner.find(q) {
                Some(close) => (inner[..close].to_owned(), &inner[close + 1..]),
                None => (inner.to_owned(), ""),
            }
        }
        _ => {
            let end = s.find(char::is_whitespace).unwrap_or(s.len());
            (s[..end].to_owned(), &s[end..])
        }
    }
}

/// Undo the escaping a template engine applies to attribute values.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
<table class="table">
  <tr>
    <td>Win10 Gaming</td>
    <td>
      <button class="btn view-vhd-btn" data-vhd-id="3" data-vhd-name="Win10 Gaming"
              data-vhd-desc="Steam &amp; Epic &quot;ready&quot;" data-vhd-size="80.0"
              data-vhd-path="/srv/vhd/win10.vhdx" data-vhd-windows="Windows 10"
              data-vhd-template="true" data-vhd-locked="false"
              data-vhd-created="2024-05-01 10:00" data-vhd-modified="">View</button>
      <button class="btn clone-vhd-btn" data-vhd-id="3" data-vhd-name="Win10 Gaming">Clone</button>
    </td>
  </tr>
  <tr>
    <td><button data-vhd-id='7' data-vhd-name='Base' data-vhd-locked='true'>View</button></td>
  </tr>
  <!-- <button data-vhd-id="99"> -->
</table>"#;

    #[test]
    fn merges_repeated_ids_in_page_order() {
        let vhds = extract_vhd_attributes(PAGE);
        let ids: Vec<&str> = vhds.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "7"]);
    }

    #[test]
    fn decodes_entities_and_keeps_empty_values() {
        let vhds = extract_vhd_attributes(PAGE);
        let first = &vhds[0];
        assert_eq!(first.name, "Win10 Gaming");
        assert_eq!(first.description.as_deref(), Some("Steam & Epic \"ready\""));
        assert_eq!(first.template.as_deref(), Some("true"));
        assert_eq!(first.modified.as_deref(), Some(""));
    }

    #[test]
    fn single_quoted_attributes() {
        let vhds = extract_vhd_attributes(PAGE);
        let second = &vhds[1];
        assert_eq!(second.name, "Base");
        assert_eq!(second.locked.as_deref(), Some("true"));
        assert_eq!(second.size, None);
    }

    #[test]
    fn page_without_vhds_is_empty() {
        assert!(extract_vhd_attributes("<html><body><p>No VHDs</p></body></html>").is_empty());
    }
}
