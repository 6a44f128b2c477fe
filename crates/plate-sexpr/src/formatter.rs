//! KiCad-style serialization of S-expression trees.
//!
//! Output follows the layout KiCad's own `Prettify()` produces: tab
//! indentation, one nested list per line, and runs of `(xy ...)` coordinate
//! pairs kept together on shared lines.

use crate::Sexpr;

/// Column limit for packing consecutive `(xy ...)` pairs onto one line.
const XY_COLUMN_LIMIT: usize = 99;

/// Serialize a tree as a board document: pretty-printed, trailing newline.
pub fn format_board(doc: &Sexpr) -> String {
    let mut out = String::new();
    write_node(&mut out, doc, 0);
    out.push('\n');
    out
}

/// Serialize a tree on a single line.
pub fn format_compact(node: &Sexpr) -> String {
    let mut out = String::new();
    write_compact(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Sexpr, depth: usize) {
    let Some(items) = node.as_list() else {
        write_atom(out, node);
        return;
    };

    if items.iter().all(|n| !matches!(n, Sexpr::List(_))) {
        write_compact(out, node);
        return;
    }

    // Leading atoms share the opening line, nested lists get their own.
    out.push('(');
    let mut idx = 0;
    while idx < items.len() && !matches!(items[idx], Sexpr::List(_)) {
        if idx > 0 {
            out.push(' ');
        }
        write_atom(out, &items[idx]);
        idx += 1;
    }

    while idx < items.len() {
        let child = &items[idx];
        if child.tag() == Some("xy") {
            idx += write_xy_run(out, &items[idx..], depth + 1);
            continue;
        }
        out.push('\n');
        push_indent(out, depth + 1);
        write_node(out, child, depth + 1);
        idx += 1;
    }

    out.push('\n');
    push_indent(out, depth);
    out.push(')');
}

/// Emit a run of consecutive `(xy ...)` lists, packing them onto shared
/// lines. Returns how many nodes were consumed.
fn write_xy_run(out: &mut String, items: &[Sexpr], depth: usize) -> usize {
    let mut consumed = 0;
    let mut column = 0;
    for node in items {
        if node.tag() != Some("xy") {
            break;
        }
        let text = format_compact(node);
        if consumed == 0 || column + 1 + text.len() > XY_COLUMN_LIMIT {
            out.push('\n');
            push_indent(out, depth);
            column = depth;
        } else {
            out.push(' ');
            column += 1;
        }
        out.push_str(&text);
        column += text.len();
        consumed += 1;
    }
    consumed
}

fn write_compact(out: &mut String, node: &Sexpr) {
    match node {
        Sexpr::List(items) => {
            out.push('(');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(' ');
                }
                write_compact(out, item);
            }
            out.push(')');
        }
        _ => write_atom(out, node),
    }
}

fn write_atom(out: &mut String, node: &Sexpr) {
    match node {
        Sexpr::Symbol(s) => out.push_str(s),
        Sexpr::Str(s) => {
            out.push('"');
            out.push_str(&escape_string(s));
            out.push('"');
        }
        Sexpr::Num(n) => out.push_str(&fmt_num(*n)),
        Sexpr::List(_) => unreachable!("write_atom called on a list"),
    }
}

/// Format a numeric atom. Rust's shortest-roundtrip f64 display already
/// matches KiCad's trimmed style: whole numbers print without a decimal
/// point, fractions without trailing zeros.
pub(crate) fn fmt_num(n: f64) -> String {
    format!("{n}")
}

pub(crate) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(ch),
        }
    }
    result
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn atom_only_lists_stay_inline() {
        let node = parse("(version 20240101)").unwrap();
        assert_eq!(format_board(&node), "(version 20240101)\n");
    }

    #[test]
    fn nested_lists_get_indented() {
        let node =
            parse("(kicad_pcb (version 20240101) (general (thickness 1.6)))").unwrap();
        let expected =
            "(kicad_pcb\n\t(version 20240101)\n\t(general\n\t\t(thickness 1.6)\n\t)\n)\n";
        assert_eq!(format_board(&node), expected);
    }

    #[test]
    fn xy_pairs_share_lines() {
        let node = parse("(pts (xy 1 2) (xy 3 4) (xy 5 6))").unwrap();
        assert_eq!(format_board(&node), "(pts\n\t(xy 1 2) (xy 3 4) (xy 5 6)\n)\n");
    }

    #[test]
    fn xy_pairs_wrap_at_column_limit() {
        let pairs: Vec<String> = (0..30).map(|i| format!("(xy {i} {i})")).collect();
        let node = parse(&format!("(pts {})", pairs.join(" "))).unwrap();
        let formatted = format_board(&node);
        let long_lines: Vec<&str> = formatted
            .lines()
            .filter(|l| l.trim_start().starts_with("(xy"))
            .collect();
        assert!(long_lines.len() > 1, "expected wrapped xy lines");
        for line in long_lines {
            assert!(line.len() <= XY_COLUMN_LIMIT + 8);
        }
    }

    #[test]
    fn strings_are_escaped() {
        let node = Sexpr::list(vec![
            Sexpr::symbol("gr_text"),
            Sexpr::string("a \"b\"\nc"),
        ]);
        assert_eq!(format_compact(&node), "(gr_text \"a \\\"b\\\"\\nc\")");
    }

    #[test]
    fn numbers_trim_like_kicad() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-2.54), "-2.54");
        assert_eq!(fmt_num(20240101.0), "20240101");
    }

    #[test]
    fn mixed_trailing_atom_after_list() {
        // Rare but legal shape; the closing paren still lands on its own line.
        let node = parse("(fp_text reference \"H1\" (at 0 0) (layer \"F.SilkS\"))").unwrap();
        let formatted = format_board(&node);
        assert!(formatted.starts_with("(fp_text reference \"H1\"\n"));
        assert!(formatted.ends_with(")\n"));
    }
}
