//! Numbered-list re-indentation.
//!
//! RST auto-enumerated list items (`#. `) require their continuation lines
//! at exactly the item's content indent, but the converter emits wrapped
//! item text at whatever column the source happened to use. Once a list
//! opens, every non-blank line is forced to the three-space continuation
//! indent until a blank line closes the list.

/// Force continuation lines of `#. ` lists to a 3-space indent.
pub fn reindent_numbered_lists(lines: &mut [String]) {
    const CONTINUATION: &str = "   ";
    let mut in_list = false;

    for line in lines.iter_mut() {
        if line.starts_with("#. ") {
            in_list = true;
        } else if in_list {
            if line.is_empty() {
                in_list = false;
            } else {
                let indent_len = line.len() - line.trim_start().len();
                if &line[..indent_len] != CONTINUATION {
                    *line = format!("{CONTINUATION}{}", &line[indent_len..]);
                }
            }
        }
    }
}
