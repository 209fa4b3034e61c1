use std::fmt::Write;

use crate::models::CommentNode;

use super::format::format_timestamp;

/// Render a comment tree as indented plain text
pub fn render_thread(nodes: &[CommentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(&mut out, node, 0);
    }
    out
}

fn render_node(out: &mut String, node: &CommentNode, depth: usize) {
    let indent = "    ".repeat(depth);
    let comment = &node.comment;

    let author = match &comment.author_website {
        Some(site) => format!("{} <{}>", comment.author_name, site),
        None => comment.author_name.clone(),
    };
    let _ = writeln!(
        out,
        "{}#{} {} · {}",
        indent,
        comment.id,
        author,
        format_timestamp(comment.created_at)
    );
    for line in comment.content.lines() {
        let _ = writeln!(out, "{}  {}", indent, line);
    }
    out.push('\n');

    for reply in &node.replies {
        render_node(out, reply, depth + 1);
    }
}
