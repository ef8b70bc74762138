/// Plain-text rendering of the viewport for terminal output.
use pagepad_core::Editor;

/// Renders the visible lines with a 1-based line-number gutter followed by
/// the status line. The head's row is marked with `>`.
pub fn render(editor: &Editor) -> String {
    let viewport = editor.viewport();
    let lines = editor.lines();
    let head_row = viewport.row_of(editor.selection().head().row);
    let last_number = viewport.start() + lines.len().max(1);
    let width = last_number.to_string().len();

    let mut out = String::new();
    for (row, line) in lines.iter().enumerate() {
        let marker = if head_row == Some(row) { '>' } else { ' ' };
        let number = viewport.absolute(row) + 1;
        out.push_str(&format!("{marker}{number:>width$} | {line}\n"));
    }
    out.push_str(&editor.status().to_string());
    out
}
