//! Per-toolkit prompt hint tables.
//!
//! Static lookup data spliced into the synthesis prompt so the model sticks
//! to classes and functions that actually exist in the chosen toolkit.

/// Toolkit identities with a hint entry.
pub const SUPPORTED_LIBRARIES: &[&str] = &["urwid", "textual", "rich", "curses"];

const RICH_HINTS: &str = "\
RICH LIBRARY - Available components:
- Console, Table, Panel, Layout, Live
- Progress, Spinner, Status
- Text, Markdown, Syntax
- Prompt.ask() for input
Use Live() context manager for dynamic updates.";

const TEXTUAL_HINTS: &str = "\
TEXTUAL LIBRARY - Available widgets:
- App, Screen, Widget, Static, Label, Button
- DataTable, ListView, Tree, Input, TextArea
- Header, Footer, Container, Horizontal, Vertical
- Use compose() method to yield widgets
- Use CSS for styling via CSS property or .tcss files";

const URWID_HINTS: &str = "\
URWID LIBRARY - Available widgets:
- Text, Edit, Button, CheckBox, RadioButton
- Pile, Columns, Frame, Filler, Padding
- ListBox, SimpleFocusListWalker
- MainLoop for event handling
- Use palette for colors";

const CURSES_HINTS: &str = "\
CURSES LIBRARY:
- Use stdscr.addstr(), stdscr.getch()
- curses.wrapper() for initialization
- curses.newwin() for windows
- Handle KEY_UP, KEY_DOWN, etc.";

/// Returns the hint block for a toolkit, or an empty string for an unknown
/// identity (the synthesis prompt simply carries no hints then).
pub fn library_hints(library: &str) -> &'static str {
    match library {
        "rich" => RICH_HINTS,
        "textual" => TEXTUAL_HINTS,
        "urwid" => URWID_HINTS,
        "curses" => CURSES_HINTS,
        _ => "",
    }
}
