pub mod keybinds;
pub mod line_edit;
pub mod list_dialog;
pub mod markup;
pub mod text_view;
pub mod ui;
