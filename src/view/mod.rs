//! Pagination and rendering of outbound actions.
//!
//! Everything here is a pure function of its arguments.

use crate::models::*;

/// Notes shown per list page.
pub const PAGE_SIZE: usize = 5;

/// Longest title shown on a button before it is cut with an ellipsis.
const BUTTON_TITLE_CHARS: usize = 40;

/// One page of a larger sequence plus navigation flags. A "home" affordance
/// is always rendered alongside, so it has no flag.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<'_, T> {
    /// Number of non-empty pages, at least one.
    pub fn page_count(&self, size: usize) -> usize {
        if size == 0 {
            return 1;
        }
        self.total.div_ceil(size).max(1)
    }
}

/// Slice `items[page*size .. page*size+size]`. Pages past the end are empty
/// with `has_next == false`.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> Page<'_, T> {
    let total = items.len();
    let start = page.saturating_mul(size).min(total);
    let end = start.saturating_add(size).min(total);
    Page {
        items: &items[start..end],
        page,
        total,
        has_prev: page > 0,
        has_next: page.saturating_add(1).saturating_mul(size) < total,
    }
}

// ============================================================
// Menus
// ============================================================

pub fn main_menu_keyboard() -> Keyboard {
    Keyboard::default()
        .row(vec![
            Button::new("➕ New note", Payload::Menu(MenuAction::NewNote)),
            Button::new("📝 My notes", Payload::Menu(MenuAction::ListNotes)),
        ])
        .row(vec![
            Button::new("✅ Completed", Payload::Menu(MenuAction::CompletedNotes)),
            Button::new("⚙️ Settings", Payload::Menu(MenuAction::Settings)),
        ])
        .row(vec![Button::new(
            "🗑 Delete all",
            Payload::Menu(MenuAction::DeleteAll),
        )])
}

fn home_button() -> Button {
    Button::new("🏠 Main menu", Payload::Menu(MenuAction::MainMenu))
}

fn home_keyboard() -> Keyboard {
    Keyboard::default().row(vec![home_button()])
}

pub fn welcome() -> OutboundAction {
    OutboundAction::with_keyboard(
        "📝 Welcome to the notes bot!\nUse /start to open the main menu at any time.",
        main_menu_keyboard(),
    )
}

pub fn main_menu() -> OutboundAction {
    OutboundAction::with_keyboard("🎯 Notes main menu:", main_menu_keyboard())
}

// ============================================================
// Capture dialogue
// ============================================================

pub fn prompt_title() -> OutboundAction {
    OutboundAction::with_keyboard(
        "Enter the note title:",
        Keyboard::default().row(vec![Button::new(
            "✖️ Cancel",
            Payload::Menu(MenuAction::Cancel),
        )]),
    )
}

pub fn prompt_title_again() -> OutboundAction {
    OutboundAction::text("The title can't be empty. Enter the note title:")
}

pub fn prompt_content(title: &str) -> OutboundAction {
    OutboundAction::with_keyboard(
        format!("Title: {}\nNow enter the note text:", title),
        Keyboard::default().row(vec![Button::new(
            "✖️ Cancel",
            Payload::Menu(MenuAction::Cancel),
        )]),
    )
}

pub fn note_saved(note: &Note) -> OutboundAction {
    OutboundAction::with_keyboard(
        format!("✅ Note #{} \"{}\" saved", note.id, note.title),
        Keyboard::default()
            .row(vec![
                Button::new("➕ Another one", Payload::Menu(MenuAction::NewNote)),
                Button::new("📝 My notes", Payload::Menu(MenuAction::ListNotes)),
            ])
            .row(vec![home_button()]),
    )
}

pub fn capture_cancelled() -> OutboundAction {
    OutboundAction::with_keyboard("✖️ Note creation cancelled", main_menu_keyboard())
}

// ============================================================
// Lists and details
// ============================================================

/// Render one page of `notes`, which must already be filtered for `list`.
/// A page past the end shows the last page instead.
pub fn note_list(notes: &[Note], list: ListKind, page: usize) -> OutboundAction {
    if notes.is_empty() {
        let text = match list {
            ListKind::All => "📭 You have no notes yet",
            ListKind::Completed => "📭 No completed notes yet",
        };
        return OutboundAction::with_keyboard(text, home_keyboard());
    }

    let last_page = notes.len().div_ceil(PAGE_SIZE) - 1;
    let page = page.min(last_page);
    let view = paginate(notes, page, PAGE_SIZE);
    let heading = match list {
        ListKind::All => "📋 Your notes",
        ListKind::Completed => "✅ Completed notes",
    };
    let mut text = format!(
        "{} (page {} of {}):\n",
        heading,
        page + 1,
        view.page_count(PAGE_SIZE)
    );
    for note in view.items {
        text.push_str(&format!("\n{}. {}", note.id, note.title));
    }

    let mut keyboard = Keyboard::default();
    for note in view.items {
        let mark = if note.completed { "✅" } else { "📝" };
        keyboard = keyboard.row(vec![Button::new(
            format!("{} #{} {}", mark, note.id, shorten(&note.title)),
            Payload::Note {
                action: NoteAction::View,
                id: note.id,
            },
        )]);
    }

    let mut nav = Vec::new();
    if view.has_prev {
        nav.push(Button::new(
            "◀️ Previous",
            Payload::Page {
                list,
                page: page - 1,
            },
        ));
    }
    if view.has_next {
        nav.push(Button::new("Next ▶️", Payload::Page { list, page: page + 1 }));
    }

    OutboundAction::with_keyboard(text, keyboard.row(nav).row(vec![home_button()]))
}

pub fn note_detail(note: &Note) -> OutboundAction {
    let status = if note.completed { "✅ done" } else { "⏳ open" };
    let mut text = format!("📝 #{} {}\n", note.id, note.title);
    if !note.content.is_empty() {
        text.push_str(&format!("\n{}\n", note.content));
    }
    text.push_str(&format!("\n🕒 {}\nStatus: {}", note.created_at, status));

    let mut actions = Vec::new();
    if !note.completed {
        actions.push(Button::new(
            "✅ Mark done",
            Payload::Note {
                action: NoteAction::Complete,
                id: note.id,
            },
        ));
    }
    actions.push(Button::new(
        "🗑 Delete",
        Payload::Note {
            action: NoteAction::Delete,
            id: note.id,
        },
    ));

    OutboundAction::with_keyboard(
        text,
        Keyboard::default().row(actions).row(vec![
            Button::new(
                "⬅️ Back to list",
                Payload::Page {
                    list: ListKind::All,
                    page: 0,
                },
            ),
            home_button(),
        ]),
    )
}

/// Prefix a re-rendered list with a short confirmation line.
pub fn with_notice(notice: &str, mut action: OutboundAction) -> OutboundAction {
    action.text = format!("{}\n\n{}", notice, action.text);
    action
}

pub fn all_deleted() -> OutboundAction {
    OutboundAction::with_keyboard("🧹 All notes deleted", main_menu_keyboard())
}

pub fn settings(notes: &[Note], ids: crate::store::IdStrategy) -> OutboundAction {
    let completed = notes.iter().filter(|n| n.completed).count();
    OutboundAction::with_keyboard(
        format!(
            "⚙️ Settings\n\nNotes: {}\nCompleted: {}\nPage size: {}\nNote numbering: {}",
            notes.len(),
            completed,
            PAGE_SIZE,
            ids.as_str()
        ),
        home_keyboard(),
    )
}

fn shorten(title: &str) -> String {
    if title.chars().count() <= BUTTON_TITLE_CHARS {
        return title.to_string();
    }
    let cut: String = title.chars().take(BUTTON_TITLE_CHARS - 1).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(count: u32) -> Vec<Note> {
        (1..=count)
            .map(|id| Note {
                id,
                title: format!("Note {}", id),
                content: String::new(),
                created_at: "2024-01-01 09:00".to_string(),
                completed: false,
            })
            .collect()
    }

    fn ids(page: &Page<'_, Note>) -> Vec<u32> {
        page.items.iter().map(|n| n.id).collect()
    }

    #[test]
    fn first_page_of_twelve() {
        let all = notes(12);
        let page = paginate(&all, 0, 5);
        assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
        assert!(!page.has_prev);
        assert!(page.has_next);
    }

    #[test]
    fn last_page_of_twelve() {
        let all = notes(12);
        let page = paginate(&all, 2, 5);
        assert_eq!(ids(&page), vec![11, 12]);
        assert!(page.has_prev);
        assert!(!page.has_next);
        assert_eq!(page.page_count(5), 3);
    }

    #[test]
    fn exact_multiple_has_no_next_on_last_page() {
        let all = notes(10);
        assert!(!paginate(&all, 1, 5).has_next);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let all = notes(12);
        let page = paginate(&all, 9, 5);
        assert!(page.items.is_empty());
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn out_of_range_list_page_shows_the_last_page() {
        let all = notes(12);
        let action = note_list(&all, ListKind::All, usize::MAX);
        let payloads: Vec<&str> = action
            .keyboard
            .as_ref()
            .unwrap()
            .buttons()
            .map(|b| b.payload.as_str())
            .collect();

        assert!(action.text.contains("(page 3 of 3)"));
        assert!(payloads.contains(&"note:view:12"));
        assert!(payloads.contains(&"page:all:1"));
        assert!(!payloads.contains(&"page:all:3"));
    }

    #[test]
    fn list_shows_navigation_and_home() {
        let all = notes(12);
        let action = note_list(&all, ListKind::All, 1);
        let payloads: Vec<&str> = action
            .keyboard
            .as_ref()
            .unwrap()
            .buttons()
            .map(|b| b.payload.as_str())
            .collect();

        assert!(payloads.contains(&"note:view:6"));
        assert!(payloads.contains(&"page:all:0"));
        assert!(payloads.contains(&"page:all:2"));
        assert_eq!(payloads.last(), Some(&"main_menu"));
    }

    #[test]
    fn empty_lists_explain_themselves() {
        assert_eq!(
            note_list(&[], ListKind::All, 0).text,
            "📭 You have no notes yet"
        );
        assert_eq!(
            note_list(&[], ListKind::Completed, 0).text,
            "📭 No completed notes yet"
        );
    }

    #[test]
    fn completed_note_detail_has_no_complete_button() {
        let mut note = notes(1).remove(0);
        note.completed = true;
        let action = note_detail(&note);
        assert!(action
            .keyboard
            .unwrap()
            .buttons()
            .all(|b| b.payload != "note:done:1"));
    }

    #[test]
    fn long_titles_are_shortened_on_buttons() {
        let title = "x".repeat(100);
        let short = shorten(&title);
        assert_eq!(short.chars().count(), BUTTON_TITLE_CHARS);
        assert!(short.ends_with('…'));
    }
}
